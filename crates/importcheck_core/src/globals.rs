//! Known global identifiers for the undeclared-identifier check.
//!
//! A referenced identifier with no binding in the file is only reported when it
//! is not one of these names. The set covers standard JavaScript builtins,
//! Node.js and browser globals, and the TypeScript utility types that appear in
//! type positions.

use std::collections::HashSet;
use std::sync::LazyLock;

static GLOBALS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // JavaScript builtins
        "console", "Math", "JSON", "Date", "RegExp", "Array", "Object", "String", "Number",
        "Boolean", "Function", "Symbol", "Error", "Promise", "Set", "Map", "WeakSet", "WeakMap",
        "parseInt", "parseFloat", "isNaN", "isFinite", "decodeURI", "decodeURIComponent",
        "encodeURI", "encodeURIComponent", "eval", "undefined", "Infinity", "NaN", "globalThis",
        "structuredClone",
        // Error types
        "TypeError", "ReferenceError", "SyntaxError", "RangeError", "EvalError", "URIError",
        "AggregateError",
        // Typed arrays and binary data
        "ArrayBuffer", "SharedArrayBuffer", "DataView", "Int8Array", "Uint8Array",
        "Uint8ClampedArray", "Int16Array", "Uint16Array", "Int32Array", "Uint32Array",
        "Float32Array", "Float64Array", "BigInt64Array", "BigUint64Array",
        // Reflection and advanced features
        "Proxy", "Reflect", "Generator", "GeneratorFunction", "AsyncFunction", "AsyncGenerator",
        "AsyncGeneratorFunction", "WeakRef", "FinalizationRegistry", "BigInt", "Atomics",
        // Intl
        "Intl",
        // Node.js globals
        "process", "require", "module", "exports", "__filename", "__dirname", "global", "Buffer",
        "setTimeout", "setInterval", "clearTimeout", "clearInterval", "setImmediate",
        "clearImmediate", "queueMicrotask", "URL", "URLSearchParams", "TextEncoder", "TextDecoder",
        // Browser window/document
        "window", "self", "frames", "parent", "top", "opener", "closed", "name", "status",
        "innerHeight", "innerWidth", "outerHeight", "outerWidth", "pageXOffset", "pageYOffset",
        "screenX", "screenY", "scrollX", "scrollY", "devicePixelRatio", "document", "navigator",
        "location", "history", "screen", "performance", "crypto", "customElements",
        // Storage
        "localStorage", "sessionStorage", "indexedDB", "caches",
        // Network APIs
        "fetch", "XMLHttpRequest", "WebSocket", "EventSource", "Request", "Response", "Headers",
        "AbortController", "AbortSignal", "FormData", "Blob", "File", "FileReader",
        // Events and DOM interfaces referenced as values
        "Event", "CustomEvent", "EventTarget", "MutationObserver", "IntersectionObserver",
        "ResizeObserver", "HTMLElement", "Element", "Node", "NodeList", "DocumentFragment",
        "alert", "confirm", "prompt", "requestAnimationFrame", "cancelAnimationFrame",
        "getComputedStyle", "matchMedia",
        // Test framework globals
        "describe", "it", "test", "expect", "beforeEach", "afterEach", "beforeAll", "afterAll",
        "jest", "vi", "suite", "bench",
        // TypeScript utility types (appear as identifier references in type positions)
        "Partial", "Required", "Readonly", "Record", "Pick", "Omit", "Exclude", "Extract",
        "NonNullable", "Parameters", "ConstructorParameters", "ReturnType", "InstanceType",
        "ThisType", "Awaited", "Uppercase", "Lowercase", "Capitalize", "Uncapitalize",
        "PropertyKey", "Iterable", "Iterator", "AsyncIterable", "AsyncIterator", "ArrayLike",
        "PromiseLike", "ReadonlyArray", "ReadonlyMap", "ReadonlySet",
    ]
    .into_iter()
    .collect()
});

/// Returns true when `name` is a known global or common built-in.
pub fn is_global(name: &str) -> bool {
    GLOBALS.contains(name)
}
