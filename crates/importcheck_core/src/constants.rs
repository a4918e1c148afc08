//! Constants for file extensions and module resolution.
//!
//! Centralizes extension handling so probing, classification, and directory
//! collection agree on what counts as a source file.

/// Extensions tried when probing an extensionless import target, in priority order.
///
/// The order is part of the resolution contract: `./widget` resolves to
/// `widget.js` over `widget.ts` when both exist.
pub const RESOLVE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".json", ".vue"];

/// Extensions whose files are parsed and export-checked. Anything else a
/// specifier resolves to (css, images, json, ...) is treated as an external
/// asset and never fact-checked.
pub const ANALYZABLE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".vue"];

/// Node.js core module names. Specifiers matching one of these (with or
/// without the `node:` prefix) resolve to an external builtin marker.
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Returns true when `specifier` names a Node.js core module, accepting both
/// the bare form (`fs`) and the prefixed form (`node:fs`).
pub fn is_builtin_module(specifier: &str) -> bool {
    let name = specifier.strip_prefix("node:").unwrap_or(specifier);
    NODE_BUILTINS.contains(&name)
}
