//! Core engine for importcheck.
//!
//! This crate provides the resolution and fact layer for analyzing
//! JavaScript/TypeScript module graphs:
//! - Aggregating alias configuration from build-tool conventions
//!   (jsconfig/tsconfig paths, Babel module-resolver, webpack, Vite, Next.js)
//! - Resolving import specifiers to project files or external markers
//! - Extracting per-file facts (imports, exports, code issues) with oxc
//! - Caching facts per run so each file is parsed at most once

mod alias;
mod constants;
mod extractor;
mod facts;
mod globals;
mod loader;
mod resolver;
mod types;

// Re-export public API
pub use alias::{AliasTable, AliasTableBuilder};
pub use constants::{ANALYZABLE_EXTENSIONS, NODE_BUILTINS, RESOLVE_EXTENSIONS, is_builtin_module};
pub use extractor::{FactExtractor, OxcFactExtractor};
pub use facts::FactCache;
pub use globals::is_global;
pub use loader::{ConfigModuleLoader, StaticConfigLoader};
pub use resolver::{
    NodeModulesLocator, PackageLocator, PathResolver, Resolution, ResolveError,
    find_existing_file, in_package_boundary,
};
pub use types::{
    BindingKind, DynamicImportDecl, ExportRecord, ImportBinding, ImportDecl, Issue, IssueKind,
    ModuleFacts, ReExportPair, SyntaxError,
};
