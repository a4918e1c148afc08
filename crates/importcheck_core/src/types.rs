use std::path::Path;

use serde::Serialize;

/// A captured parse failure. Never thrown across the extractor boundary; always
/// carried as data on the owning [`ModuleFacts`].
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// How a single imported name is bound in the importing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// `import foo from '...'`
    Default,
    /// `import { foo } from '...'` or `import { foo as bar } from '...'`
    Named,
    /// `import * as foo from '...'`
    Namespace,
    /// `const foo = require('...')`
    Require,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportBinding {
    /// Exported name on the target side (`default`, `*`, or the named export).
    pub name: String,
    /// Local binding in the importing file, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub kind: BindingKind,
}

/// A static import statement as extracted from source, before resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ImportDecl {
    pub specifier: String,
    pub bindings: Vec<ImportBinding>,
    pub line: u32,
}

/// A dynamic `import('...')` expression with a string-literal argument.
#[derive(Debug, Clone, Serialize)]
pub struct DynamicImportDecl {
    pub specifier: String,
    pub line: u32,
}

/// One `local as exported` pair of a re-export statement.
#[derive(Debug, Clone, Serialize)]
pub struct ReExportPair {
    pub local: String,
    pub exported: String,
}

/// An export statement of the analyzed file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExportRecord {
    /// `export const a = ...`, `export function f() {}`, `export { a, b }`
    Named { names: Vec<String>, line: u32 },
    /// `export default ...`
    Default { line: u32 },
    /// `export { a, b as c } from '...'`
    ReExport { from: String, pairs: Vec<ReExportPair>, line: u32 },
    /// `export * from '...'`
    ExportAll { from: String, line: u32 },
}

/// Stable issue kinds exposed to reporting. The string forms are a public
/// contract; renderers and CI filters match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    UnresolvedImport,
    UnresolvedDynamicImport,
    ErrorInImportedFile,
    UnresolvedNamedImport,
    UnresolvedDefaultImport,
    FileNotFound,
    UnresolvedReExportSource,
    ErrorInReExportedFile,
    MissingReExportedName,
    UnresolvedReExportAllSource,
    ErrorInReExportedAllSource,
    UndeclaredIdentifier,
    UndeclaredJsxComponent,
    EvalUsage,
    DebuggerStatement,
    DuplicateObjectKey,
    UnusedImports,
    ConsoleUsage,
    TodoComment,
    FixmeComment,
}

impl IssueKind {
    /// Hard issues force the owning file's status to `error`; everything else
    /// only degrades it to `warning`.
    pub fn is_hard(self) -> bool {
        !matches!(
            self,
            IssueKind::UnusedImports
                | IssueKind::ConsoleUsage
                | IssueKind::TodoComment
                | IssueKind::FixmeComment
                | IssueKind::UnresolvedDynamicImport
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::UnresolvedImport => "unresolved-import",
            IssueKind::UnresolvedDynamicImport => "unresolved-dynamic-import",
            IssueKind::ErrorInImportedFile => "error-in-imported-file",
            IssueKind::UnresolvedNamedImport => "unresolved-named-import",
            IssueKind::UnresolvedDefaultImport => "unresolved-default-import",
            IssueKind::FileNotFound => "file-not-found",
            IssueKind::UnresolvedReExportSource => "unresolved-re-export-source",
            IssueKind::ErrorInReExportedFile => "error-in-re-exported-file",
            IssueKind::MissingReExportedName => "missing-re-exported-name",
            IssueKind::UnresolvedReExportAllSource => "unresolved-re-export-all-source",
            IssueKind::ErrorInReExportedAllSource => "error-in-re-exported-all-source",
            IssueKind::UndeclaredIdentifier => "undeclared-identifier",
            IssueKind::UndeclaredJsxComponent => "undeclared-jsx-component",
            IssueKind::EvalUsage => "eval-usage",
            IssueKind::DebuggerStatement => "debugger-statement",
            IssueKind::DuplicateObjectKey => "duplicate-object-key",
            IssueKind::UnusedImports => "unused-imports",
            IssueKind::ConsoleUsage => "console-usage",
            IssueKind::TodoComment => "todo-comment",
            IssueKind::FixmeComment => "fixme-comment",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding attached to a file or an import.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>, line: Option<u32>) -> Self {
        Self { kind, message: message.into(), line, identifier: None }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

/// Everything known about one file's source text, independent of its role as
/// importer or imported target. Immutable once produced; owned by the fact
/// cache for the duration of a run.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleFacts {
    /// Sentinel variant: the path did not exist. A valid, cacheable fact.
    pub file_not_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_error: Option<SyntaxError>,
    pub imports: Vec<ImportDecl>,
    pub dynamic_imports: Vec<DynamicImportDecl>,
    pub exports: Vec<ExportRecord>,
    pub unused_imports: Vec<String>,
    pub code_issues: Vec<Issue>,
}

impl ModuleFacts {
    pub fn empty() -> Self {
        Self {
            file_not_found: false,
            syntax_error: None,
            imports: Vec::new(),
            dynamic_imports: Vec::new(),
            exports: Vec::new(),
            unused_imports: Vec::new(),
            code_issues: Vec::new(),
        }
    }

    /// The `file_not_found` sentinel fact for a missing path.
    pub fn missing(path: &Path) -> Self {
        Self {
            file_not_found: true,
            syntax_error: Some(SyntaxError {
                message: format!("File not found: {}", path.display()),
                line: None,
                column: None,
            }),
            ..Self::empty()
        }
    }

    /// A fact whose only content is a captured parse failure.
    pub fn parse_failure(error: SyntaxError) -> Self {
        Self { syntax_error: Some(error), ..Self::empty() }
    }
}

impl ExportRecord {
    pub fn line(&self) -> u32 {
        match self {
            ExportRecord::Named { line, .. }
            | ExportRecord::Default { line }
            | ExportRecord::ReExport { line, .. }
            | ExportRecord::ExportAll { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_issue_partition() {
        assert!(IssueKind::UnresolvedImport.is_hard());
        assert!(IssueKind::MissingReExportedName.is_hard());
        assert!(IssueKind::DebuggerStatement.is_hard());
        assert!(!IssueKind::UnusedImports.is_hard());
        assert!(!IssueKind::ConsoleUsage.is_hard());
        assert!(!IssueKind::TodoComment.is_hard());
        assert!(!IssueKind::UnresolvedDynamicImport.is_hard());
    }

    #[test]
    fn test_issue_kind_stable_strings() {
        assert_eq!(IssueKind::UnresolvedNamedImport.as_str(), "unresolved-named-import");
        assert_eq!(IssueKind::ErrorInReExportedAllSource.as_str(), "error-in-re-exported-all-source");
        assert_eq!(IssueKind::UndeclaredJsxComponent.as_str(), "undeclared-jsx-component");
    }

    #[test]
    fn test_issue_kind_serde_matches_as_str() {
        let json = serde_json::to_string(&IssueKind::MissingReExportedName).unwrap();
        assert_eq!(json, format!("\"{}\"", IssueKind::MissingReExportedName.as_str()));
    }

    #[test]
    fn test_missing_sentinel() {
        let facts = ModuleFacts::missing(Path::new("/tmp/gone.js"));
        assert!(facts.file_not_found);
        assert!(facts.syntax_error.unwrap().message.contains("gone.js"));
        assert!(facts.imports.is_empty());
    }

    #[test]
    fn test_export_record_serialization_tags() {
        let rec = ExportRecord::ReExport {
            from: "./other".to_string(),
            pairs: vec![ReExportPair { local: "a".into(), exported: "b".into() }],
            line: 3,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "re-export");
        assert_eq!(json["from"], "./other");
    }
}
