use std::path::PathBuf;

use serde::Serialize;

use importcheck_core::{
    DynamicImportDecl, ExportRecord, ImportBinding, Issue, IssueKind, SyntaxError,
};

/// Overall status of one analyzed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Warning,
    Error,
}

/// Status of a single classified import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    /// Resolved to a project source file whose exports were attached.
    Resolved,
    /// Builtin, dependency package, or non-code asset; never fact-checked.
    External,
    Failed,
    /// Resolved, but the target or a named binding has a problem.
    Warning,
}

/// A static import after resolution and classification.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRecord {
    pub specifier: String,
    pub bindings: Vec<ImportBinding>,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,
    pub status: ImportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Target's export list, attached for internal resolved imports only.
    /// An `external` record never carries this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_exports: Option<Vec<ExportRecord>>,
    /// Name-validation issues attached for rendering.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

/// A dynamic import after resolution. Never name-checked.
#[derive(Debug, Clone, Serialize)]
pub struct DynamicImportRecord {
    pub specifier: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,
    pub status: ImportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DynamicImportRecord {
    pub fn from_decl(decl: &DynamicImportDecl, status: ImportStatus) -> Self {
        Self {
            specifier: decl.specifier.clone(),
            line: decl.line,
            resolved_path: None,
            status,
            error: None,
        }
    }
}

/// The immutable result of analyzing one file.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_error: Option<SyntaxError>,
    pub imports: Vec<ImportRecord>,
    pub dynamic_imports: Vec<DynamicImportRecord>,
    pub exports: Vec<ExportRecord>,
    pub unused_imports: Vec<String>,
    pub issues: Vec<Issue>,
}

impl AnalysisResult {
    /// Short-circuit result carrying only an entry failure.
    pub fn failure(file: PathBuf, error: SyntaxError, issues: Vec<Issue>) -> Self {
        Self {
            file,
            status: FileStatus::Error,
            syntax_error: Some(error),
            imports: Vec::new(),
            dynamic_imports: Vec::new(),
            exports: Vec::new(),
            unused_imports: Vec::new(),
            issues,
        }
    }
}

/// Run-wide counters plus every per-file result.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub files_with_errors: usize,
    pub files_with_warnings: usize,
    pub total_imports: usize,
    pub unresolved_imports: usize,
    pub unused_imports: usize,
    pub undeclared_identifiers: usize,
    pub critical_code_issues: usize,
    pub console_usages: usize,
    pub todo_fixme_comments: usize,
    pub details: Vec<AnalysisResult>,
}

/// What one run produced: a single-file analysis or a directory summary.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunReport {
    File(Box<AnalysisResult>),
    Directory(Summary),
}

/// Issue kinds that count toward the summary's unresolved-import counter in
/// addition to `failed` import records.
pub(crate) const NAME_RESOLUTION_ISSUES: &[IssueKind] = &[
    IssueKind::UnresolvedNamedImport,
    IssueKind::UnresolvedDefaultImport,
    IssueKind::UnresolvedReExportSource,
    IssueKind::MissingReExportedName,
    IssueKind::UnresolvedReExportAllSource,
];
