use std::collections::HashSet;
use std::path::Path;

use importcheck_core::{
    BindingKind, ExportRecord, FactCache, Issue, IssueKind, PathResolver, Resolution,
};

use crate::types::ImportRecord;

/// The directly visible export surface of one file: named export names
/// (including re-exported aliases), default presence, and whether an
/// `export *` forwards an unknown set of names.
///
/// Validation is one hop deep: a target's own `export *` is trusted
/// unconditionally instead of chasing what it forwards.
pub struct ExportNameSet {
    names: HashSet<String>,
    has_default: bool,
    has_export_all: bool,
}

impl ExportNameSet {
    pub fn from_exports(exports: &[ExportRecord]) -> Self {
        let mut names = HashSet::new();
        let mut has_default = false;
        let mut has_export_all = false;
        for export in exports {
            match export {
                ExportRecord::Named { names: export_names, .. } => {
                    names.extend(export_names.iter().cloned());
                }
                ExportRecord::Default { .. } => {
                    has_default = true;
                    names.insert("default".to_string());
                }
                ExportRecord::ReExport { pairs, .. } => {
                    names.extend(pairs.iter().map(|p| p.exported.clone()));
                }
                ExportRecord::ExportAll { .. } => {
                    has_export_all = true;
                }
            }
        }
        Self { names, has_default, has_export_all }
    }

    /// True when `name` is visibly exported, or an `export *` could supply it.
    pub fn provides(&self, name: &str) -> bool {
        self.names.contains(name) || self.has_export_all
    }

    pub fn provides_default(&self) -> bool {
        self.has_default || self.names.contains("default") || self.has_export_all
    }
}

/// Checks named-import bindings against a target's exports, and a file's own
/// re-export / export-all statements one hop deep.
pub struct ExportGraphValidator<'a> {
    resolver: &'a PathResolver<'a>,
    cache: &'a FactCache,
}

impl<'a> ExportGraphValidator<'a> {
    pub fn new(resolver: &'a PathResolver<'a>, cache: &'a FactCache) -> Self {
        Self { resolver, cache }
    }

    /// Validates the named and default bindings of one resolved internal
    /// import against the target's attached exports.
    pub fn validate_named_imports(
        &self,
        record: &ImportRecord,
        target_exports: &[ExportRecord],
    ) -> Vec<Issue> {
        let mut issues = Vec::new();
        if record.bindings.is_empty() {
            return issues;
        }

        let set = ExportNameSet::from_exports(target_exports);
        let target_name = file_name_of(record);

        for binding in &record.bindings {
            match binding.kind {
                BindingKind::Named => {
                    if !set.provides(&binding.name) {
                        issues.push(
                            Issue::new(
                                IssueKind::UnresolvedNamedImport,
                                format!(
                                    "Named import '{}' not found in '{}'.",
                                    binding.name, target_name
                                ),
                                Some(record.line),
                            )
                            .with_identifier(binding.name.clone()),
                        );
                    }
                }
                BindingKind::Default => {
                    if !set.provides_default() {
                        issues.push(Issue::new(
                            IssueKind::UnresolvedDefaultImport,
                            format!("Default import not found in '{}'.", target_name),
                            Some(record.line),
                        ));
                    }
                }
                // Namespace and require bindings import whatever exists
                BindingKind::Namespace | BindingKind::Require => {}
            }
        }
        issues
    }

    /// Validates `export ... from` and `export * from` statements. One hop:
    /// each source's direct export list is inspected, nothing deeper.
    pub fn validate_re_exports(
        &self,
        exports: &[ExportRecord],
        base_dir: &Path,
        issues: &mut Vec<Issue>,
    ) {
        for export in exports {
            match export {
                ExportRecord::ReExport { from, pairs, line } => {
                    self.validate_re_export(from, pairs, *line, base_dir, issues);
                }
                ExportRecord::ExportAll { from, line } => {
                    self.validate_export_all(from, *line, base_dir, issues);
                }
                _ => {}
            }
        }
    }

    fn validate_re_export(
        &self,
        from: &str,
        pairs: &[importcheck_core::ReExportPair],
        line: u32,
        base_dir: &Path,
        issues: &mut Vec<Issue>,
    ) {
        let source = match self.resolver.resolve(from, base_dir) {
            Ok(Resolution::Source(p)) => p,
            // Builtins and dependency packages are never fact-checked
            Ok(_) => return,
            Err(_) => {
                issues.push(Issue::new(
                    IssueKind::UnresolvedReExportSource,
                    format!("Cannot resolve re-export source: {}", from),
                    Some(line),
                ));
                return;
            }
        };

        let facts = self.cache.facts_for(&source);
        if facts.file_not_found {
            issues.push(Issue::new(
                IssueKind::UnresolvedReExportSource,
                format!(
                    "Re-export source file not found: {} (re-exported from {})",
                    source.display(),
                    from
                ),
                Some(line),
            ));
            return;
        }
        if facts.syntax_error.is_some() {
            // Non-fatal: name checks continue against the (empty) export list
            issues.push(Issue::new(
                IssueKind::ErrorInReExportedFile,
                format!(
                    "Syntax error in re-exported file {} (re-exported from {})",
                    source.display(),
                    from
                ),
                Some(line),
            ));
        }

        let set = ExportNameSet::from_exports(&facts.exports);
        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());
        for pair in pairs {
            if !set.provides(&pair.local) {
                issues.push(
                    Issue::new(
                        IssueKind::MissingReExportedName,
                        format!(
                            "Re-exported name '{}' (as '{}') not found in '{}'.",
                            pair.local, pair.exported, source_name
                        ),
                        Some(line),
                    )
                    .with_identifier(pair.local.clone()),
                );
            }
        }
    }

    fn validate_export_all(&self, from: &str, line: u32, base_dir: &Path, issues: &mut Vec<Issue>) {
        let source = match self.resolver.resolve(from, base_dir) {
            Ok(Resolution::Source(p)) => p,
            Ok(_) => return,
            Err(e) => {
                issues.push(Issue::new(
                    IssueKind::UnresolvedReExportAllSource,
                    format!("Cannot resolve source for 'export * from \"{}\"': {}", from, e),
                    Some(line),
                ));
                return;
            }
        };

        // The wildcard forward is trusted unconditionally; only existence and
        // parsability of the source are checked.
        let facts = self.cache.facts_for(&source);
        if facts.file_not_found {
            issues.push(Issue::new(
                IssueKind::UnresolvedReExportAllSource,
                format!(
                    "Source file not found for 'export * from \"{}\"' (resolved to {}).",
                    from,
                    source.display()
                ),
                Some(line),
            ));
        } else if facts.syntax_error.is_some() {
            issues.push(Issue::new(
                IssueKind::ErrorInReExportedAllSource,
                format!(
                    "Syntax error in source file for 'export * from \"{}\"' ({}).",
                    from,
                    source.display()
                ),
                Some(line),
            ));
        }
    }
}

fn file_name_of(record: &ImportRecord) -> String {
    record
        .resolved_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| record.specifier.clone())
}
