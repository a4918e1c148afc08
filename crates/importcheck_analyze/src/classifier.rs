use log::trace;
use std::path::{Path, PathBuf};

use importcheck_core::{
    ANALYZABLE_EXTENSIONS, DynamicImportDecl, FactCache, ImportDecl, Issue, IssueKind,
    PathResolver, Resolution,
};

use crate::types::{DynamicImportRecord, ImportRecord, ImportStatus};

/// Resolves and classifies a file's static and dynamic imports.
///
/// Internal resolved imports get the target's export list attached for later
/// name validation; externals (builtins, dependency packages, non-code assets)
/// are never fact-checked.
pub struct ImportClassifier<'a> {
    resolver: &'a PathResolver<'a>,
    cache: &'a FactCache,
}

impl<'a> ImportClassifier<'a> {
    pub fn new(resolver: &'a PathResolver<'a>, cache: &'a FactCache) -> Self {
        Self { resolver, cache }
    }

    pub fn classify_imports(
        &self,
        imports: &[ImportDecl],
        base_dir: &Path,
        issues: &mut Vec<Issue>,
    ) -> Vec<ImportRecord> {
        imports.iter().map(|imp| self.classify_import(imp, base_dir, issues)).collect()
    }

    fn classify_import(
        &self,
        imp: &ImportDecl,
        base_dir: &Path,
        issues: &mut Vec<Issue>,
    ) -> ImportRecord {
        let mut record = ImportRecord {
            specifier: imp.specifier.clone(),
            bindings: imp.bindings.clone(),
            line: imp.line,
            resolved_path: None,
            status: ImportStatus::Resolved,
            error: None,
            attached_exports: None,
            issues: Vec::new(),
        };

        let resolution = match self.resolver.resolve(&imp.specifier, base_dir) {
            Ok(r) => r,
            Err(e) => {
                record.status = ImportStatus::Failed;
                record.error = Some(e.to_string());
                issues.push(Issue::new(
                    IssueKind::UnresolvedImport,
                    format!("Cannot resolve: {}", imp.specifier),
                    Some(imp.line),
                ));
                return record;
            }
        };

        let path = match resolution {
            Resolution::Builtin(name) => {
                trace!("'{}' classified external (builtin)", imp.specifier);
                record.status = ImportStatus::External;
                record.resolved_path = Some(PathBuf::from(name));
                return record;
            }
            Resolution::Package(p) => {
                trace!("'{}' classified external (package)", imp.specifier);
                record.status = ImportStatus::External;
                record.resolved_path = Some(p);
                return record;
            }
            Resolution::Source(p) => p,
        };

        record.resolved_path = Some(path.clone());

        if !ANALYZABLE_EXTENSIONS.contains(&extension_of(&path).as_str()) {
            // Non-code assets resolve fine but are never fact-checked
            trace!("'{}' classified external (asset)", imp.specifier);
            record.status = ImportStatus::External;
            return record;
        }

        let facts = self.cache.facts_for(&path);
        if facts.file_not_found {
            record.status = ImportStatus::Failed;
            record.error = facts.syntax_error.as_ref().map(|e| e.message.clone());
            issues.push(Issue::new(
                IssueKind::UnresolvedImport,
                format!("Resolved file not found: {} (imported as {})", path.display(), imp.specifier),
                Some(imp.line),
            ));
        } else if facts.syntax_error.is_some() {
            record.status = ImportStatus::Warning;
            record.error = Some(format!("Syntax error in imported file: {}", path.display()));
            issues.push(Issue::new(
                IssueKind::ErrorInImportedFile,
                format!("Syntax error in {} (imported as {})", path.display(), imp.specifier),
                Some(imp.line),
            ));
        } else {
            record.attached_exports = Some(facts.exports.clone());
        }
        record
    }

    /// Dynamic imports share the resolution path and external split but are
    /// never checked against target exports.
    pub fn classify_dynamic_imports(
        &self,
        imports: &[DynamicImportDecl],
        base_dir: &Path,
        issues: &mut Vec<Issue>,
    ) -> Vec<DynamicImportRecord> {
        let mut records = Vec::with_capacity(imports.len());
        for imp in imports {
            let mut record = DynamicImportRecord::from_decl(imp, ImportStatus::Resolved);
            match self.resolver.resolve(&imp.specifier, base_dir) {
                Ok(Resolution::Builtin(name)) => {
                    record.status = ImportStatus::External;
                    record.resolved_path = Some(PathBuf::from(name));
                }
                Ok(Resolution::Package(p)) => {
                    record.status = ImportStatus::External;
                    record.resolved_path = Some(p);
                }
                Ok(Resolution::Source(p)) => {
                    record.resolved_path = Some(p);
                }
                Err(e) => {
                    record.status = ImportStatus::Failed;
                    record.error = Some(e.to_string());
                    issues.push(Issue::new(
                        IssueKind::UnresolvedDynamicImport,
                        format!("Cannot resolve dynamic import: {}", imp.specifier),
                        Some(imp.line),
                    ));
                }
            }
            records.push(record);
        }
        records
    }
}

fn extension_of(path: &Path) -> String {
    path.extension().and_then(|e| e.to_str()).map(|e| format!(".{}", e)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use importcheck_core::{AliasTable, BindingKind, ImportBinding, NodeModulesLocator};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn import_of(specifier: &str, line: u32) -> ImportDecl {
        ImportDecl {
            specifier: specifier.to_string(),
            bindings: vec![ImportBinding {
                name: "default".to_string(),
                alias: Some("x".to_string()),
                kind: BindingKind::Default,
            }],
            line,
        }
    }

    #[test]
    fn test_failed_import_raises_unresolved() {
        let temp_dir = TempDir::new().unwrap();
        let aliases = AliasTable::new();
        let resolver = PathResolver::new(&aliases, &NodeModulesLocator);
        let cache = FactCache::with_default_extractor();
        let classifier = ImportClassifier::new(&resolver, &cache);

        let mut issues = Vec::new();
        let records =
            classifier.classify_imports(&[import_of("./missing", 3)], temp_dir.path(), &mut issues);

        assert_eq!(records[0].status, ImportStatus::Failed);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnresolvedImport);
        assert_eq!(issues[0].line, Some(3));
    }

    #[test]
    fn test_asset_import_is_external_without_fact_check() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "theme.css", "body {}");
        let aliases = AliasTable::new();
        let resolver = PathResolver::new(&aliases, &NodeModulesLocator);
        let cache = FactCache::with_default_extractor();
        let classifier = ImportClassifier::new(&resolver, &cache);

        let mut issues = Vec::new();
        let records =
            classifier.classify_imports(&[import_of("./theme.css", 1)], temp_dir.path(), &mut issues);

        assert_eq!(records[0].status, ImportStatus::External);
        assert!(records[0].attached_exports.is_none());
        assert!(issues.is_empty());
        // the css file was never parsed
        assert!(cache.is_empty());
    }

    #[test]
    fn test_builtin_is_external() {
        let temp_dir = TempDir::new().unwrap();
        let aliases = AliasTable::new();
        let resolver = PathResolver::new(&aliases, &NodeModulesLocator);
        let cache = FactCache::with_default_extractor();
        let classifier = ImportClassifier::new(&resolver, &cache);

        let mut issues = Vec::new();
        let records =
            classifier.classify_imports(&[import_of("fs", 1)], temp_dir.path(), &mut issues);
        assert_eq!(records[0].status, ImportStatus::External);
        assert!(records[0].attached_exports.is_none());
    }

    #[test]
    fn test_internal_import_attaches_exports() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "lib.js", "export const present = 1;");
        let aliases = AliasTable::new();
        let resolver = PathResolver::new(&aliases, &NodeModulesLocator);
        let cache = FactCache::with_default_extractor();
        let classifier = ImportClassifier::new(&resolver, &cache);

        let mut issues = Vec::new();
        let records =
            classifier.classify_imports(&[import_of("./lib", 1)], temp_dir.path(), &mut issues);

        assert_eq!(records[0].status, ImportStatus::Resolved);
        let exports = records[0].attached_exports.as_ref().unwrap();
        assert_eq!(exports.len(), 1);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_import_of_broken_file_warns() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "broken.js", "import { from ';;;");
        let aliases = AliasTable::new();
        let resolver = PathResolver::new(&aliases, &NodeModulesLocator);
        let cache = FactCache::with_default_extractor();
        let classifier = ImportClassifier::new(&resolver, &cache);

        let mut issues = Vec::new();
        let records =
            classifier.classify_imports(&[import_of("./broken", 2)], temp_dir.path(), &mut issues);

        assert_eq!(records[0].status, ImportStatus::Warning);
        assert_eq!(issues[0].kind, IssueKind::ErrorInImportedFile);
        assert!(records[0].attached_exports.is_none());
    }

    #[test]
    fn test_dynamic_import_never_attaches_exports() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "page.js", "export const page = 1;");
        let aliases = AliasTable::new();
        let resolver = PathResolver::new(&aliases, &NodeModulesLocator);
        let cache = FactCache::with_default_extractor();
        let classifier = ImportClassifier::new(&resolver, &cache);

        let mut issues = Vec::new();
        let records = classifier.classify_dynamic_imports(
            &[DynamicImportDecl { specifier: "./page".to_string(), line: 4 }],
            temp_dir.path(),
            &mut issues,
        );

        assert_eq!(records[0].status, ImportStatus::Resolved);
        assert!(records[0].resolved_path.is_some());
        // resolution only; the target is not parsed for dynamic imports
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_dynamic_import_is_soft() {
        let temp_dir = TempDir::new().unwrap();
        let aliases = AliasTable::new();
        let resolver = PathResolver::new(&aliases, &NodeModulesLocator);
        let cache = FactCache::with_default_extractor();
        let classifier = ImportClassifier::new(&resolver, &cache);

        let mut issues = Vec::new();
        let records = classifier.classify_dynamic_imports(
            &[DynamicImportDecl { specifier: "./missing".to_string(), line: 9 }],
            temp_dir.path(),
            &mut issues,
        );

        assert_eq!(records[0].status, ImportStatus::Failed);
        assert_eq!(issues[0].kind, IssueKind::UnresolvedDynamicImport);
        assert!(!issues[0].kind.is_hard());
    }
}
