use dashmap::DashMap;
use log::trace;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::extractor::{FactExtractor, OxcFactExtractor};
use crate::types::ModuleFacts;

/// Per-run read-through cache of module facts, keyed by absolute path.
///
/// Each path is extracted at most once per run no matter how many times it is
/// referenced; all callers share the same `Arc`. A nonexistent path yields the
/// cached `file_not_found` sentinel fact instead of an error, so every caller
/// gets a uniform result shape. The cache is passed by reference into whatever
/// needs facts and is cleared at the start of every top-level entry point.
pub struct FactCache {
    inner: DashMap<PathBuf, Arc<ModuleFacts>>,
    extractor: Box<dyn FactExtractor>,
}

impl FactCache {
    pub fn new(extractor: Box<dyn FactExtractor>) -> Self {
        Self { inner: DashMap::new(), extractor }
    }

    pub fn with_default_extractor() -> Self {
        Self::new(Box::new(OxcFactExtractor))
    }

    pub fn facts_for(&self, path: &Path) -> Arc<ModuleFacts> {
        if let Some(hit) = self.inner.get(path) {
            trace!("Fact cache hit: {}", path.display());
            return hit.clone();
        }
        self.inner
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(self.load(path)))
            .clone()
    }

    fn load(&self, path: &Path) -> ModuleFacts {
        trace!("Extracting facts for {}", path.display());
        let Ok(source) = fs::read_to_string(path) else {
            return ModuleFacts::missing(path);
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        self.extractor.extract(&source, path, &extension)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_facts_computed_once_and_shared() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "a.js", "export const a = 1;");

        let cache = FactCache::with_default_extractor();
        let first = cache.facts_for(&file);
        let second = cache.facts_for(&file);

        // Reference-identical, extracted exactly once
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_path_yields_cached_sentinel() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("gone.js");

        let cache = FactCache::with_default_extractor();
        let facts = cache.facts_for(&gone);
        assert!(facts.file_not_found);

        // The sentinel is itself a cacheable fact
        let again = cache.facts_for(&gone);
        assert!(Arc::ptr_eq(&facts, &again));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_resets_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "a.js", "export const a = 1;");

        let cache = FactCache::with_default_extractor();
        let before = cache.facts_for(&file);
        cache.clear();
        assert!(cache.is_empty());

        let after = cache.facts_for(&file);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_syntax_error_captured_as_data() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "broken.js", "import { from ';;;");

        let cache = FactCache::with_default_extractor();
        let facts = cache.facts_for(&file);
        assert!(!facts.file_not_found);
        assert!(facts.syntax_error.is_some());
    }
}
