use log::{debug, trace, warn};
use path_clean::clean;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::loader::{ConfigModuleLoader, StaticConfigLoader};

/// Ordered alias table: specifier prefix -> absolute directory.
///
/// Insertion order is config-source priority order, and `lookup` returns the
/// FIRST matching key in that order, not the longest prefix. This is a
/// documented behavioral contract inherited from the config conventions we
/// model: when alias keys overlap, the earlier-inserted key wins even if a
/// later one matches more of the specifier.
#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    entries: Vec<(String, PathBuf)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an alias. An existing key keeps its position but takes the new
    /// target, so a later config source silently wins on value.
    pub fn insert(&mut self, key: impl Into<String>, target: PathBuf) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = target;
        } else {
            self.entries.push((key, target));
        }
    }

    /// First-match lookup. Returns the matched target and, for prefix matches,
    /// the specifier remainder after `key + "/"`.
    pub fn lookup<'s>(&self, specifier: &'s str) -> Option<(&Path, Option<&'s str>)> {
        for (key, target) in &self.entries {
            if specifier == key {
                return Some((target, None));
            }
            if let Some(rest) = specifier.strip_prefix(key.as_str())
                && let Some(rest) = rest.strip_prefix('/')
            {
                return Some((target, Some(rest)));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

/// Fixed Next.js convention: these aliases are synthesized when the matching
/// sibling directory exists.
const NEXTJS_ALIAS_DIRS: [(&str, &str); 4] =
    [("@/pages", "pages"), ("@/components", "components"), ("@/lib", "lib"), ("@/utils", "utils")];

/// Aggregates alias definitions from every supported config convention into
/// one [`AliasTable`].
///
/// Sources are merged in fixed priority order (jsconfig, tsconfig, Babel
/// module-resolver, webpack, Vite, Next.js convention); a later source
/// overwrites an earlier one per key. A missing or unreadable source
/// contributes nothing and is logged as a warning; building always succeeds
/// with whatever partial table could be assembled.
pub struct AliasTableBuilder {
    root: PathBuf,
    loader: Box<dyn ConfigModuleLoader>,
}

impl AliasTableBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), loader: Box::new(StaticConfigLoader) }
    }

    /// Replaces the config-module loader, e.g. to opt in to an evaluating
    /// loader instead of the default static extraction.
    pub fn with_loader(mut self, loader: Box<dyn ConfigModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn build(&self) -> AliasTable {
        debug!("Building alias table for {}", self.root.display());
        let mut table = AliasTable::new();

        for (key, target) in self.json_paths_aliases("jsconfig.json") {
            table.insert(key, target);
        }
        for (key, target) in self.json_paths_aliases("tsconfig.json") {
            table.insert(key, target);
        }
        for (key, target) in self.module_config_aliases("babel.config.js", babel_alias_map) {
            table.insert(key, target);
        }
        for (key, target) in self.module_config_aliases("webpack.config.js", resolve_alias_map) {
            table.insert(key, target);
        }
        for (key, target) in self.module_config_aliases("vite.config.js", resolve_alias_map) {
            table.insert(key, target);
        }
        for (key, target) in self.nextjs_aliases() {
            table.insert(key, target);
        }

        debug!("Alias table has {} entries", table.len());
        table
    }

    /// jsconfig/tsconfig-style extraction: `compilerOptions.paths` entries with
    /// `/*` stripped from both sides, first target only, resolved against a
    /// `baseUrl` that is itself relative to the config file's directory.
    fn json_paths_aliases(&self, file_name: &str) -> Vec<(String, PathBuf)> {
        let config_path = self.root.join(file_name);
        if !config_path.exists() {
            trace!("No {} found", file_name);
            return Vec::new();
        }

        let content = match fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read {}: {}", config_path.display(), e);
                return Vec::new();
            }
        };

        // Strip // comments; tsconfig allows them (simple line-based approach)
        let content_no_comments: String = content
            .lines()
            .map(|line| if let Some(idx) = line.find("//") { &line[..idx] } else { line })
            .collect::<Vec<_>>()
            .join("\n");

        let json: serde_json::Value = match serde_json::from_str(&content_no_comments) {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not parse {}: {}", config_path.display(), e);
                return Vec::new();
            }
        };

        let Some(compiler_options) = json.get("compilerOptions") else {
            return Vec::new();
        };
        let Some(paths) = compiler_options.get("paths").and_then(|p| p.as_object()) else {
            return Vec::new();
        };

        let base_url = compiler_options.get("baseUrl").and_then(|b| b.as_str()).unwrap_or(".");
        let config_dir = config_path.parent().unwrap_or(&self.root);
        let base_dir = clean(config_dir.join(base_url));

        let mut aliases = Vec::new();
        for (alias, targets) in paths {
            let first = match targets {
                serde_json::Value::Array(arr) => arr.first().and_then(|t| t.as_str()),
                serde_json::Value::String(s) => Some(s.as_str()),
                _ => None,
            };
            let Some(target) = first else { continue };
            let key = alias.trim_end_matches("/*").to_string();
            let target = clean(base_dir.join(target.trim_end_matches("/*")));
            trace!("Found {} path alias: '{}' -> {}", file_name, key, target.display());
            aliases.push((key, target));
        }
        aliases
    }

    /// Babel/webpack/Vite-style extraction: load the config module's exported
    /// object through the pluggable loader, pick out its flat alias map, and
    /// resolve each value relative to the config file's directory. Load
    /// failure degrades to "no aliases from this source".
    fn module_config_aliases(
        &self,
        file_name: &str,
        alias_map: fn(&serde_json::Value) -> Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Vec<(String, PathBuf)> {
        let config_path = self.root.join(file_name);
        if !config_path.exists() {
            trace!("No {} found", file_name);
            return Vec::new();
        }

        let config = match self.loader.load(&config_path) {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not load {}: {}", config_path.display(), e);
                return Vec::new();
            }
        };

        let Some(map) = alias_map(&config) else {
            return Vec::new();
        };

        let config_dir = config_path.parent().unwrap_or(&self.root);
        let mut aliases = Vec::new();
        for (key, value) in map {
            let Some(target) = value.as_str() else { continue };
            let target = clean(config_dir.join(target));
            trace!("Found {} alias: '{}' -> {}", file_name, key, target.display());
            aliases.push((key, target));
        }
        aliases
    }

    fn nextjs_aliases(&self) -> Vec<(String, PathBuf)> {
        let mut aliases = Vec::new();
        for (alias, dir) in NEXTJS_ALIAS_DIRS {
            let target = self.root.join(dir);
            if target.is_dir() {
                trace!("Synthesizing Next.js alias '{}' -> {}", alias, target.display());
                aliases.push((alias.to_string(), target));
            }
        }
        aliases
    }
}

/// Finds the `alias` option of the `module-resolver` plugin in a Babel config.
fn babel_alias_map(config: &serde_json::Value) -> Option<serde_json::Map<String, serde_json::Value>> {
    config.get("plugins")?.as_array()?.iter().find_map(|plugin| {
        let entry = plugin.as_array()?;
        if entry.first()?.as_str()? != "module-resolver" {
            return None;
        }
        entry.get(1)?.get("alias")?.as_object().cloned()
    })
}

/// Finds `resolve.alias` in a webpack- or Vite-style config object.
fn resolve_alias_map(config: &serde_json::Value) -> Option<serde_json::Map<String, serde_json::Value>> {
    config.get("resolve")?.get("alias")?.as_object().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_insert_overwrites_value_keeps_position() {
        let mut table = AliasTable::new();
        table.insert("@app", PathBuf::from("/a"));
        table.insert("@lib", PathBuf::from("/b"));
        table.insert("@app", PathBuf::from("/c"));

        assert_eq!(table.len(), 2);
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries[0], ("@app", Path::new("/c")));
        assert_eq!(entries[1], ("@lib", Path::new("/b")));
    }

    #[test]
    fn test_lookup_first_match_not_longest_prefix() {
        let mut table = AliasTable::new();
        table.insert("@app", PathBuf::from("/short"));
        table.insert("@app/components", PathBuf::from("/long"));

        // '@app/components/Button' matches '@app' first even though the later
        // key is more specific
        let (target, rest) = table.lookup("@app/components/Button").unwrap();
        assert_eq!(target, Path::new("/short"));
        assert_eq!(rest, Some("components/Button"));
    }

    #[test]
    fn test_lookup_exact_and_prefix() {
        let mut table = AliasTable::new();
        table.insert("@utils", PathBuf::from("/src/utils"));

        let (target, rest) = table.lookup("@utils").unwrap();
        assert_eq!(target, Path::new("/src/utils"));
        assert_eq!(rest, None);

        let (_, rest) = table.lookup("@utils/format").unwrap();
        assert_eq!(rest, Some("format"));

        // '@utilsx' must not match '@utils'
        assert!(table.lookup("@utilsx").is_none());
    }

    #[test]
    fn test_tsconfig_paths_with_base_url() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(
            root,
            "tsconfig.json",
            r#"
{
  "compilerOptions": {
    "baseUrl": ".",
    "paths": {
      "@app/*": ["src/app/*"],
      "@utils": ["src/utils"]
    }
  }
}
"#,
        );

        let table = AliasTableBuilder::new(root).build();
        let (target, _) = table.lookup("@app/widget").unwrap();
        assert_eq!(target, clean(root.join("src/app")));
        let (target, _) = table.lookup("@utils").unwrap();
        assert_eq!(target, clean(root.join("src/utils")));
    }

    #[test]
    fn test_tsconfig_with_comments() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(
            root,
            "tsconfig.json",
            r#"
{
  // project config
  "compilerOptions": {
    "baseUrl": "src", // base
    "paths": {
      "@components/*": ["components/*"]
    }
  }
}
"#,
        );

        let table = AliasTableBuilder::new(root).build();
        let (target, _) = table.lookup("@components/Button").unwrap();
        assert_eq!(target, clean(root.join("src/components")));
    }

    #[test]
    fn test_unparsable_source_contributes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(root, "tsconfig.json", "{ not json at all");
        create_test_file(
            root,
            "jsconfig.json",
            r#"{"compilerOptions": {"paths": {"@ok/*": ["lib/*"]}}}"#,
        );

        let table = AliasTableBuilder::new(root).build();
        // build succeeds with the partial table from jsconfig
        assert_eq!(table.len(), 1);
        assert!(table.lookup("@ok/x").is_some());
    }

    #[test]
    fn test_source_priority_later_overwrites_earlier() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(
            root,
            "jsconfig.json",
            r#"{"compilerOptions": {"paths": {"@shared/*": ["js-side/*"]}}}"#,
        );
        create_test_file(
            root,
            "tsconfig.json",
            r#"{"compilerOptions": {"paths": {"@shared/*": ["ts-side/*"]}}}"#,
        );
        create_test_file(
            root,
            "webpack.config.js",
            "module.exports = { resolve: { alias: { '@shared': './wp-side' } } };",
        );

        let table = AliasTableBuilder::new(root).build();
        assert_eq!(table.len(), 1);
        let (target, _) = table.lookup("@shared/x").unwrap();
        // webpack is merged after both JSON sources, so it wins
        assert_eq!(target, clean(root.join("wp-side")));
    }

    #[test]
    fn test_webpack_static_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(
            root,
            "webpack.config.js",
            r#"
const path = require('path');
module.exports = {
  resolve: {
    alias: {
      '@src': path.resolve(__dirname, 'src'),
      '@assets': './assets'
    }
  }
};
"#,
        );

        let table = AliasTableBuilder::new(root).build();
        let (target, _) = table.lookup("@src/index").unwrap();
        assert_eq!(target, clean(root.join("src")));
        let (target, _) = table.lookup("@assets/logo.png").unwrap();
        assert_eq!(target, clean(root.join("assets")));
    }

    #[test]
    fn test_vite_define_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(
            root,
            "vite.config.js",
            r#"
import { defineConfig } from 'vite';
export default defineConfig({
  resolve: {
    alias: {
      '@': './src'
    }
  }
});
"#,
        );

        let table = AliasTableBuilder::new(root).build();
        let (target, rest) = table.lookup("@/components/App").unwrap();
        assert_eq!(target, clean(root.join("src")));
        assert_eq!(rest, Some("components/App"));
    }

    #[test]
    fn test_babel_module_resolver_plugin() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(
            root,
            "babel.config.js",
            r#"
module.exports = {
  presets: ['@babel/preset-env'],
  plugins: [
    ['module-resolver', {
      alias: {
        '@components': './src/components'
      }
    }],
    'other-plugin'
  ]
};
"#,
        );

        let table = AliasTableBuilder::new(root).build();
        let (target, _) = table.lookup("@components/Button").unwrap();
        assert_eq!(target, clean(root.join("src/components")));
    }

    #[test]
    fn test_nextjs_aliases_require_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("components")).unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();
        // no pages/, no utils/

        let table = AliasTableBuilder::new(root).build();
        assert!(table.lookup("@/components/Nav").is_some());
        assert!(table.lookup("@/lib/db").is_some());
        assert!(table.lookup("@/pages/index").is_none());
        assert!(table.lookup("@/utils/x").is_none());
    }

    #[test]
    fn test_empty_project_builds_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        let table = AliasTableBuilder::new(temp_dir.path()).build();
        assert!(table.is_empty());
    }
}
