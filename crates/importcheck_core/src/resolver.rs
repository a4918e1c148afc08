use log::trace;
use path_clean::clean;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::alias::AliasTable;
use crate::constants::{RESOLVE_EXTENSIONS, is_builtin_module};

/// Outcome of resolving an import specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A project file on disk, fully probed.
    Source(PathBuf),
    /// A platform builtin module; returned unchanged.
    Builtin(String),
    /// A file inside a dependency package boundary (`node_modules`).
    Package(PathBuf),
}

impl Resolution {
    /// External outcomes are never fact-checked.
    pub fn is_external(&self) -> bool {
        !matches!(self, Resolution::Source(_))
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Cannot resolve module: {specifier} (from {})", .from_dir.display())]
    ModuleNotResolvable { specifier: String, from_dir: PathBuf },
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },
}

/// Capability abstracting the host platform's package-lookup algorithm, so the
/// engine is portable across runtimes. Returns the located entry file, or
/// `None` when the specifier is not installed anywhere above `from_dir`.
pub trait PackageLocator: Send + Sync {
    fn locate(&self, specifier: &str, from_dir: &Path) -> Option<PathBuf>;
}

/// Node-style locator: walks `node_modules` directories upward from the
/// importing file, resolving a package's entry via `package.json`
/// (string `exports`, then `module`, then `main`) with an index-file fallback.
/// Conditional export maps are out of scope.
pub struct NodeModulesLocator;

impl PackageLocator for NodeModulesLocator {
    fn locate(&self, specifier: &str, from_dir: &Path) -> Option<PathBuf> {
        trace!("Walking up from {} to find node_modules for '{}'", from_dir.display(), specifier);
        let mut dir = Some(from_dir);
        while let Some(current) = dir {
            if let Some(found) = locate_in(current, specifier) {
                return Some(found);
            }
            dir = current.parent();
        }
        None
    }
}

fn locate_in(dir: &Path, specifier: &str) -> Option<PathBuf> {
    let candidate = dir.join("node_modules").join(specifier);
    if candidate.is_file() {
        return Some(candidate);
    }

    // Subpath imports without an extension: `pkg/lib/util`
    if candidate.extension().is_none() {
        for ext in RESOLVE_EXTENSIONS {
            let with_ext = PathBuf::from(format!("{}{}", candidate.display(), ext));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
    }

    if !candidate.is_dir() {
        return None;
    }

    let pkg_json = candidate.join("package.json");
    if pkg_json.exists()
        && let Ok(txt) = fs::read_to_string(&pkg_json)
        && let Ok(v) = serde_json::from_str::<serde_json::Value>(&txt)
    {
        // String-form exports, then module (ESM entry), then main
        let entries = [
            v.get("exports").and_then(|x| x.as_str()),
            v.get("module").and_then(|x| x.as_str()),
            v.get("main").and_then(|x| x.as_str()),
        ];
        for entry in entries.into_iter().flatten() {
            let p = candidate.join(entry.trim_start_matches("./"));
            if let Ok(resolved) = find_existing_file(&p) {
                return Some(resolved);
            }
        }
    }

    for ext in RESOLVE_EXTENSIONS {
        let index = candidate.join(format!("index{}", ext));
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Resolves import specifiers to project files or external markers, using the
/// run's alias table and an injected package locator.
pub struct PathResolver<'a> {
    aliases: &'a AliasTable,
    packages: &'a dyn PackageLocator,
}

impl<'a> PathResolver<'a> {
    pub fn new(aliases: &'a AliasTable, packages: &'a dyn PackageLocator) -> Self {
        Self { aliases, packages }
    }

    /// Rule order: relative/absolute, builtin, alias (first match is final),
    /// package lookup. Anything else is `ModuleNotResolvable`.
    pub fn resolve(&self, specifier: &str, from_dir: &Path) -> Result<Resolution, ResolveError> {
        trace!("Resolving '{}' from {}", specifier, from_dir.display());

        if specifier.starts_with('.') || Path::new(specifier).is_absolute() {
            let joined = clean(from_dir.join(specifier));
            return find_existing_file(&joined).map(Resolution::Source);
        }

        if is_builtin_module(specifier) {
            trace!("'{}' is a platform builtin", specifier);
            return Ok(Resolution::Builtin(specifier.to_string()));
        }

        // First matching alias key wins, and its probe result is final: no
        // fallback to later aliases or to package lookup.
        if let Some((target, rest)) = self.aliases.lookup(specifier) {
            let base = match rest {
                Some(rest) => target.join(rest),
                None => target.to_path_buf(),
            };
            trace!("Alias matched '{}', probing {}", specifier, base.display());
            return find_existing_file(&base).map(Resolution::Source);
        }

        if let Some(found) = self.packages.locate(specifier, from_dir) {
            if in_package_boundary(&found) {
                trace!("'{}' located inside a dependency package", specifier);
                return Ok(Resolution::Package(found));
            }
            return find_existing_file(&found).map(Resolution::Source);
        }

        Err(ResolveError::ModuleNotResolvable {
            specifier: specifier.to_string(),
            from_dir: from_dir.to_path_buf(),
        })
    }
}

/// Returns true when `path` lies inside a `node_modules` directory.
pub fn in_package_boundary(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "node_modules")
}

/// File probing. An existing regular file is returned unchanged (idempotent).
/// An extensionless base tries each probe extension in order, then
/// `index.<ext>` inside the base if it is a directory. Anything else fails
/// with `FileNotFound`.
pub fn find_existing_file(base: &Path) -> Result<PathBuf, ResolveError> {
    if base.is_file() {
        return Ok(base.to_path_buf());
    }

    if base.extension().is_none() {
        for ext in RESOLVE_EXTENSIONS {
            let with_ext = PathBuf::from(format!("{}{}", base.display(), ext));
            if with_ext.exists() {
                return Ok(with_ext);
            }
        }

        if base.is_dir() {
            for ext in RESOLVE_EXTENSIONS {
                let index = base.join(format!("index{}", ext));
                if index.exists() {
                    return Ok(index);
                }
            }
        }
    }

    Err(ResolveError::FileNotFound { path: base.to_path_buf() })
}
