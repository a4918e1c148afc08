use anyhow::Result;
use ignore::{WalkBuilder, overrides::OverrideBuilder};
use log::{debug, trace, warn};
use std::path::{Path, PathBuf};

use crate::config::RunOptions;

/// Enumerates the files to analyze under `root`: extension allow-list,
/// ignore globs, recursion flag. Paths come back sorted so scan order (and
/// report order) is deterministic.
pub fn collect_files(root: &Path, options: &RunOptions) -> Result<Vec<PathBuf>> {
    debug!("Collecting files under {}", root.display());

    // Run options fully specify what is skipped; gitignore inheritance stays
    // off. Negated overrides exclude the ignore globs.
    let mut overrides = OverrideBuilder::new(root);
    for pattern in &options.ignore {
        overrides.add(&format!("!{}", pattern))?;
    }
    let overrides = overrides.build()?;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .overrides(overrides);
    if !options.recursive {
        builder.max_depth(Some(1));
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str())
            && options.extensions.iter().any(|allowed| allowed.trim_start_matches('.') == ext)
        {
            trace!("Collected {}", path.display());
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!("Collected {} files", files.len());
    Ok(files)
}
