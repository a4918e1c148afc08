//! Analysis layer for importcheck.
//!
//! Builds on `importcheck_core` to classify a file's imports, validate named
//! imports and re-export chains against the actual exports of their targets,
//! and fold per-file results into a run-wide summary.
//!
//! # Examples
//!
//! ```no_run
//! use importcheck_analyze::{Analyzer, RunOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let analyzer = Analyzer::new("/path/to/project");
//! let summary = analyzer
//!     .analyze_directory(std::path::Path::new("/path/to/project/src"), &RunOptions::default())?;
//! println!("{} files, {} with errors", summary.total_files, summary.files_with_errors);
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod classifier;
mod collector;
mod config;
mod reporter;
mod types;
mod validator;

// Re-export public API
pub use analyzer::Analyzer;
pub use classifier::ImportClassifier;
pub use collector::collect_files;
pub use config::{
    CONFIG_FILE_NAME, CliOptions, FileConfig, OutputFormat, RunOptions, load_file_config,
    merge_options,
};
pub use reporter::write_report;
pub use types::{
    AnalysisResult, DynamicImportRecord, FileStatus, ImportRecord, ImportStatus, RunReport,
    Summary,
};
pub use validator::{ExportGraphValidator, ExportNameSet};
