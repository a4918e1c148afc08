use clap::{Parser, ValueEnum};
use log::{debug, warn};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Project config file probed in the working directory.
pub const CONFIG_FILE_NAME: &str = ".importcheckrc.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Summary,
}

/// CLI surface. Every option can also come from the project config file;
/// flags given on the command line win.
#[derive(Debug, Clone, Parser)]
#[command(name = "importcheck")]
#[command(about = "Validate imports, exports and module resolution in JavaScript/TypeScript projects")]
pub struct CliOptions {
    /// File or directory to analyze (falls back to the config file's target)
    pub target: Option<PathBuf>,

    /// Scan subdirectories
    #[arg(long, short)]
    pub recursive: bool,

    /// Do not scan subdirectories
    #[arg(long, conflicts_with = "recursive")]
    pub no_recursive: bool,

    /// Comma-separated file extensions to analyze
    #[arg(long, short, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Comma-separated glob patterns to ignore
    #[arg(long, short, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Output format
    #[arg(long, short, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Options read from `.importcheckrc.json`. Absent fields fall through to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConfig {
    pub target: Option<PathBuf>,
    pub recursive: Option<bool>,
    pub extensions: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

/// Effective options for one run, after merging CLI > file config > defaults.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: Option<PathBuf>,
    pub recursive: bool,
    pub extensions: Vec<String>,
    pub ignore: Vec<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target: None,
            recursive: true,
            extensions: [".js", ".jsx", ".ts", ".tsx", ".vue"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignore: ["node_modules/**", "dist/**", "build/**", ".git/**"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            format: OutputFormat::Table,
            output: None,
        }
    }
}

/// Reads the project config file. A missing file is an empty config; an
/// unparsable one is a warning, never fatal.
pub fn load_file_config(cwd: &Path) -> FileConfig {
    let config_path = cwd.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return FileConfig::default();
    }
    let content = match fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Could not read {}: {}", config_path.display(), e);
            return FileConfig::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(config) => {
            debug!("Loaded configuration from {}", config_path.display());
            config
        }
        Err(e) => {
            warn!("Could not parse {}: {}", config_path.display(), e);
            FileConfig::default()
        }
    }
}

/// CLI precedence > file config > built-in defaults.
pub fn merge_options(cli: CliOptions, file: FileConfig) -> RunOptions {
    let defaults = RunOptions::default();
    RunOptions {
        target: cli.target.or(file.target),
        recursive: if cli.recursive {
            true
        } else if cli.no_recursive {
            false
        } else {
            file.recursive.unwrap_or(defaults.recursive)
        },
        extensions: if cli.extensions.is_empty() {
            file.extensions.unwrap_or(defaults.extensions)
        } else {
            cli.extensions
        },
        ignore: if cli.ignore.is_empty() {
            file.ignore.unwrap_or(defaults.ignore)
        } else {
            cli.ignore
        },
        format: cli.format.or(file.format).unwrap_or(defaults.format),
        output: cli.output.or(file.output),
    }
}
