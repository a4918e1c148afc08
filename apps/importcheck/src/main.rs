use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use importcheck_analyze::{
    Analyzer, CliOptions, RunReport, load_file_config, merge_options, write_report,
};

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = CliOptions::parse();
    debug!("Parsed CLI arguments: {:?}", cli);

    let cwd = std::env::current_dir()?;
    let file_config = load_file_config(&cwd);
    let options = merge_options(cli, file_config);

    let Some(target) = options.target.clone() else {
        eprintln!(
            "{} Target file or directory not specified (pass it as an argument or set it in .importcheckrc.json)",
            "✗".red().bold()
        );
        std::process::exit(1);
    };
    let target = if target.is_absolute() { target } else { cwd.join(target) };

    if !target.exists() {
        eprintln!("{} File or directory not found: {}", "✗".red().bold(), target.display());
        std::process::exit(1);
    }

    let start = Instant::now();
    let analyzer = Analyzer::new(&cwd);

    let report = if target.is_dir() {
        info!("Analyzing directory {}", target.display());
        RunReport::Directory(analyzer.analyze_directory(&target, &options)?)
    } else {
        info!("Analyzing file {}", target.display());
        RunReport::File(Box::new(analyzer.analyze_file(&target)))
    };

    let elapsed_ms = start.elapsed().as_millis();

    if let Some(output) = &options.output {
        let output = if output.is_absolute() { output.clone() } else { cwd.join(output) };
        let mut file = BufWriter::new(File::create(&output)?);
        write_report(&mut file, &report, options.format, &cwd)?;
        file.flush()?;
        writeln!(stdout, "{} Results saved to {}", "✓".green().bold(), output.display())?;
    } else {
        write_report(&mut stdout, &report, options.format, &cwd)?;
    }

    writeln!(
        stdout,
        "\n{} Finished in {}ms.",
        "●".bright_blue(),
        elapsed_ms.to_string().cyan()
    )?;
    stdout.flush()?;

    Ok(())
}
