use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

use importcheck_core::{ExportRecord, Issue, IssueKind};

use crate::config::OutputFormat;
use crate::types::{AnalysisResult, FileStatus, ImportStatus, RunReport, Summary};

/// Renders a run report in the requested format into any writer.
pub fn write_report<W: Write>(
    writer: &mut W,
    report: &RunReport,
    format: OutputFormat,
    cwd: &Path,
) -> io::Result<()> {
    match (format, report) {
        (OutputFormat::Json, _) => write_json(writer, report),
        (OutputFormat::Summary, RunReport::Directory(summary)) => {
            write_summary(writer, summary, cwd)
        }
        (OutputFormat::Table, RunReport::Directory(summary)) => {
            write_summary(writer, summary, cwd)?;
            write_problem_files(writer, summary, cwd)
        }
        (_, RunReport::File(result)) => write_single_file(writer, result, cwd),
    }
}

fn write_json<W: Write>(writer: &mut W, report: &RunReport) -> io::Result<()> {
    let text = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    writeln!(writer, "{}", text)
}

fn relative_to<'p>(path: &'p Path, cwd: &Path) -> &'p Path {
    path.strip_prefix(cwd).unwrap_or(path)
}

fn status_label(status: FileStatus) -> colored::ColoredString {
    match status {
        FileStatus::Ok => "OK".green().bold(),
        FileStatus::Warning => "WARNING".yellow().bold(),
        FileStatus::Error => "ERROR".red().bold(),
    }
}

fn issue_prefix(issue: &Issue) -> colored::ColoredString {
    if issue.kind.is_hard() { "✗".red() } else { "⚠".yellow() }
}

fn write_issue_line<W: Write>(writer: &mut W, issue: &Issue, indent: &str) -> io::Result<()> {
    let line = match issue.line {
        Some(line) => format!(" (line {})", line).dimmed().to_string(),
        None => String::new(),
    };
    writeln!(writer, "{}{} {}{}", indent, issue_prefix(issue), issue.message, line)
}

fn write_summary<W: Write>(writer: &mut W, summary: &Summary, cwd: &Path) -> io::Result<()> {
    writeln!(writer, "{}", "Analysis summary".bold())?;
    writeln!(writer, "{}", "─".repeat(50).dimmed())?;
    writeln!(writer, "  Total files: {}", summary.total_files.to_string().cyan())?;
    writeln!(
        writer,
        "  Files with errors: {}",
        summary.files_with_errors.to_string().red().bold()
    )?;
    writeln!(
        writer,
        "  Files with warnings: {}",
        summary.files_with_warnings.to_string().yellow()
    )?;
    writeln!(writer, "  Total imports: {}", summary.total_imports.to_string().blue())?;
    writeln!(
        writer,
        "  Unresolved imports/re-exports: {}",
        summary.unresolved_imports.to_string().red()
    )?;
    writeln!(writer, "  Unused imports: {}", summary.unused_imports.to_string().yellow())?;
    writeln!(
        writer,
        "  Undeclared identifiers: {}",
        summary.undeclared_identifiers.to_string().red()
    )?;
    writeln!(
        writer,
        "  Critical code issues: {}",
        summary.critical_code_issues.to_string().red()
    )?;
    writeln!(writer, "  Console usage: {}", summary.console_usages.to_string().yellow())?;
    writeln!(writer, "  TODO/FIXME comments: {}", summary.todo_fixme_comments.to_string().yellow())?;

    // Worst offenders by hard-issue count
    let mut offenders: Vec<(&AnalysisResult, usize)> = summary
        .details
        .iter()
        .map(|r| (r, r.issues.iter().filter(|i| i.kind.is_hard()).count()))
        .filter(|(result, hard)| *hard > 0 || result.status == FileStatus::Error)
        .collect();

    if offenders.is_empty() {
        if summary.files_with_warnings == 0 {
            writeln!(writer, "\n{} No problems found.", "✓".green().bold())?;
        }
        return writer.flush();
    }

    offenders.sort_by(|a, b| b.1.cmp(&a.1));
    offenders.truncate(5);

    writeln!(writer, "\n{}", "Files with the most problems".bold())?;
    writeln!(writer, "{}", "─".repeat(50).dimmed())?;
    for (index, (result, hard)) in offenders.iter().enumerate() {
        writeln!(
            writer,
            "  {}. {} ({} {})",
            index + 1,
            relative_to(&result.file, cwd).display().to_string().cyan(),
            hard.to_string().red(),
            if *hard == 1 { "problem" } else { "problems" },
        )?;
    }
    writer.flush()
}

fn write_problem_files<W: Write>(writer: &mut W, summary: &Summary, cwd: &Path) -> io::Result<()> {
    let problem_files: Vec<&AnalysisResult> = summary
        .details
        .iter()
        .filter(|result| {
            result.status == FileStatus::Error
                || result.issues.iter().any(|i| i.kind != IssueKind::UnusedImports)
        })
        .collect();

    if problem_files.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Problematic files".bold())?;
    writeln!(writer, "{}", "─".repeat(50).dimmed())?;

    for result in problem_files {
        writeln!(
            writer,
            "\n{} ({})",
            relative_to(&result.file, cwd).display().to_string().cyan(),
            status_label(result.status)
        )?;
        if let Some(error) = &result.syntax_error {
            let mut message = error.message.clone();
            if let Some(line) = error.line {
                message.push_str(&format!(" (line {}", line));
                if let Some(column) = error.column {
                    message.push_str(&format!(", column {}", column + 1));
                }
                message.push(')');
            }
            writeln!(writer, "  {} Syntax error: {}", "✗".red(), message)?;
        }
        for issue in &result.issues {
            write_issue_line(writer, issue, "  ")?;
        }
    }
    writer.flush()
}

fn write_single_file<W: Write>(
    writer: &mut W,
    result: &AnalysisResult,
    cwd: &Path,
) -> io::Result<()> {
    writeln!(writer, "{}", "File analysis".bold())?;
    writeln!(writer, "{}", "─".repeat(50).dimmed())?;
    writeln!(writer, "File: {}", relative_to(&result.file, cwd).display().to_string().cyan())?;
    writeln!(writer, "Status: {}", status_label(result.status))?;

    if let Some(error) = &result.syntax_error
        && result.status == FileStatus::Error
    {
        let mut message = error.message.clone();
        if let Some(line) = error.line {
            message.push_str(&format!(" (line {}", line));
            if let Some(column) = error.column {
                message.push_str(&format!(", column {}", column + 1));
            }
            message.push(')');
        }
        writeln!(writer, "\n{} {}", "✗".red().bold(), message)?;
        return writer.flush();
    }

    if !result.imports.is_empty() {
        writeln!(writer, "\n{}", "Imports".bold())?;
        writeln!(writer, "{}", "─".repeat(30).dimmed())?;
        for record in &result.imports {
            let icon = match record.status {
                ImportStatus::Resolved | ImportStatus::External => "✓".green(),
                ImportStatus::Failed => "✗".red(),
                ImportStatus::Warning => "⚠".yellow(),
            };
            let line = format!(" (line {})", record.line).dimmed();
            writeln!(writer, "{} {}{}", icon, record.specifier, line)?;
            if let Some(error) = &record.error {
                writeln!(writer, "   {} {}", "error:".red(), error)?;
            }
            for issue in &record.issues {
                writeln!(writer, "   {} {}", "└".dimmed(), issue.message)?;
            }
            if !record.bindings.is_empty() {
                let names: Vec<&str> = record
                    .bindings
                    .iter()
                    .map(|b| b.alias.as_deref().unwrap_or(b.name.as_str()))
                    .collect();
                writeln!(writer, "   {} {}", "imports:".dimmed(), names.join(", "))?;
            }
        }
    }

    if !result.dynamic_imports.is_empty() {
        writeln!(writer, "\n{}", "Dynamic imports".bold())?;
        writeln!(writer, "{}", "─".repeat(30).dimmed())?;
        for record in &result.dynamic_imports {
            let icon = match record.status {
                ImportStatus::Failed => "✗".red(),
                _ => "✓".green(),
            };
            let line = format!(" (line {})", record.line).dimmed();
            writeln!(writer, "{} {}{}", icon, record.specifier, line)?;
            if let Some(error) = &record.error {
                writeln!(writer, "   {} {}", "error:".red(), error)?;
            }
        }
    }

    if !result.exports.is_empty() {
        writeln!(writer, "\n{}", "Exports".bold())?;
        writeln!(writer, "{}", "─".repeat(30).dimmed())?;
        for export in &result.exports {
            let line = format!(" (line {})", export.line()).dimmed();
            match export {
                ExportRecord::Named { names, .. } => {
                    writeln!(writer, "• named: {{ {} }}{}", names.join(", "), line)?;
                }
                ExportRecord::Default { .. } => writeln!(writer, "• default{}", line)?,
                ExportRecord::ReExport { from, pairs, .. } => {
                    let names: Vec<String> = pairs
                        .iter()
                        .map(|p| {
                            if p.local == p.exported {
                                p.local.clone()
                            } else {
                                format!("{} as {}", p.local, p.exported)
                            }
                        })
                        .collect();
                    writeln!(writer, "• re-export: {{ {} }} from {}{}", names.join(", "), from, line)?;
                }
                ExportRecord::ExportAll { from, .. } => {
                    writeln!(writer, "• export * from {}{}", from, line)?;
                }
            }
        }
    }

    let issues: Vec<&Issue> =
        result.issues.iter().filter(|i| i.kind != IssueKind::UnusedImports).collect();
    if !issues.is_empty() {
        writeln!(writer, "\n{}", "Issues".bold())?;
        writeln!(writer, "{}", "─".repeat(30).dimmed())?;
        for issue in issues {
            write_issue_line(writer, issue, "  ")?;
        }
    }

    if !result.unused_imports.is_empty() {
        writeln!(writer, "\n{}", "Unused imports".bold())?;
        writeln!(writer, "{}", "─".repeat(30).dimmed())?;
        for name in &result.unused_imports {
            writeln!(writer, "• {}", name.yellow())?;
        }
    }

    writer.flush()
}
