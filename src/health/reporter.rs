//! Formatting and reporting for self-check results

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::Verdict;
use super::report::RunReport;

/// Formats a report as a table followed by a summary block
pub fn format_report(report: &RunReport) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Check", "Verdict", "Duration", "Detail"]);

    for outcome in &report.outcomes {
        let detail = match &outcome.verdict {
            Verdict::Ok(text) | Verdict::Failed(text) | Verdict::Errored(text) => text.as_str(),
        };
        builder.push_record([
            outcome.name.as_str(),
            &outcome.verdict.as_colored_str(),
            &format!("{:.2?}", outcome.duration),
            detail,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = table.to_string();
    output.push('\n');
    output.push_str(&format_summary(report));
    output
}

fn format_summary(report: &RunReport) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("\n{}\n", "Summary".bold().underline()));
    summary.push_str(&format!("  Total checks: {}\n", report.total()));
    summary.push_str(&format!("  {} Ok: {}\n", "✓".green(), report.passed()));

    if report.failed() > 0 {
        summary.push_str(&format!("  {} Failed: {}\n", "⚠".yellow(), report.failed()));
    }

    if report.errored() > 0 {
        summary.push_str(&format!("  {} Errored: {}\n", "✗".red(), report.errored()));
    }

    summary.push_str(&format!("\n  Status: {}\n", report.status_line()));

    if !report.errors.is_empty() {
        summary.push_str(&format!("\n{}\n", "Errors".bold().underline()));
        for entry in &report.errors {
            summary.push_str(&format!("  {} {}\n", "•".red(), entry));
        }
    }

    summary.push('\n');
    let overall = if report.is_healthy() {
        "Overall: HEALTHY".green().bold()
    } else if report.errored() > 0 {
        "Overall: UNHEALTHY".red().bold()
    } else {
        "Overall: DEGRADED".yellow().bold()
    };
    summary.push_str(&format!("  {overall}\n"));

    summary
}

/// Pretty-printed JSON for machine consumers
pub fn format_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Prints a report to stdout
pub fn print_report(report: &RunReport) {
    println!("{}", format_report(report));
}
