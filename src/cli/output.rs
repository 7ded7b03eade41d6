//! Terminal output for CLI commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::client::SandboxResponse;
use crate::scenarios::{ScenarioReport, Verdict};

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn verdict_label(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Passed => "PASS".green().to_string(),
        Verdict::Failed(_) => "FAIL".red().to_string(),
        Verdict::Skipped => "SKIP".yellow().to_string(),
    }
}

/// Print one line per scenario plus a summary
pub fn print_report(report: &ScenarioReport) {
    println!();
    println!("{:<6} {:<8} {:<52} {:>9}", "Result", "Suite", "Scenario", "Time (ms)");
    println!("{}", "-".repeat(78));

    for outcome in &report.outcomes {
        println!(
            "{:<6} {:<8} {:<52} {:>9}",
            verdict_label(&outcome.verdict),
            outcome.suite.to_string(),
            truncate(&outcome.name, 52),
            outcome.duration_ms
        );
        if let Verdict::Failed(reason) = &outcome.verdict {
            println!("       {}", reason.dimmed());
        }
    }

    println!();
    let summary = format!(
        "{} passed, {} failed, {} skipped",
        report.passed(),
        report.failed(),
        report.skipped()
    );
    if report.is_success() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
    }
}

/// Print a raw (not followed) sandbox response
pub fn print_response(response: &SandboxResponse) {
    println!("{} {}", "GET".bold(), response.requested);
    println!("Status: {}", response.status);
    if let Some(location) = response.location() {
        println!("Location: {}", location);
    }
    for (name, value) in &response.headers {
        println!("{}: {}", name.as_str().dimmed(), value.to_str().unwrap_or("<binary>"));
    }
    println!();
    println!("{}", response.body);
}
