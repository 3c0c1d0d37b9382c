//! End-of-run summary table.

use std::time::Duration;

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::plan::{ExecutionReport, StepOutcome};

/// Row of the run summary table.
#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "STEP")]
    step: String,
    #[tabled(rename = "OUTCOME")]
    outcome: String,
    #[tabled(rename = "DURATION")]
    duration: String,
}

fn build_rows(report: &ExecutionReport) -> Vec<StepRow> {
    report
        .records
        .iter()
        .map(|record| StepRow {
            step: format!("{}{}", "  ".repeat(record.depth), record.description),
            outcome: match record.outcome {
                StepOutcome::Completed => "completed".to_string(),
                StepOutcome::Skipped => "skipped".to_string(),
            },
            duration: match record.outcome {
                StepOutcome::Completed => format_duration(record.elapsed),
                StepOutcome::Skipped => "-".to_string(),
            },
        })
        .collect()
}

/// Print visited steps and the overall result.
pub fn print_run_summary(report: &ExecutionReport) {
    println!();
    println!("{}", "Run Summary:".bold());

    let rows = build_rows(report);
    if rows.is_empty() {
        println!("  No steps were executed");
    } else {
        let mut table = Table::new(&rows);
        table.with(Style::sharp());
        println!("{}", table);
    }

    let footer = format!(
        "{} completed, {} skipped",
        report.completed(),
        report.skipped()
    );
    if report.aborted {
        println!("{} ({})", "Upgrade plan aborted".red().bold(), footer);
    } else {
        println!("{} ({})", "Upgrade plan finished".green().bold(), footer);
    }
}

fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}
