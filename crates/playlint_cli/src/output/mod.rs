//! Output formatting module

mod json;
mod sarif;
mod text;

use miette::Result;
use playlint_core::Report;

use crate::cli::OutputFormat;

pub fn output_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => json::output_json(report),
        OutputFormat::Sarif => sarif::output_sarif(report),
        OutputFormat::Text => {
            text::output_text(report);
            Ok(())
        }
    }
}

/// Prints the one-line human summary to stderr.
pub fn print_summary(report: &Report) {
    eprintln!("{}", summary_line(report));
}

fn summary_line(report: &Report) -> String {
    let mut line = format!(
        "playlint: {} files checked, {} errors, {} warnings, {} info",
        report.files_checked, report.summary.error, report.summary.warning, report.summary.info
    );
    if report.incomplete {
        line.push_str(" (incomplete: run was cancelled)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlint_core::{Finding, Severity};

    #[test]
    fn test_summary_line() {
        let report = Report::aggregate(vec![
            Finding::new("a", "x.js", Severity::Error, "m"),
            Finding::new("b", "x.js", Severity::Info, "m"),
        ])
        .with_files_checked(4);
        assert_eq!(
            summary_line(&report),
            "playlint: 4 files checked, 1 errors, 0 warnings, 1 info"
        );
        assert!(summary_line(&report.mark_incomplete()).ends_with("(incomplete: run was cancelled)"));
    }
}
