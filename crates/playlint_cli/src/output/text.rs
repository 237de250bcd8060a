//! Text output formatter

use playlint_core::{Finding, Report};

pub fn output_text(report: &Report) {
    for finding in &report.findings {
        println!("{}", format_finding(finding));
    }

    println!();
    println!(
        "Checked {} files, found {} findings",
        report.files_checked,
        report.findings.len()
    );
}

fn format_finding(finding: &Finding) -> String {
    let location = match (finding.line, finding.column) {
        (Some(line), Some(column)) => format!("{}:{}:{}", finding.path, line, column),
        (Some(line), None) => format!("{}:{}", finding.path, line),
        _ => finding.path.clone(),
    };
    format!(
        "{} {} [{}]: {}",
        location, finding.severity, finding.rule_id, finding.message
    )
}
