//! JSON output formatter

use miette::{IntoDiagnostic, Result};
use playlint_core::Report;

pub fn output_json(report: &Report) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report).into_diagnostic()?);
    Ok(())
}
