//! SARIF output formatter

use miette::{IntoDiagnostic, Result};
use playlint_core::Report;

pub fn output_sarif(report: &Report) -> Result<()> {
    let sarif_output = playlint_core::generate_sarif(report).into_diagnostic()?;
    println!("{}", sarif_output);
    Ok(())
}
