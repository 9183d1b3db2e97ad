use crate::error::CliError;
use engine_config::report::summary::SummaryReport;
use std::path::Path;

/// Prints the report to stdout, or writes it to `path` when one is given.
pub async fn emit_report(report: &SummaryReport, path: Option<&Path>) -> Result<(), CliError> {
    let json = report.to_json()?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}
