use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::formatters::{format_report_json, format_report_table, format_success, format_warning};
use super::{Cli, Commands};
use taxa::config::Config;
use taxa::reports::export_report;
use taxa::{FeeError, FeeSession};

/// Run a parsed command line
pub fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Compute {
            control,
            pl_files,
            output,
            no_export,
            year,
        } => {
            let year = config.processing_year(year)?;
            let output = (!no_export)
                .then(|| output.unwrap_or_else(|| config.export.file_name.clone()));
            run_compute(&control, &pl_files, output.as_deref(), year, cli.json)
        }
    }
}

/// Load the control spreadsheet and PL files, then show and export the report.
///
/// Per-file problems are printed as warnings to stderr and do not stop the
/// run; missing inputs do.
pub fn run_compute(
    control: &Path,
    pl_files: &[PathBuf],
    output: Option<&Path>,
    year: i32,
    json_output: bool,
) -> Result<()> {
    info!("Computing fees for {} PL files (year {})", pl_files.len(), year);
    let mut session = FeeSession::new(year);

    match fs::read(control) {
        Ok(bytes) => {
            if let Some(count) = session.load_reference(&bytes) {
                status(
                    json_output,
                    &format_success(&format!("Control spreadsheet loaded ({} accounts)", count)),
                );
            }
        }
        Err(e) => session.record_warning(FeeError::ReferenceLoad(format!(
            "{}: {}",
            control.display(),
            e
        ))),
    }
    flush_warnings(&mut session);

    for path in pl_files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                session.record_warning(FeeError::SnapshotLoad {
                    file_name,
                    reason: e.to_string(),
                });
                flush_warnings(&mut session);
                continue;
            }
        };

        if let Some(date) = session.load_snapshot(&bytes, &file_name) {
            status(
                json_output,
                &format_success(&format!("PL '{}' loaded ({})", file_name, date.format("%d/%m/%Y"))),
            );
        }
        flush_warnings(&mut session);
    }

    let report = session.compute()?;

    if json_output {
        println!("{}", format_report_json(&report));
    } else {
        println!("{}", format_report_table(&report));
    }

    if let Some(path) = output {
        let buffer = export_report(&report)?;
        fs::write(path, buffer)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        status(
            json_output,
            &format_success(&format!("Report exported to {}", path.display())),
        );
    }

    Ok(())
}

fn flush_warnings(session: &mut FeeSession) {
    for warning in session.take_warnings() {
        eprintln!("{}", format_warning(&warning));
    }
}

// Progress lines go to stderr in JSON mode to keep stdout parseable
fn status(json_output: bool, line: &str) {
    if json_output {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}
