use std::path::PathBuf;

use ergo_app::AppSession;

use crate::cli::args::OutputFormat;
use crate::cli::diagnostics::FileDiagnostics;
use crate::cli::print_diagnostics;

pub(crate) fn execute(
    session: &AppSession,
    files: &[PathBuf],
    format: OutputFormat,
) -> Result<(), String> {
    let reports = files
        .iter()
        .map(|path| session.check_file(path).map(|report| (path, report)))
        .collect::<Result<Vec<_>, String>>()?;

    let per_file = reports
        .iter()
        .map(|(path, report)| FileDiagnostics {
            path: path.as_path(),
            diagnostics: &report.diagnostics,
        })
        .collect::<Vec<_>>();
    print_diagnostics(&per_file, format);

    if reports.iter().any(|(_, report)| !report.diagnostics.is_empty()) {
        return Err("check failed with diagnostics".to_string());
    }
    Ok(())
}
