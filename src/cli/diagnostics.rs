use std::path::Path;

use ergo_lang::{Diagnostic, Severity};

use crate::cli::args::OutputFormat;

/// Diagnostics of one checked file.
pub(crate) struct FileDiagnostics<'a> {
    pub(crate) path: &'a Path,
    pub(crate) diagnostics: &'a [Diagnostic],
}

pub(crate) fn print_diagnostics(files: &[FileDiagnostics<'_>], format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            for file in files {
                for diag in file.diagnostics {
                    let level = match diag.severity {
                        Severity::Information => "information",
                    };
                    let at = diag.range.start.to_line_col();
                    println!(
                        "{} {} [{}:{}:{}]: {}",
                        level,
                        diag.code,
                        file.path.display(),
                        at.line,
                        at.column,
                        diag.message
                    );
                }
            }
        }
        OutputFormat::Json => {
            let payload = files
                .iter()
                .flat_map(|file| {
                    file.diagnostics.iter().map(|diag| {
                        let mut value = ergo_app::diagnostic_to_json(diag);
                        if let Some(object) = value.as_object_mut() {
                            object.insert(
                                "path".to_string(),
                                serde_json::json!(file.path.display().to_string()),
                            );
                        }
                        value
                    })
                })
                .collect::<Vec<_>>();
            if let Ok(text) = serde_json::to_string_pretty(&payload) {
                println!("{}", text);
            }
        }
    }
}
