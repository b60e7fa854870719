use ergo_app::{AppSession, DIAGNOSTIC_SOURCE};
use ergo_lang::{Diagnostic as ErgoDiagnostic, Severity};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Url};

use crate::document::file_name_for;
use crate::position::LineIndex;

/// Runs the full analysis of one document. A document the engine cannot
/// parse at all yields no diagnostics.
pub fn analyze_document(session: &AppSession, uri: &Url, text: &str) -> Vec<Diagnostic> {
    let file_name = file_name_for(uri);
    let report = match session.analyze(text, &file_name) {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!(uri = %uri, error = %err, "analysis failed");
            return Vec::new();
        }
    };
    tracing::debug!(
        uri = %uri,
        diagnostics = report.diagnostics.len(),
        toolchains = ?report.toolchains,
        "analysis finished"
    );

    let index = LineIndex::new(text);
    report
        .diagnostics
        .iter()
        .map(|diag| to_lsp_diagnostic(&index, diag))
        .collect()
}

pub fn to_lsp_diagnostic(index: &LineIndex<'_>, diag: &ErgoDiagnostic) -> Diagnostic {
    Diagnostic {
        range: index.range(diag.range.span),
        severity: Some(match diag.severity {
            Severity::Information => DiagnosticSeverity::INFORMATION,
        }),
        code: Some(NumberOrString::String(diag.code.to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: diag.message.clone(),
        ..Diagnostic::default()
    }
}
