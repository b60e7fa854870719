use crate::error::{Diagnostic, FILENAME_MISMATCH};
use crate::extract::EasyConfigDocument;
use crate::span::SourceRange;
use crate::toolchain::ToolchainRef;
use crate::value::Literal;

/// Verify that `file_name` (`<name>-<version>[-<tc>-<tcversion>]<suffix>.eb`)
/// agrees with the resolved `name`, `version`, `toolchain` and
/// `versionsuffix`.
pub fn check_filename(
    document: &EasyConfigDocument<'_>,
    file_name: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(stem) = file_name.strip_suffix(".eb") else {
        return;
    };
    let config = document.config_dict();
    let versionsuffix = config
        .get("versionsuffix")
        .and_then(Literal::as_str)
        .unwrap_or("");
    let mut mismatched = Vec::new();

    match config.get("name").and_then(Literal::as_str) {
        Some(name) if !stem.starts_with(&format!("{name}-")) => mismatched.push("name"),
        Some(_) => {}
        None => tracing::warn!("`name` is unresolved, its location for the filename check is unknown"),
    }

    match config.get("version").and_then(Literal::as_str) {
        Some(version) if !has_segment(stem, &format!("-{version}"), versionsuffix) => {
            mismatched.push("version")
        }
        Some(_) => {}
        None => tracing::warn!("`version` is unresolved, its location for the filename check is unknown"),
    }

    match config.get("toolchain").and_then(ToolchainRef::from_literal) {
        Some(toolchain)
            if !toolchain.is_system()
                && !has_segment(
                    stem,
                    &format!("-{}-{}", toolchain.name, toolchain.version),
                    versionsuffix,
                ) =>
        {
            mismatched.push("toolchain")
        }
        Some(_) => {}
        None => tracing::warn!("`toolchain` is unresolved, its location for the filename check is unknown"),
    }

    if !versionsuffix.is_empty() && !stem.ends_with(versionsuffix) {
        mismatched.push("versionsuffix");
    }

    for variable in mismatched {
        match document.last_assignment(variable) {
            Some(node) => diagnostics.push(Diagnostic::info(
                FILENAME_MISMATCH,
                "Does not match filename",
                SourceRange::of(node),
            )),
            None => tracing::warn!(variable, "no assignment to anchor the filename mismatch on"),
        }
    }
}

/// `segment` occurs in `stem` followed by the end, a `-`, or the suffix.
fn has_segment(stem: &str, segment: &str, versionsuffix: &str) -> bool {
    stem.match_indices(segment).any(|(index, _)| {
        let rest = &stem[index + segment.len()..];
        rest.is_empty()
            || rest.starts_with('-')
            || (!versionsuffix.is_empty() && rest.starts_with(versionsuffix))
    })
}
