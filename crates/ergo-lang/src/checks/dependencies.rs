use crate::error::{
    DEPENDENCY_ARITY, DEPENDENCY_INCOMPATIBLE, DEPENDENCY_NAME, DEPENDENCY_VERSION, Diagnostic,
};
use crate::extract::EasyConfigDocument;
use crate::repository::ArtifactLocator;
use crate::span::SourceRange;
use crate::suggest::close_matches_icase;
use crate::toolchain::ToolchainRef;
use crate::value::ResolvedValue;

const MIN_ARITY: usize = 2;
const MAX_ARITY: usize = 4;

/// Cross-check every dependency entry against the repository.
///
/// `default_toolchains` is the document's toolchain hierarchy; entries
/// without a toolchain of their own are skipped when it is `None`.
pub fn check_dependencies(
    document: &EasyConfigDocument<'_>,
    locator: &dyn ArtifactLocator,
    default_toolchains: Option<&[ToolchainRef]>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let entries = document.dependency_entries();
    for (entry, values) in entries.iter().zip(document.dependency_values()) {
        if !(MIN_ARITY..=MAX_ARITY).contains(&entry.arity()) {
            diagnostics.push(Diagnostic::info(
                DEPENDENCY_ARITY,
                "Must have 2-4 elements exactly",
                SourceRange::of(entry.node),
            ));
            continue;
        }

        let (Some(name), Some(version)) = (values[0].as_str(), values[1].as_str()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let versionsuffix = values.get(2).and_then(ResolvedValue::as_str).unwrap_or("");

        let toolchains = match values.get(3) {
            Some(ResolvedValue::Known(value)) => match ToolchainRef::from_literal(value) {
                Some(toolchain) => vec![toolchain],
                None => continue,
            },
            Some(ResolvedValue::Unknown) => continue,
            None => match default_toolchains {
                Some(toolchains) => toolchains.to_vec(),
                None => continue,
            },
        };

        let name_node = entry.values[0];
        let version_node = entry.values[1];
        let matches = locator.find_config_files(name, versionsuffix, &toolchains);
        tracing::debug!(name, version, versionsuffix, found = matches.len(), "dependency lookup");

        if !matches.is_empty() {
            if !matches.iter().any(|file| file_has_version(file, name, version)) {
                diagnostics.push(Diagnostic::info(
                    DEPENDENCY_VERSION,
                    format!("Try {}", matches.join(",")),
                    SourceRange::of(version_node),
                ));
            }
        } else if locator.name_exists(name) {
            diagnostics.push(Diagnostic::info(
                DEPENDENCY_INCOMPATIBLE,
                "No compatible version exist",
                SourceRange::of(version_node),
            ));
        } else {
            let known = locator.suggest_names(name);
            let suggestions = close_matches_icase(name, known.iter().map(String::as_str));
            let message = if suggestions.is_empty() {
                "Name not recognized".to_string()
            } else {
                format!("Did you mean {}", suggestions.join(","))
            };
            diagnostics.push(Diagnostic::info(
                DEPENDENCY_NAME,
                message,
                SourceRange::of(name_node),
            ));
        }
    }
}

/// Whether `file` is a configuration of `name` at exactly `version`.
pub fn file_has_version(file: &str, name: &str, version: &str) -> bool {
    file.strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_prefix(version))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('-') || rest.starts_with(".eb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_must_sit_on_a_boundary() {
        assert!(file_has_version("zlib-1.2.13-GCCcore-12.3.0.eb", "zlib", "1.2.13"));
        assert!(file_has_version("zlib-1.2.13.eb", "zlib", "1.2.13"));
        assert!(!file_has_version("zlib-1.2.13-GCCcore-12.3.0.eb", "zlib", "1.2.1"));
        assert!(!file_has_version("zlib-1.2.11-GCC-12.3.0.eb", "zlib", "1.2.13"));
        assert!(!file_has_version("zlibx-1.2.13.eb", "zlib", "1.2.13"));
    }
}
