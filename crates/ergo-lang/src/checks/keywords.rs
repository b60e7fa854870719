use crate::error::{Diagnostic, UNKNOWN_VARIABLE};
use crate::extract::EasyConfigDocument;
use crate::knowledge::KnowledgeBase;
use crate::span::SourceRange;
use crate::suggest::close_matches_icase;

/// Flag configuration keys that are neither parameters, constants nor
/// extra options of the component's easyblock.
pub fn check_keywords(
    document: &EasyConfigDocument<'_>,
    knowledge: &KnowledgeBase,
    extra_options: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let known = knowledge.known_identifiers(extra_options);
    for node in document.non_local_variables() {
        let identifier = document.text(*node);
        if known.contains(identifier) || knowledge.is_builtin(identifier) {
            continue;
        }
        let matches = close_matches_icase(identifier, known.iter().map(String::as_str));
        let message = if matches.is_empty() {
            "Unknown variable".to_string()
        } else {
            format!("Did you mean: {}", matches.join(","))
        };
        diagnostics.push(Diagnostic::info(UNKNOWN_VARIABLE, message, SourceRange::of(*node)));
    }
}
