use thiserror::Error;

use crate::span::SourceRange;

pub const UNKNOWN_VARIABLE: &str = "W_UNKNOWN_VARIABLE";
pub const DEPENDENCY_ARITY: &str = "W_DEPENDENCY_ARITY";
pub const DEPENDENCY_VERSION: &str = "W_DEPENDENCY_VERSION";
pub const DEPENDENCY_INCOMPATIBLE: &str = "W_DEPENDENCY_INCOMPATIBLE";
pub const DEPENDENCY_NAME: &str = "W_DEPENDENCY_NAME";
pub const FILENAME_MISMATCH: &str = "W_FILENAME_MISMATCH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub range: SourceRange,
}

impl Diagnostic {
    pub fn info(code: &'static str, message: impl Into<String>, range: SourceRange) -> Self {
        Self {
            severity: Severity::Information,
            code,
            message: message.into(),
            range,
        }
    }
}

#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("failed to load the python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser returned no tree")]
    NoTree,
    #[error("{0}")]
    Query(String),
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse knowledge table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("constant `{name}` has a value that is not a plain literal")]
    Constant { name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("no easyblock or software name to look up")]
    NoCandidate,
    #[error("unknown easyblock `{0}`")]
    UnknownEasyblock(String),
}
