pub mod analyze;
pub mod checks;
pub mod error;
pub mod extract;
pub mod knowledge;
pub mod query;
pub mod repository;
pub mod resolve;
pub mod span;
pub mod suggest;
pub mod syntax;
pub mod toolchain;
pub mod value;

pub use analyze::{AnalysisEnv, AnalysisReport, analyze_document};
pub use error::{Diagnostic, KnowledgeError, OracleError, Severity, SyntaxError};
pub use extract::{AssignmentMap, DependencyEntry, EasyConfigDocument, VariableIndex};
pub use knowledge::{KeywordOracle, KnowledgeBase, KnowledgeTable, ToolchainRegistry};
pub use repository::{ArtifactLocator, FsRepository};
pub use span::{LineCol, SourceRange, Span, TextPosition};
pub use syntax::SyntaxTree;
pub use toolchain::{HierarchyResolver, ToolchainRef};
pub use value::{ConfigDict, Literal, ResolvedValue};
