use crate::checks::{check_dependencies, check_filename, check_keywords};
use crate::error::{Diagnostic, SyntaxError};
use crate::extract::EasyConfigDocument;
use crate::knowledge::{KeywordOracle, KnowledgeBase};
use crate::query::queries;
use crate::repository::ArtifactLocator;
use crate::syntax::SyntaxTree;
use crate::toolchain::{HierarchyResolver, ToolchainRef};
use crate::value::{ConfigDict, Literal};

/// Read-only collaborators of one analysis.
pub struct AnalysisEnv<'a> {
    pub knowledge: &'a KnowledgeBase,
    pub oracle: &'a dyn KeywordOracle,
    pub locator: &'a dyn ArtifactLocator,
    /// Parameters known up front; they take precedence over the document.
    pub hints: ConfigDict,
}

impl<'a> AnalysisEnv<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, locator: &'a dyn ArtifactLocator) -> Self {
        Self {
            knowledge,
            oracle: knowledge,
            locator,
            hints: ConfigDict::new(),
        }
    }

    pub fn with_oracle(mut self, oracle: &'a dyn KeywordOracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_hints(mut self, hints: ConfigDict) -> Self {
        self.hints = hints;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub diagnostics: Vec<Diagnostic>,
    pub config: ConfigDict,
    /// Expanded hierarchy of the document's toolchain, empty when unresolved.
    pub toolchains: Vec<ToolchainRef>,
}

/// Run the keyword, dependency and filename checks over `text`.
///
/// `file_name` may be a bare name or a path; only its last component is
/// compared, and only when it ends in `.eb`.
pub fn analyze_document(
    text: &str,
    file_name: &str,
    env: &AnalysisEnv<'_>,
) -> Result<AnalysisReport, SyntaxError> {
    let queries = queries().map_err(SyntaxError::Query)?;
    let tree = SyntaxTree::parse(text)?;
    let document = EasyConfigDocument::new(&tree, queries, env.knowledge.constants(), &env.hints);
    let config = document.config_dict();
    tracing::debug!(
        variables = document.variables().nodes.len(),
        assignments = document.assignments().len(),
        dependencies = document.dependency_entries().len(),
        resolved = config.len(),
        "extracted document"
    );

    let easyblock = config.get("easyblock").and_then(Literal::as_str);
    let name = config.get("name").and_then(Literal::as_str);
    let extra_options = env
        .oracle
        .extra_options(easyblock, name)
        .unwrap_or_else(|err| {
            tracing::debug!(%err, "no extra options for this document");
            Vec::new()
        });

    let mut diagnostics = Vec::new();
    check_keywords(&document, env.knowledge, &extra_options, &mut diagnostics);

    let toolchains = config
        .get("toolchain")
        .and_then(ToolchainRef::from_literal)
        .map(|root| HierarchyResolver::new(env.knowledge, env.locator, queries).expand(root));
    check_dependencies(&document, env.locator, toolchains.as_deref(), &mut diagnostics);

    let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    if base_name.ends_with(".eb") {
        check_filename(&document, base_name, &mut diagnostics);
    }

    Ok(AnalysisReport {
        diagnostics,
        config: config.clone(),
        toolchains: toolchains.unwrap_or_default(),
    })
}
