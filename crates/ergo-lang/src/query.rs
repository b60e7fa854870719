//! Declarative tree-pattern queries over the syntax tree.
//!
//! Patterns use the tree-sitter query language, so anchoring (`.`),
//! optional and repeated children (`?`, `*`, `+`), alternation (`[...]`)
//! and text predicates (`#match?`, `#not-match?`, `#eq?`) are all
//! available. Every pattern in [`Queries`] is compiled once per process.

use std::sync::OnceLock;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use crate::syntax::language;

pub const IDENTIFIERS: &str = "(identifier) @id";

pub const ATTRIBUTE_NAMES: &str = "(attribute attribute: (identifier) @attr)";

pub const KEYWORD_ARGUMENT_NAMES: &str = "(keyword_argument name: (identifier) @name)";

pub const ASSIGNMENTS: &str = r#"
[
  (assignment left: (identifier) @id)
  (augmented_assignment left: (identifier) @id)
] @assign
"#;

pub const DEPENDENCY_TUPLES: &str = r#"
(assignment
  left: (identifier) @list (#match? @list "^(build)?dependencies$")
  right: (list (tuple) @dep))
"#;

#[derive(Debug)]
pub struct StructuralQuery {
    query: Query,
}

/// Captures of a single pattern match, in capture order.
#[derive(Debug, Clone)]
pub struct QueryMatch<'q, 'tree> {
    names: &'q [&'q str],
    captures: Vec<(u32, Node<'tree>)>,
}

impl<'q, 'tree> QueryMatch<'q, 'tree> {
    pub fn get(&self, name: &str) -> Option<Node<'tree>> {
        self.all(name).next()
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Node<'tree>> + 'a {
        self.captures
            .iter()
            .filter(move |(index, _)| self.names.get(*index as usize) == Some(&name))
            .map(|(_, node)| *node)
    }
}

impl StructuralQuery {
    pub fn new(pattern: &str) -> Result<Self, String> {
        let query = Query::new(&language(), pattern)
            .map_err(|err| format!("invalid structural query: {err}"))?;
        Ok(Self { query })
    }

    pub fn matches<'q, 'tree>(&'q self, root: Node<'tree>, source: &[u8]) -> Vec<QueryMatch<'q, 'tree>> {
        let names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut out = Vec::new();
        let mut matches = cursor.matches(&self.query, root, source);
        while let Some(found) = matches.next() {
            out.push(QueryMatch {
                names,
                captures: found
                    .captures
                    .iter()
                    .map(|capture| (capture.index, capture.node))
                    .collect(),
            });
        }
        out
    }

    /// Every node bound to `name` across all matches, in document order.
    pub fn captures<'tree>(&self, root: Node<'tree>, source: &[u8], name: &str) -> Vec<Node<'tree>> {
        let mut nodes = self
            .matches(root, source)
            .iter()
            .flat_map(|found| found.all(name).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        nodes.sort_by_key(|node| (node.start_byte(), node.end_byte()));
        nodes.dedup();
        nodes
    }
}

#[derive(Debug)]
pub struct Queries {
    pub identifiers: StructuralQuery,
    pub attribute_names: StructuralQuery,
    pub keyword_argument_names: StructuralQuery,
    pub assignments: StructuralQuery,
    pub dependency_tuples: StructuralQuery,
}

impl Queries {
    fn compile() -> Result<Self, String> {
        Ok(Self {
            identifiers: StructuralQuery::new(IDENTIFIERS)?,
            attribute_names: StructuralQuery::new(ATTRIBUTE_NAMES)?,
            keyword_argument_names: StructuralQuery::new(KEYWORD_ARGUMENT_NAMES)?,
            assignments: StructuralQuery::new(ASSIGNMENTS)?,
            dependency_tuples: StructuralQuery::new(DEPENDENCY_TUPLES)?,
        })
    }
}

pub fn queries() -> Result<&'static Queries, String> {
    static QUERIES: OnceLock<Result<Queries, String>> = OnceLock::new();
    QUERIES.get_or_init(Queries::compile).as_ref().map_err(Clone::clone)
}
