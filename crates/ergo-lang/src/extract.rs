//! Per-document semantic extraction.
//!
//! [`EasyConfigDocument`] wraps one parse and computes each derived view on
//! first access, caching it for the lifetime of the document.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use tree_sitter::Node;

use crate::query::Queries;
use crate::resolve::{Constants, Resolver};
use crate::syntax::{SyntaxTree, kind, operands};
use crate::value::{ConfigDict, ResolvedValue};

/// Variable name to its assignment nodes, in document order.
pub type AssignmentMap<'a> = BTreeMap<String, Vec<Node<'a>>>;

#[derive(Debug, Clone, Default)]
pub struct VariableIndex<'a> {
    pub nodes: Vec<Node<'a>>,
    /// Field names of attribute accesses (`x.<field>`), kept out of `nodes`.
    pub attribute_names: BTreeSet<String>,
}

/// A tuple literal directly inside `dependencies` or `builddependencies`.
#[derive(Debug, Clone)]
pub struct DependencyEntry<'a> {
    pub list: &'a str,
    pub node: Node<'a>,
    pub values: Vec<Node<'a>>,
}

impl<'a> DependencyEntry<'a> {
    pub fn arity(&self) -> usize {
        self.values.len()
    }
}

pub struct EasyConfigDocument<'a> {
    tree: &'a SyntaxTree,
    queries: &'a Queries,
    constants: &'a Constants,
    hints: &'a ConfigDict,
    variables: OnceCell<VariableIndex<'a>>,
    assignments: OnceCell<AssignmentMap<'a>>,
    dependency_entries: OnceCell<Vec<DependencyEntry<'a>>>,
    non_local_variables: OnceCell<Vec<Node<'a>>>,
    config_dict: OnceCell<ConfigDict>,
    dependency_values: OnceCell<Vec<Vec<ResolvedValue>>>,
}

impl std::fmt::Debug for EasyConfigDocument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EasyConfigDocument")
            .field("tree", self.tree)
            .field("hints", self.hints)
            .finish_non_exhaustive()
    }
}

impl<'a> EasyConfigDocument<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        queries: &'a Queries,
        constants: &'a Constants,
        hints: &'a ConfigDict,
    ) -> Self {
        Self {
            tree,
            queries,
            constants,
            hints,
            variables: OnceCell::new(),
            assignments: OnceCell::new(),
            dependency_entries: OnceCell::new(),
            non_local_variables: OnceCell::new(),
            config_dict: OnceCell::new(),
            dependency_values: OnceCell::new(),
        }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn text(&self, node: Node<'_>) -> &'a str {
        self.tree.text(node)
    }

    pub fn variables(&self) -> &VariableIndex<'a> {
        self.variables.get_or_init(|| self.collect_variables())
    }

    pub fn assignments(&self) -> &AssignmentMap<'a> {
        self.assignments.get_or_init(|| self.collect_assignments())
    }

    pub fn dependency_entries(&self) -> &[DependencyEntry<'a>] {
        self.dependency_entries
            .get_or_init(|| self.collect_dependency_entries())
    }

    /// Variables that are expected to be configuration keys: scratch names
    /// (`_x`, `local_x`, single characters) are left out.
    pub fn non_local_variables(&self) -> &[Node<'a>] {
        self.non_local_variables.get_or_init(|| {
            self.variables()
                .nodes
                .iter()
                .copied()
                .filter(|node| is_config_key(self.text(*node)))
                .collect()
        })
    }

    pub fn config_dict(&self) -> &ConfigDict {
        self.config_dict.get_or_init(|| self.resolve_config_dict())
    }

    /// Resolved positional values of each entry of [`Self::dependency_entries`].
    pub fn dependency_values(&self) -> &[Vec<ResolvedValue>] {
        self.dependency_values.get_or_init(|| {
            let resolver = self.resolver();
            let env = self.config_dict();
            self.dependency_entries()
                .iter()
                .map(|entry| {
                    entry
                        .values
                        .iter()
                        .map(|value| resolver.resolve(*value, env))
                        .collect()
                })
                .collect()
        })
    }

    /// The effective (last) assignment of `name`.
    pub fn last_assignment(&self, name: &str) -> Option<Node<'a>> {
        self.assignments()
            .get(name)
            .and_then(|nodes| nodes.last())
            .copied()
    }

    /// Resolve an arbitrary node against the document's [`Self::config_dict`].
    pub fn resolve(&self, node: Node<'_>) -> ResolvedValue {
        self.resolver().resolve(node, self.config_dict())
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(
            self.tree,
            self.constants,
            self.assignments(),
            &self.queries.identifiers,
        )
    }

    fn collect_variables(&self) -> VariableIndex<'a> {
        let root = self.tree.root();
        let source = self.tree.source().as_bytes();
        let attributes = self.queries.attribute_names.captures(root, source, "attr");
        let keywords = self
            .queries
            .keyword_argument_names
            .captures(root, source, "name");
        let excluded = attributes
            .iter()
            .chain(keywords.iter())
            .map(|node| node.id())
            .collect::<BTreeSet<_>>();

        VariableIndex {
            nodes: self
                .queries
                .identifiers
                .captures(root, source, "id")
                .into_iter()
                .filter(|node| !excluded.contains(&node.id()))
                .collect(),
            attribute_names: attributes
                .iter()
                .map(|node| self.text(*node).to_string())
                .collect(),
        }
    }

    fn collect_assignments(&self) -> AssignmentMap<'a> {
        let mut found = self
            .queries
            .assignments
            .matches(self.tree.root(), self.tree.source().as_bytes())
            .iter()
            .filter_map(|item| Some((item.get("id")?, item.get("assign")?)))
            .collect::<Vec<_>>();
        found.sort_by_key(|(_, assign)| assign.start_byte());

        let mut map = AssignmentMap::new();
        for (id, assign) in found {
            map.entry(self.text(id).to_string())
                .or_insert_with(Vec::new)
                .push(assign);
        }
        map
    }

    fn collect_dependency_entries(&self) -> Vec<DependencyEntry<'a>> {
        let mut entries = self
            .queries
            .dependency_tuples
            .matches(self.tree.root(), self.tree.source().as_bytes())
            .iter()
            .filter_map(|item| {
                let list = item.get("list")?;
                let node = item.get("dep")?;
                Some(DependencyEntry {
                    list: self.text(list),
                    node,
                    values: operands(node),
                })
            })
            .collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.node.start_byte());
        entries.dedup_by_key(|entry| entry.node.id());
        entries
    }

    /// Hints first, then every singly assigned variable in document order,
    /// each resolved against what is known so far.
    fn resolve_config_dict(&self) -> ConfigDict {
        let mut dict = self.hints.clone();
        let assignments = self.assignments();
        let resolver = self.resolver();

        let mut ordered = assignments
            .iter()
            .filter_map(|(name, nodes)| match nodes.as_slice() {
                [single] => Some((name, *single)),
                _ => None,
            })
            .collect::<Vec<_>>();
        ordered.sort_by_key(|(_, node)| node.start_byte());

        for (name, node) in ordered {
            if dict.contains_key(name) || node.kind() != kind::ASSIGNMENT {
                continue;
            }
            let Some(right) = node.child_by_field_name("right") else {
                continue;
            };
            if let ResolvedValue::Known(value) = resolver.resolve(right, &dict) {
                dict.insert(name.clone(), value);
            }
        }
        dict
    }
}

fn is_config_key(name: &str) -> bool {
    name.chars().count() > 1 && !name.starts_with('_') && !name.starts_with("local_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::queries;
    use crate::value::Literal;

    fn with_document<R>(source: &str, check: impl FnOnce(&EasyConfigDocument<'_>) -> R) -> R {
        let tree = SyntaxTree::parse(source).expect("parse");
        let constants = Constants::new();
        let hints = ConfigDict::new();
        let document = EasyConfigDocument::new(&tree, queries().expect("queries"), &constants, &hints);
        check(&document)
    }

    #[test]
    fn attribute_fields_and_keyword_names_are_not_variables() {
        with_document("x = os.path\ny = dict(key=1)\n", |document| {
            let names = document
                .variables()
                .nodes
                .iter()
                .map(|node| document.text(*node))
                .collect::<Vec<_>>();
            assert_eq!(names, vec!["x", "os", "y", "dict"]);
            assert!(document.variables().attribute_names.contains("path"));
        });
    }

    #[test]
    fn scratch_names_are_not_config_keys() {
        assert!(is_config_key("homepage"));
        assert!(!is_config_key("_tmp"));
        assert!(!is_config_key("local_libs"));
        assert!(!is_config_key("i"));
    }

    #[test]
    fn reassigned_variables_are_left_unresolved() {
        with_document("a = '1'\na = '2'\nb = 'x'\nc = b + a\n", |document| {
            let dict = document.config_dict();
            assert_eq!(dict.get("b"), Some(&Literal::str("x")));
            assert!(!dict.contains_key("a"));
            assert!(!dict.contains_key("c"));
            assert_eq!(document.assignments()["a"].len(), 2);
            let last = document.last_assignment("a").expect("last");
            assert_eq!(document.text(last), "a = '2'");
        });
    }
}
