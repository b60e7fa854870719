//! Toolchain references and hierarchy expansion.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::extract::EasyConfigDocument;
use crate::knowledge::KnowledgeBase;
use crate::query::Queries;
use crate::repository::ArtifactLocator;
use crate::syntax::SyntaxTree;
use crate::value::{ConfigDict, Literal};

pub const SYSTEM: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolchainRef {
    pub name: String,
    pub version: String,
}

impl ToolchainRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM, SYSTEM)
    }

    pub fn is_system(&self) -> bool {
        self.name == SYSTEM
    }

    /// Accepts `{'name': .., 'version': ..}`, a `(name, version)` pair, and
    /// the legacy `True` system marker.
    pub fn from_literal(value: &Literal) -> Option<Self> {
        let toolchain = match value {
            Literal::Bool(true) => return Some(Self::system()),
            Literal::Dict(_) => Self::new(
                value.get("name")?.as_str()?,
                value.get("version")?.as_str()?,
            ),
            Literal::Tuple(items) | Literal::List(items) => match items.as_slice() {
                [name, version] => Self::new(name.as_str()?, version.as_str()?),
                _ => return None,
            },
            _ => return None,
        };
        if toolchain.is_system() {
            Some(Self::system())
        } else {
            Some(toolchain)
        }
    }
}

impl fmt::Display for ToolchainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// Breadth-first expansion of a toolchain into the composite toolchains it
/// implies, reading toolchain definitions through an [`ArtifactLocator`].
pub struct HierarchyResolver<'a> {
    knowledge: &'a KnowledgeBase,
    locator: &'a dyn ArtifactLocator,
    queries: &'a Queries,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, locator: &'a dyn ArtifactLocator, queries: &'a Queries) -> Self {
        Self {
            knowledge,
            locator,
            queries,
        }
    }

    pub fn expand(&self, root: ToolchainRef) -> Vec<ToolchainRef> {
        let registry = self.knowledge.toolchains();
        let mut result = vec![root.clone()];
        let mut queued = HashSet::from([root.clone()]);
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            if current.is_system() {
                continue;
            }
            for found in self.composite_dependencies(&current) {
                if queued.insert(found.clone()) {
                    result.push(found.clone());
                    queue.push_back(found);
                }
            }
            for sub in registry.subtoolchains(&current.name) {
                result.push(ToolchainRef::new(sub.as_str(), current.version.as_str()));
            }
        }

        tracing::debug!(
            hierarchy = %result.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            "expanded toolchain hierarchy"
        );
        result
    }

    /// Two-element dependencies of the toolchain's own definition that name a
    /// composite toolchain.
    fn composite_dependencies(&self, toolchain: &ToolchainRef) -> Vec<ToolchainRef> {
        let Some(source) = self.locator.toolchain_config(toolchain) else {
            return Vec::new();
        };
        let tree = match SyntaxTree::parse(source) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::warn!(%toolchain, %err, "failed to parse toolchain definition");
                return Vec::new();
            }
        };
        let hints = ConfigDict::new();
        let document = EasyConfigDocument::new(&tree, self.queries, self.knowledge.constants(), &hints);
        let registry = self.knowledge.toolchains();

        document
            .dependency_entries()
            .iter()
            .zip(document.dependency_values())
            .filter(|(entry, _)| entry.arity() == 2)
            .filter_map(|(_, values)| {
                let name = values[0].as_str()?;
                let version = values[1].as_str()?;
                registry
                    .is_composite(name)
                    .then(|| ToolchainRef::new(name, version))
            })
            .collect()
    }
}
