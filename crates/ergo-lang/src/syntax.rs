//! Binding to the Python grammar that easyconfig files are written in.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::SyntaxError;

/// Node kinds of the Python grammar the engine relies on.
pub mod kind {
    pub const ASSIGNMENT: &str = "assignment";
    pub const AUGMENTED_ASSIGNMENT: &str = "augmented_assignment";
    pub const ATTRIBUTE: &str = "attribute";
    pub const BINARY_OPERATOR: &str = "binary_operator";
    pub const CALL: &str = "call";
    pub const COMMENT: &str = "comment";
    pub const CONCATENATED_STRING: &str = "concatenated_string";
    pub const DICTIONARY: &str = "dictionary";
    pub const FALSE: &str = "false";
    pub const FLOAT: &str = "float";
    pub const IDENTIFIER: &str = "identifier";
    pub const INTEGER: &str = "integer";
    pub const KEYWORD_ARGUMENT: &str = "keyword_argument";
    pub const LIST: &str = "list";
    pub const NONE: &str = "none";
    pub const PAIR: &str = "pair";
    pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
    pub const STRING: &str = "string";
    pub const TRUE: &str = "true";
    pub const TUPLE: &str = "tuple";
    pub const UNARY_OPERATOR: &str = "unary_operator";
}

pub fn language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// A parsed document. Nodes handed out borrow the tree and stay valid for
/// as long as the `SyntaxTree` lives.
pub struct SyntaxTree {
    source: String,
    tree: Tree,
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("len", &self.source.len())
            .field("root", &self.tree.root_node().kind())
            .finish()
    }
}

impl SyntaxTree {
    pub fn parse(source: impl Into<String>) -> Result<Self, SyntaxError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser.set_language(&language())?;
        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or(SyntaxError::NoTree)?;
        Ok(Self { source, tree })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

/// Named children of `node`, comments excluded.
pub fn operands<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != kind::COMMENT)
        .collect()
}
