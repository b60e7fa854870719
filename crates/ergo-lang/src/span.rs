use tree_sitter::{Node, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn of(node: Node<'_>) -> Self {
        Self::new(node.start_byte(), node.end_byte())
    }
}

/// One-based line and column, for human readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl LineCol {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Zero-based line and byte column, as reported by the syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct TextPosition {
    pub line: usize,
    pub character: usize,
}

impl TextPosition {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }

    pub fn to_line_col(self) -> LineCol {
        LineCol::new(self.line + 1, self.character + 1)
    }
}

impl From<Point> for TextPosition {
    fn from(point: Point) -> Self {
        Self::new(point.row, point.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRange {
    pub span: Span,
    pub start: TextPosition,
    pub end: TextPosition,
}

impl SourceRange {
    pub fn of(node: Node<'_>) -> Self {
        Self {
            span: Span::of(node),
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }
}
