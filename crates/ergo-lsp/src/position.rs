use ergo_lang::Span;
use tower_lsp::lsp_types::{Position, Range};

/// Byte offsets of every line start in a document, so a batch of
/// diagnostics shares one scan of the text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts = vec![0usize];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        );
        Self { text, starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let mut clamped = offset.min(self.text.len());
        while !self.text.is_char_boundary(clamped) {
            clamped -= 1;
        }
        let line = self
            .starts
            .partition_point(|start| *start <= clamped)
            .saturating_sub(1);
        let line_start = self.starts[line];

        let utf16_col = self.text[line_start..clamped]
            .chars()
            .map(|ch| ch.len_utf16() as u32)
            .sum::<u32>();

        Position::new(line as u32, utf16_col)
    }

    pub fn range(&self, span: Span) -> Range {
        Range {
            start: self.position(span.start),
            end: self.position(span.end.max(span.start)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_handles_ascii() {
        let text = "name = 'zlib'\nversion = '1.2.11'\n";
        let index = LineIndex::new(text);
        assert_eq!(index.position(0), Position::new(0, 0));
        assert_eq!(index.position(7), Position::new(0, 7));
        assert_eq!(index.position(14), Position::new(1, 0));
        assert_eq!(index.position(text.len()), Position::new(2, 0));
    }

    #[test]
    fn position_counts_utf16_units() {
        let text = "description = '中🙂'\nhomepge = 1\n";
        let index = LineIndex::new(text);
        let line_two = text.find("homepge").expect("second line");
        assert_eq!(index.position("description = '中".len()), Position::new(0, 16));
        assert_eq!(index.position("description = '中🙂".len()), Position::new(0, 18));
        assert_eq!(index.position(line_two), Position::new(1, 0));
    }

    #[test]
    fn offset_inside_a_character_snaps_back() {
        let text = "x = '中'";
        let inside = "x = '".len() + 1;
        assert_eq!(LineIndex::new(text).position(inside), Position::new(0, 5));
    }

    #[test]
    fn range_handles_multiline_tuples() {
        let text = "dependencies = [\n    ('zlib', '1.2.11',\n     '', SYSTEM),\n]\n";
        let start = text.find('(').expect("tuple start");
        let end = text.find(')').expect("tuple end") + 1;
        let range = LineIndex::new(text).range(Span::new(start, end));
        assert_eq!(range.start, Position::new(1, 4));
        assert_eq!(range.end, Position::new(2, 16));
    }

    #[test]
    fn range_clamps_to_text() {
        let range = LineIndex::new("abc").range(Span::new(0, 100));
        assert_eq!(range.start, Position::new(0, 0));
        assert_eq!(range.end, Position::new(0, 3));
    }
}
