use oxc_span::Span;
use std::cmp::Reverse;

/// A byte-range replacement in a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Edit {
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self { start: span.start as usize, end: span.end as usize, text: text.into() }
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Self { start, end, text: String::new() }
    }
}

/// Applies non-overlapping edits to `source`. An edit that overlaps one
/// already applied (or falls outside the text) is dropped.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    if edits.is_empty() {
        return source.to_string();
    }
    edits.sort_by_key(|e| (e.start, Reverse(e.end)));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.start < cursor
            || edit.end > source.len()
            || edit.start > edit.end
            || !source.is_char_boundary(edit.start)
            || !source.is_char_boundary(edit.end)
        {
            continue;
        }
        out.push_str(&source[cursor..edit.start]);
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replacements() {
        let src = "import a from './a';\nimport b from './b';\n";
        let edits = vec![
            Edit::replace(Span::new(36, 39), "./src_b"),
            Edit::replace(Span::new(15, 18), "./src_a"),
        ];
        assert_eq!(apply_edits(src, edits), "import a from './src_a';\nimport b from './src_b';\n");
    }

    #[test]
    fn test_overlapping_edits_are_dropped() {
        let src = "0123456789";
        let edits = vec![Edit::delete(2, 8), Edit::replace(Span::new(4, 6), "xx")];
        assert_eq!(apply_edits(src, edits), "0189");
    }

    #[test]
    fn test_no_edits_returns_source() {
        assert_eq!(apply_edits("let a = 1;", Vec::new()), "let a = 1;");
    }
}
