//! Pattern descriptor for location-code formats.

use serde::{Deserialize, Serialize};

/// Kind of characters a segment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// A run of ASCII digits.
    Digits,
    /// A run of ASCII letters.
    Letters,
    /// A literal separator, e.g. `-` or `_`.
    Literal,
}

/// One positional segment of a location-code pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Character class of the segment.
    pub kind: SegmentKind,
    /// Segment length. For variable-width segments this is the longest
    /// length seen among the source examples.
    pub length: usize,
    /// Whether every source example agreed on the length.
    pub fixed_width: bool,
    /// The literal text, for `Literal` segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

impl Segment {
    /// A digit segment of the given width.
    pub fn digits(length: usize, fixed_width: bool) -> Self {
        Self {
            kind: SegmentKind::Digits,
            length,
            fixed_width,
            literal: None,
        }
    }

    /// A letter segment of the given width.
    pub fn letters(length: usize, fixed_width: bool) -> Self {
        Self {
            kind: SegmentKind::Letters,
            length,
            fixed_width,
            literal: None,
        }
    }

    /// A literal separator segment.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: SegmentKind::Literal,
            length: text.chars().count(),
            fixed_width: true,
            literal: Some(text),
        }
    }

    /// Whether this segment carries a value (as opposed to a separator).
    pub fn is_value(&self) -> bool {
        self.kind != SegmentKind::Literal
    }
}

/// Broad classification of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// A position number followed by a level letter, e.g. `042B`.
    PositionLevel,
    /// Full aisle-rack-position-level addressing, e.g. `01-02-003-A`.
    AisleRackPositionLevel,
    /// Any other alphanumeric shape; validated structurally only.
    AlphanumericFree,
}

impl PatternType {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PatternType::PositionLevel => "position+level",
            PatternType::AisleRackPositionLevel => "aisle-rack-position-level",
            PatternType::AlphanumericFree => "alphanumeric",
        }
    }
}

/// A learned location-code grammar with a confidence score.
///
/// Owned by a [`WarehouseGrammar`](crate::grammar::WarehouseGrammar);
/// derived and replaceable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatPattern {
    /// Broad pattern classification.
    pub pattern_type: PatternType,
    /// Ordered segments.
    pub segments: Vec<Segment>,
    /// Confidence in the pattern, 0.0 to 1.0.
    pub confidence: f64,
    /// The examples the pattern was learned from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_examples: Vec<String>,
}

impl FormatPattern {
    /// The lowest-confidence generic pattern, returned when detection has
    /// nothing to work with. Matches any non-empty alphanumeric code.
    pub fn generic(source_examples: Vec<String>) -> Self {
        Self {
            pattern_type: PatternType::AlphanumericFree,
            segments: Vec::new(),
            confidence: 0.0,
            source_examples,
        }
    }

    /// Segments that carry values, in order.
    pub fn value_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_value())
    }

    /// Check a code against the pattern, consuming segment by segment.
    ///
    /// Segments are maximal runs by construction, so a variable-width
    /// segment can greedily consume its whole run: the next segment is
    /// always of a different character class. O(code length).
    pub fn matches(&self, code: &str) -> bool {
        self.capture(code).is_some()
    }

    /// Walk the code against the pattern and return the text of each value
    /// segment, or `None` when the code does not fit.
    pub fn capture(&self, code: &str) -> Option<Vec<String>> {
        if self.segments.is_empty() {
            // Generic pattern: accept any non-empty alphanumeric-ish code.
            let trimmed = code.trim();
            if !trimmed.is_empty()
                && trimmed
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Some(vec![trimmed.to_string()]);
            }
            return None;
        }

        let mut rest = code.trim();
        let mut values = Vec::new();

        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Literal => {
                    let literal = segment.literal.as_deref()?;
                    rest = rest.strip_prefix(literal)?;
                }
                SegmentKind::Digits | SegmentKind::Letters => {
                    let accepts = |c: char| match segment.kind {
                        SegmentKind::Digits => c.is_ascii_digit(),
                        SegmentKind::Letters => c.is_ascii_alphabetic(),
                        SegmentKind::Literal => false,
                    };
                    let run = rest.chars().take_while(|c| accepts(*c)).count();
                    let take = if segment.fixed_width {
                        if run < segment.length {
                            return None;
                        }
                        segment.length
                    } else {
                        if run == 0 {
                            return None;
                        }
                        run
                    };
                    // Fixed-width segments must end exactly where the run
                    // does, otherwise the next segment would start mid-run.
                    if segment.fixed_width && run > take {
                        return None;
                    }
                    values.push(rest[..take].to_string());
                    rest = &rest[take..];
                }
            }
        }

        if rest.is_empty() { Some(values) } else { None }
    }

    /// Compact shape string for diagnostics, e.g. `NN-NN-NNN-L`.
    pub fn shape(&self) -> String {
        if self.segments.is_empty() {
            return "*".to_string();
        }
        let mut shape = String::new();
        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Digits => {
                    for _ in 0..segment.length {
                        shape.push('N');
                    }
                    if !segment.fixed_width {
                        shape.push('+');
                    }
                }
                SegmentKind::Letters => {
                    for _ in 0..segment.length {
                        shape.push('L');
                    }
                    if !segment.fixed_width {
                        shape.push('+');
                    }
                }
                SegmentKind::Literal => {
                    if let Some(ref text) = segment.literal {
                        shape.push_str(text);
                    }
                }
            }
        }
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_pattern() -> FormatPattern {
        FormatPattern {
            pattern_type: PatternType::AisleRackPositionLevel,
            segments: vec![
                Segment::digits(2, true),
                Segment::literal("-"),
                Segment::digits(2, true),
                Segment::literal("-"),
                Segment::digits(3, true),
                Segment::literal("-"),
                Segment::letters(1, true),
            ],
            confidence: 1.0,
            source_examples: vec![],
        }
    }

    #[test]
    fn test_capture_grid_code() {
        let pattern = grid_pattern();
        let values = pattern.capture("01-02-003-A").unwrap();
        assert_eq!(values, vec!["01", "02", "003", "A"]);
    }

    #[test]
    fn test_fixed_width_rejects_longer_run() {
        let pattern = grid_pattern();
        assert!(!pattern.matches("001-02-003-A"));
        assert!(!pattern.matches("01-02-003-AB"));
        assert!(!pattern.matches("01-02-003"));
    }

    #[test]
    fn test_variable_width_consumes_run() {
        let pattern = FormatPattern {
            pattern_type: PatternType::PositionLevel,
            segments: vec![Segment::digits(3, false), Segment::letters(1, true)],
            confidence: 1.0,
            source_examples: vec![],
        };
        assert!(pattern.matches("42B"));
        assert!(pattern.matches("1042B"));
        assert!(!pattern.matches("B42"));
    }

    #[test]
    fn test_generic_pattern_accepts_alphanumeric() {
        let pattern = FormatPattern::generic(vec![]);
        assert!(pattern.matches("ANYTHING-42"));
        assert!(!pattern.matches(""));
        assert!(!pattern.matches("white space"));
    }

    #[test]
    fn test_shape_rendering() {
        assert_eq!(grid_pattern().shape(), "NN-NN-NNN-L");
    }
}
