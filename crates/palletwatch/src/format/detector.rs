//! Format inference from example location codes.

use indexmap::IndexMap;

use super::pattern::{FormatPattern, PatternType, Segment, SegmentKind};

/// Confidence multiplier applied when fewer than three examples are given.
const SMALL_SAMPLE_PENALTY: f64 = 0.75;

/// A tokenized run within one example code.
#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: SegmentKind,
    text: String,
}

/// Infers a [`FormatPattern`] from example location codes.
///
/// Detection fails softly: empty or fully contradictory examples yield a
/// low- or zero-confidence pattern, never an error. Callers branch on
/// [`FormatPattern::confidence`].
#[derive(Debug, Default)]
pub struct FormatDetector;

impl FormatDetector {
    /// Create a detector.
    pub fn new() -> Self {
        Self
    }

    /// Learn a pattern from the given examples.
    ///
    /// Examples are segmented into maximal digit/letter/separator runs and
    /// aligned positionally. The shape shared by the most examples becomes
    /// the pattern; ties prefer the alignment with more stable positions,
    /// then the shortest total pattern. Confidence is the fraction of
    /// stable positions scaled by shape coverage, with a penalty below
    /// three examples.
    pub fn detect(&self, examples: &[&str]) -> FormatPattern {
        let source_examples: Vec<String> = examples.iter().map(|e| e.trim().to_string()).collect();
        let tokenized: Vec<Vec<Token>> = source_examples
            .iter()
            .filter(|e| !e.is_empty())
            .map(|e| tokenize(e))
            .collect();

        if tokenized.is_empty() {
            return FormatPattern::generic(source_examples);
        }

        // Group examples by shape signature (sequence of kinds plus literal
        // texts, lengths ignored).
        let mut groups: IndexMap<String, Vec<&Vec<Token>>> = IndexMap::new();
        for tokens in &tokenized {
            groups.entry(signature(tokens)).or_default().push(tokens);
        }

        let Some(candidate) = groups.values().max_by(|a, b| {
            a.len()
                .cmp(&b.len())
                .then(stable_positions(a).cmp(&stable_positions(b)))
                .then(total_length(b[0]).cmp(&total_length(a[0])))
        }) else {
            return FormatPattern::generic(source_examples);
        };

        let template = candidate[0];
        let total = template.len();
        if total == 0 {
            return FormatPattern::generic(source_examples);
        }

        // A position is stable when every example of the shape agrees on
        // its length; kind and literal text agree by signature construction.
        let mut segments = Vec::with_capacity(total);
        let mut stable = 0usize;
        for (i, token) in template.iter().enumerate() {
            let template_len = token.text.chars().count();
            let mut max_length = template_len;
            let mut length_agrees = true;
            for tokens in candidate {
                let len = tokens[i].text.chars().count();
                max_length = max_length.max(len);
                if len != template_len {
                    length_agrees = false;
                }
            }
            if length_agrees {
                stable += 1;
            }

            segments.push(match token.kind {
                SegmentKind::Literal => Segment::literal(token.text.clone()),
                SegmentKind::Digits => Segment::digits(max_length, length_agrees),
                SegmentKind::Letters => Segment::letters(max_length, length_agrees),
            });
        }

        let coverage = candidate.len() as f64 / tokenized.len() as f64;
        let mut confidence = (stable as f64 / total as f64) * coverage;
        if tokenized.len() < 3 {
            confidence *= SMALL_SAMPLE_PENALTY;
        }

        FormatPattern {
            pattern_type: classify(&segments),
            segments,
            confidence,
            source_examples,
        }
    }
}

/// Split a code into maximal runs of digits, letters, and separators.
fn tokenize(code: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for c in code.chars() {
        let kind = if c.is_ascii_digit() {
            SegmentKind::Digits
        } else if c.is_ascii_alphabetic() {
            SegmentKind::Letters
        } else {
            SegmentKind::Literal
        };
        match tokens.last_mut() {
            Some(last) if last.kind == kind && kind != SegmentKind::Literal => {
                last.text.push(c);
            }
            // Separator runs are split per character so `--` and `-` stay
            // distinguishable as two literal positions.
            _ => tokens.push(Token {
                kind,
                text: c.to_string(),
            }),
        }
    }
    tokens
}

/// Shape signature: kinds and literal texts, lengths ignored.
fn signature(tokens: &[Token]) -> String {
    let mut sig = String::new();
    for token in tokens {
        match token.kind {
            SegmentKind::Digits => sig.push('N'),
            SegmentKind::Letters => sig.push('L'),
            SegmentKind::Literal => {
                sig.push('[');
                sig.push_str(&token.text);
                sig.push(']');
            }
        }
    }
    sig
}

/// Count positions where every member of a shape group agrees on length.
fn stable_positions(group: &[&Vec<Token>]) -> usize {
    let template = group[0];
    (0..template.len())
        .filter(|&i| {
            group
                .iter()
                .all(|tokens| tokens[i].text.chars().count() == template[i].text.chars().count())
        })
        .count()
}

fn total_length(tokens: &[Token]) -> usize {
    tokens.iter().map(|t| t.text.chars().count()).sum()
}

/// Classify a segment sequence into a broad pattern type.
fn classify(segments: &[Segment]) -> PatternType {
    let values: Vec<&Segment> = segments.iter().filter(|s| s.is_value()).collect();
    match values.as_slice() {
        [digits, letter]
            if digits.kind == SegmentKind::Digits
                && letter.kind == SegmentKind::Letters
                && letter.length == 1 =>
        {
            PatternType::PositionLevel
        }
        [a, b, c, letter]
            if a.kind == SegmentKind::Digits
                && b.kind == SegmentKind::Digits
                && c.kind == SegmentKind::Digits
                && letter.kind == SegmentKind::Letters
                && letter.length == 1 =>
        {
            PatternType::AisleRackPositionLevel
        }
        _ => PatternType::AlphanumericFree,
    }
}
