//! Location-code normalization.
//!
//! Inventory exports drift from the stored grammar in predictable ways:
//! padding is dropped or added, separators flip between hyphen and
//! underscore, case varies, and some exporters transpose the aisle and rack
//! tokens. The normalizer produces the bounded set of plausible renderings
//! of a raw code so matching can absorb that drift.

use indexmap::IndexSet;

use crate::grammar::WarehouseGrammar;

/// Number of decimal digits needed to render `value`.
fn digit_width(value: u32) -> usize {
    value.max(1).to_string().len()
}

/// Generates plausible variants of a raw location code.
///
/// Deterministic and side-effect-free: the same input always yields the
/// same variant list in the same order, and the original code is always
/// the first entry.
#[derive(Debug, Clone)]
pub struct LocationNormalizer {
    /// Zero-pad widths for the first three numeric segments.
    pad_widths: [usize; 3],
}

impl Default for LocationNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationNormalizer {
    /// Normalizer with the conventional 2-2-3 grid widths.
    pub fn new() -> Self {
        Self {
            pad_widths: [2, 2, 3],
        }
    }

    /// Normalizer whose padding matches a grammar's coordinate bounds.
    pub fn for_grammar(grammar: &WarehouseGrammar) -> Self {
        Self {
            pad_widths: [
                digit_width(grammar.aisles).max(2),
                digit_width(grammar.racks_per_aisle).max(2),
                digit_width(grammar.positions_per_rack).max(3),
            ],
        }
    }

    /// All plausible renderings of `raw`, original first, de-duplicated in
    /// first-seen order.
    pub fn variants(&self, raw: &str) -> Vec<String> {
        let mut variants: IndexSet<String> = IndexSet::new();
        variants.insert(raw.to_string());

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return variants.into_iter().collect();
        }

        let upper = trimmed.to_ascii_uppercase();
        variants.insert(trimmed.to_string());
        variants.insert(upper.clone());

        // Separator drift, applied to the uppercased base.
        let dashed = upper.replace('_', "-");
        let underscored = upper.replace('-', "_");
        variants.insert(dashed.clone());
        variants.insert(underscored);

        // Padding drift: widen numeric runs to the grammar widths, and
        // collapse leading zeros.
        let padded = self.pad_numeric_runs(&dashed);
        variants.insert(padded.clone());
        variants.insert(collapse_numeric_runs(&dashed));

        // Known transposition drift: some exporters emit rack-aisle instead
        // of aisle-rack. Swap the first two separated segments.
        if let Some(swapped) = swap_leading_segments(&dashed) {
            variants.insert(swapped.clone());
            variants.insert(self.pad_numeric_runs(&swapped));
        }
        if let Some(swapped) = swap_leading_segments(&padded) {
            variants.insert(swapped);
        }

        variants.into_iter().collect()
    }

    /// Zero-pad each numeric run to the configured width for its ordinal.
    fn pad_numeric_runs(&self, code: &str) -> String {
        let mut out = String::with_capacity(code.len() + 4);
        let mut numeric_index = 0usize;
        let mut run = String::new();

        let flush = |run: &mut String, out: &mut String, numeric_index: &mut usize| {
            if run.is_empty() {
                return;
            }
            let width = self
                .pad_widths
                .get(*numeric_index)
                .copied()
                .unwrap_or(run.len());
            // Widen only; existing wider runs are left alone.
            if run.len() < width {
                for _ in 0..(width - run.len()) {
                    out.push('0');
                }
            }
            out.push_str(run);
            run.clear();
            *numeric_index += 1;
        };

        for c in code.chars() {
            if c.is_ascii_digit() {
                run.push(c);
            } else {
                flush(&mut run, &mut out, &mut numeric_index);
                out.push(c);
            }
        }
        flush(&mut run, &mut out, &mut numeric_index);
        out
    }
}

/// Strip leading zeros from each numeric run ("01-02-003-A" -> "1-2-3-A").
fn collapse_numeric_runs(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut run = String::new();

    let flush = |run: &mut String, out: &mut String| {
        if run.is_empty() {
            return;
        }
        let stripped = run.trim_start_matches('0');
        if stripped.is_empty() {
            out.push('0');
        } else {
            out.push_str(stripped);
        }
        run.clear();
    };

    for c in code.chars() {
        if c.is_ascii_digit() {
            run.push(c);
        } else {
            flush(&mut run, &mut out);
            out.push(c);
        }
    }
    flush(&mut run, &mut out);
    out
}

/// Swap the first two `-`-separated segments, when there are at least three.
fn swap_leading_segments(code: &str) -> Option<String> {
    let segments: Vec<&str> = code.split('-').collect();
    if segments.len() < 3 {
        return None;
    }
    let mut swapped: Vec<&str> = segments.clone();
    swapped.swap(0, 1);
    if swapped == segments {
        return None;
    }
    Some(swapped.join("-"))
}
