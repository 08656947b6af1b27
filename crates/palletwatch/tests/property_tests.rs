//! Property-based tests for Palletwatch.
//!
//! These tests use proptest to generate random inputs and verify that the
//! location subsystem maintains its invariants under all conditions.
//!
//! # Testing Philosophy
//!
//! Property-based tests verify:
//! 1. **No panics**: validation and normalization never crash on any input
//! 2. **Determinism**: same input always produces same output
//! 3. **Consistency**: `validate` and `resolve` agree with each other
//! 4. **Invariants**: accepted codes always carry in-bounds coordinates
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p palletwatch --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p palletwatch --test property_tests
//! ```

use proptest::prelude::*;

use palletwatch::{
    FormatDetector, LocationNormalizer, LocationType, SpecialArea, VirtualLocationEngine,
    WarehouseGrammar,
};

fn grammar() -> WarehouseGrammar {
    WarehouseGrammar {
        warehouse_id: "WH1".to_string(),
        name: "Main".to_string(),
        aisles: 10,
        racks_per_aisle: 4,
        positions_per_rack: 20,
        level_names: vec!['A', 'B', 'C', 'D'],
        default_capacity: 2,
        special_areas: vec![SpecialArea {
            code: "RCV-01".to_string(),
            area_type: LocationType::Receiving,
            capacity: 50,
            zone: "INBOUND".to_string(),
        }],
        detected_format: None,
        active: true,
    }
}

// =============================================================================
// Test Strategies
// =============================================================================

/// Generate strings that look like grid location codes.
fn grid_code_like() -> impl Strategy<Value = String> {
    prop_oneof![
        // Well-formed, padded
        "[0-1][0-9]-[0-4]-[0-9]{3}-[A-D]",
        // Unpadded
        "[1-9]-[1-4]-[1-9]{1,2}-[a-dA-D]",
        // Underscored
        "[0-9]{1,2}_[0-9]{1,2}_[0-9]{1,3}_[A-Z]",
        // Junk shapes
        "[A-Z]{2,6}-?[0-9]{0,3}",
        "[a-zA-Z0-9_\\-]{0,20}",
    ]
}

/// Generate completely arbitrary printable strings (edge cases).
fn arbitrary_code() -> impl Strategy<Value = String> {
    "\\PC{0,40}"
}

/// Generate small batches of example codes for the detector.
fn example_batch() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(grid_code_like(), 0..6)
}

// =============================================================================
// Normalizer Properties
// =============================================================================

mod normalizer_tests {
    use super::*;

    proptest! {
        /// The original string is always the first variant.
        #[test]
        fn prop_original_first(code in arbitrary_code()) {
            let normalizer = LocationNormalizer::new();
            let variants = normalizer.variants(&code);
            prop_assert!(!variants.is_empty());
            prop_assert_eq!(&variants[0], &code);
        }

        /// Normalization is deterministic.
        #[test]
        fn prop_deterministic(code in arbitrary_code()) {
            let normalizer = LocationNormalizer::new();
            prop_assert_eq!(normalizer.variants(&code), normalizer.variants(&code));
        }

        /// Variant lists contain no duplicates.
        #[test]
        fn prop_no_duplicate_variants(code in grid_code_like()) {
            let normalizer = LocationNormalizer::new();
            let variants = normalizer.variants(&code);
            let mut seen = std::collections::HashSet::new();
            for variant in &variants {
                prop_assert!(seen.insert(variant.clone()), "duplicate variant {}", variant);
            }
        }

        /// Variant counts stay bounded.
        #[test]
        fn prop_bounded_output(code in arbitrary_code()) {
            let normalizer = LocationNormalizer::new();
            prop_assert!(normalizer.variants(&code).len() <= 16);
        }
    }
}

// =============================================================================
// Virtual Location Engine Properties
// =============================================================================

mod engine_tests {
    use super::*;

    proptest! {
        /// Validation never panics and agrees with resolution.
        #[test]
        fn prop_validate_resolve_agree(code in arbitrary_code()) {
            let grammar = grammar();
            let engine = VirtualLocationEngine::new(&grammar);
            let validity = engine.validate(&code);
            let record = engine.resolve(&code);
            prop_assert_eq!(validity.valid, record.is_some());
            if !validity.valid {
                prop_assert!(validity.reason.is_some());
            }
        }

        /// Accepted codes always carry in-bounds coordinates.
        #[test]
        fn prop_accepted_codes_in_bounds(code in grid_code_like()) {
            let grammar = grammar();
            let engine = VirtualLocationEngine::new(&grammar);
            if let Some(record) = engine.resolve(&code) {
                if let Some(aisle) = record.aisle {
                    prop_assert!(aisle >= 1 && aisle <= grammar.aisles);
                }
                if let Some(rack) = record.rack {
                    prop_assert!(rack >= 1 && rack <= grammar.racks_per_aisle);
                }
                if let Some(position) = record.position {
                    prop_assert!(position >= 1 && position <= grammar.positions_per_rack);
                }
                if let Some(level) = record.level {
                    prop_assert!(grammar.level_names.contains(&level));
                }
            }
        }

        /// Validation is deterministic.
        #[test]
        fn prop_validation_deterministic(code in arbitrary_code()) {
            let grammar = grammar();
            let engine = VirtualLocationEngine::new(&grammar);
            let first = engine.validate(&code);
            let second = engine.validate(&code);
            prop_assert_eq!(first.valid, second.valid);
            prop_assert_eq!(first.reason, second.reason);
        }
    }
}

// =============================================================================
// Format Detector Properties
// =============================================================================

mod detector_tests {
    use super::*;

    proptest! {
        /// Detection never panics and confidence stays in range.
        #[test]
        fn prop_confidence_in_range(examples in example_batch()) {
            let detector = FormatDetector::new();
            let refs: Vec<&str> = examples.iter().map(|s| s.as_str()).collect();
            let pattern = detector.detect(&refs);
            prop_assert!((0.0..=1.0).contains(&pattern.confidence));
        }

        /// Detection never panics on arbitrary inputs.
        #[test]
        fn prop_no_panic_on_arbitrary(examples in prop::collection::vec(arbitrary_code(), 0..5)) {
            let detector = FormatDetector::new();
            let refs: Vec<&str> = examples.iter().map(|s| s.as_str()).collect();
            let _ = detector.detect(&refs);
        }

        /// Re-detecting on a pattern's own examples reproduces the type
        /// with confidence at least as high.
        #[test]
        fn prop_idempotent(examples in prop::collection::vec(grid_code_like(), 1..5)) {
            let detector = FormatDetector::new();
            let refs: Vec<&str> = examples.iter().map(|s| s.as_str()).collect();
            let first = detector.detect(&refs);
            let again: Vec<&str> = first.source_examples.iter().map(|s| s.as_str()).collect();
            let second = detector.detect(&again);
            prop_assert_eq!(second.pattern_type, first.pattern_type);
            prop_assert!(second.confidence >= first.confidence - f64::EPSILON);
        }

        /// Every source example of a confident pattern matches it.
        #[test]
        fn prop_confident_pattern_matches_examples(
            examples in prop::collection::vec("[0-9]{2}-[0-9]{2}-[0-9]{3}-[A-D]", 3..6)
        ) {
            let detector = FormatDetector::new();
            let refs: Vec<&str> = examples.iter().map(|s| s.as_str()).collect();
            let pattern = detector.detect(&refs);
            if pattern.confidence >= palletwatch::MIN_FORMAT_CONFIDENCE {
                for example in &examples {
                    prop_assert!(pattern.matches(example), "{} should match", example);
                }
            }
        }
    }
}
