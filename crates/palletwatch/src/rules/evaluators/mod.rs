//! Built-in rule evaluators, one per rule family.

mod invalid_location;
mod mapping_error;
mod overcapacity;
mod stagnant;
mod uncoordinated_lots;

use indexmap::IndexMap;

pub use invalid_location::InvalidLocationEvaluator;
pub use mapping_error::LocationMappingErrorEvaluator;
pub use overcapacity::OvercapacityEvaluator;
pub use stagnant::StagnantPalletsEvaluator;
pub use uncoordinated_lots::UncoordinatedLotsEvaluator;

use super::engine::RuleEvaluator;
use super::rule::RuleType;

/// The default evaluator registry covering every rule family.
pub fn default_evaluators() -> IndexMap<RuleType, Box<dyn RuleEvaluator>> {
    let mut evaluators: IndexMap<RuleType, Box<dyn RuleEvaluator>> = IndexMap::new();
    evaluators.insert(
        RuleType::StagnantPallets,
        Box::new(StagnantPalletsEvaluator),
    );
    evaluators.insert(RuleType::Overcapacity, Box::new(OvercapacityEvaluator));
    evaluators.insert(
        RuleType::InvalidLocation,
        Box::new(InvalidLocationEvaluator),
    );
    evaluators.insert(
        RuleType::UncoordinatedLots,
        Box::new(UncoordinatedLotsEvaluator),
    );
    evaluators.insert(
        RuleType::LocationMappingError,
        Box::new(LocationMappingErrorEvaluator),
    );
    evaluators
}
