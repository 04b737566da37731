//! Requirement checks and cost modifiers derived from standing effects.
//!
//! Nothing here is cached: every value is recomputed from the player's
//! current effects, so adding or removing an effect is visible immediately.
mod discount;
mod requirements;

pub use discount::{card_discount, effective_cost, ocean_adjacency_bonus, standard_project_discounts};
pub use requirements::{measure, requirement_lenience, validate_requirements};
