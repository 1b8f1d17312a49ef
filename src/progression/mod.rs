//! Progression systems
//!
//! Rank tiers derived from a user's points.

pub mod rank;

pub use rank::{Rank, RankDefinition, RankError, RankTable, Tone, default_rank_definitions, rank_tone};
