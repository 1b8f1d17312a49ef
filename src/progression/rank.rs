//! Ranks and point thresholds
//!
//! A user's rank is derived from their point total through a table of tiers.
//! Each tier either sets the running threshold to its own value or adds its
//! value on top of the previous threshold.

use thiserror::Error;

use crate::model::parse_number;

/// One row of the rank table before thresholds are folded in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankDefinition {
    pub name: String,
    pub value: u32,
    /// Adds `value` to the previous threshold instead of replacing it
    pub cumulative: bool,
}

impl RankDefinition {
    pub fn absolute(name: impl Into<String>, value: u32) -> Self {
        Self { name: name.into(), value, cumulative: false }
    }

    pub fn cumulative(name: impl Into<String>, value: u32) -> Self {
        Self { name: name.into(), value, cumulative: true }
    }
}

/// A rank with its computed upper threshold (inclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank {
    pub name: String,
    pub threshold: u64,
}

/// Badge color family for a rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gray,
    Blue,
    Green,
    Amber,
    Red,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    #[error("rank table has no entries")]
    Empty,
    #[error("threshold for rank '{name}' ({threshold}) does not exceed the previous one ({previous})")]
    NotIncreasing { name: String, threshold: u64, previous: u64 },
}

/// Rank table with thresholds computed once at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    ranks: Vec<Rank>,
}

impl RankTable {
    /// Fold the definitions into ascending thresholds
    pub fn new(definitions: &[RankDefinition]) -> Result<Self, RankError> {
        if definitions.is_empty() {
            return Err(RankError::Empty);
        }

        let ranks = fold_thresholds(definitions);
        for pair in ranks.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(RankError::NotIncreasing {
                    name: pair[1].name.clone(),
                    threshold: pair[1].threshold,
                    previous: pair[0].threshold,
                });
            }
        }

        Ok(Self { ranks })
    }

    /// Rank for a point total. Negative totals count as zero.
    pub fn rank_for(&self, points: i64) -> &Rank {
        let points = points.max(0) as u64;
        self.ranks
            .iter()
            .find(|r| points <= r.threshold)
            .unwrap_or_else(|| self.highest())
    }

    /// Rank for operator-typed points; anything non-numeric counts as zero
    pub fn rank_for_input(&self, text: &str) -> &Rank {
        let points = parse_number(text).map(|v| v.ceil() as i64).unwrap_or(0);
        self.rank_for(points)
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    pub fn thresholds(&self) -> Vec<u64> {
        self.ranks.iter().map(|r| r.threshold).collect()
    }

    fn highest(&self) -> &Rank {
        // Construction rejects empty tables
        &self.ranks[self.ranks.len() - 1]
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self {
            ranks: fold_thresholds(&default_rank_definitions()),
        }
    }
}

fn fold_thresholds(definitions: &[RankDefinition]) -> Vec<Rank> {
    let mut running = 0u64;
    definitions
        .iter()
        .map(|def| {
            running = if def.cumulative {
                running + def.value as u64
            } else {
                def.value as u64
            };
            Rank { name: def.name.clone(), threshold: running }
        })
        .collect()
}

/// The inquisition's rank ladder. Cumulative from Cadete upward.
pub fn default_rank_definitions() -> Vec<RankDefinition> {
    vec![
        RankDefinition::absolute("Acólito", 20),
        RankDefinition::absolute("Aprendiz", 30),
        RankDefinition::cumulative("Cadete", 40),
        RankDefinition::cumulative("Agente", 45),
        RankDefinition::cumulative("Preceptor", 50),
        RankDefinition::cumulative("Operador", 55),
        RankDefinition::cumulative("Centurión", 60),
        RankDefinition::cumulative("Inspector", 65),
    ]
}

/// Badge tone for a rank name
pub fn rank_tone(name: &str) -> Tone {
    match name {
        "Acólito" => Tone::Gray,
        "Aprendiz" => Tone::Blue,
        "Cadete" => Tone::Green,
        "Agente" => Tone::Amber,
        "Preceptor" => Tone::Blue,
        "Operador" => Tone::Green,
        "Centurión" | "Inspector" => Tone::Red,
        _ => Tone::Gray,
    }
}
