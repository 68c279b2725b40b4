//! Promotion thresholds: class counts required per stripe and per belt.
//!
//! Two independent tables:
//! - **Stripe thresholds** cover every rank: classes needed to earn the next
//!   stripe (the same count for each stripe within a rank).
//! - **Belt thresholds** cover every rank except black: classes needed at four
//!   stripes before the next belt. Black has no field, so "no next belt" is a
//!   type-level absence rather than a null.
//!
//! Values are not validated. A zero or negative count makes every
//! student at that rank immediately due.
//!
//! Serialized form (camelCase, one JSON object):
//! `{"stripeThresholds": {"white": 25, ...}, "beltThresholds": {"white": 200, ...}}`.
//! Keys missing from a stored object take their default individually.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Rank};

/// Classes per stripe, for every rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeThresholds {
    pub white: i64,
    pub blue: i64,
    pub purple: i64,
    pub brown: i64,
    pub black: i64,
}

impl Default for StripeThresholds {
    fn default() -> Self {
        Self {
            white: 25,
            blue: 40,
            purple: 50,
            brown: 60,
            black: 100,
        }
    }
}

impl StripeThresholds {
    pub fn get(&self, rank: Rank) -> i64 {
        match rank {
            Rank::White => self.white,
            Rank::Blue => self.blue,
            Rank::Purple => self.purple,
            Rank::Brown => self.brown,
            Rank::Black => self.black,
        }
    }

    pub fn set(&mut self, rank: Rank, classes: i64) {
        let slot = match rank {
            Rank::White => &mut self.white,
            Rank::Blue => &mut self.blue,
            Rank::Purple => &mut self.purple,
            Rank::Brown => &mut self.brown,
            Rank::Black => &mut self.black,
        };
        *slot = classes;
    }
}

/// Classes at four stripes before the next belt. No entry for black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltThresholds {
    pub white: i64,
    pub blue: i64,
    pub purple: i64,
    pub brown: i64,
}

impl Default for BeltThresholds {
    fn default() -> Self {
        Self {
            white: 200,
            blue: 300,
            purple: 225,
            brown: 150,
        }
    }
}

impl BeltThresholds {
    /// `None` for the terminal rank.
    pub fn get(&self, rank: Rank) -> Option<i64> {
        match rank {
            Rank::White => Some(self.white),
            Rank::Blue => Some(self.blue),
            Rank::Purple => Some(self.purple),
            Rank::Brown => Some(self.brown),
            Rank::Black => None,
        }
    }

    pub fn set(&mut self, rank: Rank, classes: i64) -> Result<(), DomainError> {
        let slot = match rank {
            Rank::White => &mut self.white,
            Rank::Blue => &mut self.blue,
            Rank::Purple => &mut self.purple,
            Rank::Brown => &mut self.brown,
            Rank::Black => return Err(DomainError::NoBeltThreshold(rank)),
        };
        *slot = classes;
        Ok(())
    }
}

/// Which threshold table an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdKind {
    Stripe,
    Belt,
}

/// The complete persisted threshold configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThresholdConfig {
    pub stripe_thresholds: StripeThresholds,
    pub belt_thresholds: BeltThresholds,
}

impl ThresholdConfig {
    /// Parse a stored record. Missing keys take their defaults; anything that
    /// is not a JSON object of integers is an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Entries that are zero or negative. These make the rank trivially due.
    pub fn non_positive(&self) -> Vec<(ThresholdKind, Rank, i64)> {
        let stripes = Rank::ALL
            .iter()
            .map(|&r| (ThresholdKind::Stripe, r, self.stripe_thresholds.get(r)));
        let belts = Rank::ALL.iter().filter_map(|&r| {
            self.belt_thresholds
                .get(r)
                .map(|v| (ThresholdKind::Belt, r, v))
        });
        stripes.chain(belts).filter(|&(_, _, v)| v <= 0).collect()
    }
}
