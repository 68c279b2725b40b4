//! Rank ladder: belts, stripes, and a student's position on the ladder.
//!
//! The belt sequence is fixed and closed: `white < blue < purple < brown < black`.
//! Ordering is by position in [`Rank::ALL`], never by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

static LADDER: [Rank; 5] = Rank::ALL;

/// A belt. Declaration order is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    White,
    Blue,
    Purple,
    Brown,
    Black,
}

impl Rank {
    /// Every rank, lowest first.
    pub const ALL: [Rank; 5] = [
        Rank::White,
        Rank::Blue,
        Rank::Purple,
        Rank::Brown,
        Rank::Black,
    ];

    /// Position in the belt sequence (white = 0).
    pub fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Blue => 1,
            Self::Purple => 2,
            Self::Brown => 3,
            Self::Black => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Rank> {
        Self::ALL.get(index).copied()
    }

    /// The next belt in sequence, or `None` for black.
    pub fn next(self) -> Option<Rank> {
        Self::from_index(self.index() + 1)
    }

    /// True for the last belt in the sequence.
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Ranks strictly between `self` and `other` (exclusive on both ends).
    pub fn between(self, other: Rank) -> &'static [Rank] {
        let (lo, hi) = if self.index() <= other.index() {
            (self.index(), other.index())
        } else {
            (other.index(), self.index())
        };
        if hi - lo < 2 {
            return &[];
        }
        &LADDER[lo + 1..hi]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Brown => "brown",
            Self::Black => "black",
        }
    }

    /// Display label, e.g. "Purple Belt".
    pub fn label(self) -> &'static str {
        match self {
            Self::White => "White Belt",
            Self::Blue => "Blue Belt",
            Self::Purple => "Purple Belt",
            Self::Brown => "Brown Belt",
            Self::Black => "Black Belt",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == lowered)
            .ok_or_else(|| DomainError::UnknownRank(s.to_string()))
    }
}

/// Stripe count within a belt, always in `0..=4`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stripes(u8);

impl Stripes {
    pub const MAX: u8 = 4;
    pub const NONE: Stripes = Stripes(0);
    pub const FULL: Stripes = Stripes(Self::MAX);

    pub fn new(count: u8) -> Result<Self, DomainError> {
        if count > Self::MAX {
            return Err(DomainError::StripesOutOfRange(count));
        }
        Ok(Self(count))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// At four stripes the next step is a belt, not a stripe.
    pub fn is_full(self) -> bool {
        self.0 == Self::MAX
    }
}

impl TryFrom<u8> for Stripes {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stripes> for u8 {
    fn from(stripes: Stripes) -> u8 {
        stripes.0
    }
}

impl fmt::Display for Stripes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A belt plus stripe count. Written `rank:stripes` (e.g. `blue:2`).
///
/// Orders by rank, then stripes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RankPosition {
    pub rank: Rank,
    pub stripes: Stripes,
}

impl RankPosition {
    pub fn new(rank: Rank, stripes: u8) -> Result<Self, DomainError> {
        Ok(Self {
            rank,
            stripes: Stripes::new(stripes)?,
        })
    }

    /// Fresh white belt, no stripes.
    pub fn beginner() -> Self {
        Self {
            rank: Rank::White,
            stripes: Stripes::NONE,
        }
    }

    /// Human-readable form, e.g. "Blue Belt, 2 stripes".
    pub fn describe(&self) -> String {
        let n = self.stripes.get();
        format!(
            "{}, {} stripe{}",
            self.rank.label(),
            n,
            if n == 1 { "" } else { "s" }
        )
    }
}

impl Default for RankPosition {
    fn default() -> Self {
        Self::beginner()
    }
}

impl fmt::Display for RankPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rank, self.stripes)
    }
}

impl FromStr for RankPosition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rank, stripes) = match s.split_once(':') {
            Some((rank, stripes)) => (rank, stripes),
            None => (s, "0"),
        };
        let rank: Rank = rank.parse()?;
        let stripes: u8 = stripes
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidPosition(s.to_string()))?;
        Self::new(rank, stripes)
    }
}
