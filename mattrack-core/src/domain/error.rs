use thiserror::Error;

use super::rank::Rank;

/// Errors from parsing or constructing domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown rank '{0}' (expected white, blue, purple, brown or black)")]
    UnknownRank(String),
    #[error("stripe count {0} out of range (0..=4)")]
    StripesOutOfRange(u8),
    #[error("invalid rank position '{0}' (expected rank:stripes, e.g. blue:2)")]
    InvalidPosition(String),
    #[error("unknown class type '{0}' (expected gi, nogi or open_mat)")]
    UnknownClassType(String),
    #[error("{0} belt is the last rank and has no belt threshold")]
    NoBeltThreshold(Rank),
}
