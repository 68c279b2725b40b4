use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{PromotionId, StudentId};
use super::rank::RankPosition;

/// Append-only record of a rank change (stripe or belt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRecord {
    pub id: PromotionId,
    pub student_id: StudentId,
    pub from: RankPosition,
    pub to: RankPosition,
    pub promoted_at: NaiveDate,
    pub notes: Option<String>,
}

impl PromotionRecord {
    pub fn new(
        student_id: StudentId,
        from: RankPosition,
        to: RankPosition,
        promoted_at: NaiveDate,
    ) -> Self {
        Self {
            id: PromotionId::generate(),
            student_id,
            from,
            to,
            promoted_at,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// True when the belt itself changed (not just the stripe count).
    pub fn changes_rank(&self) -> bool {
        self.from.rank != self.to.rank
    }
}
