use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::StudentId;
use super::rank::RankPosition;

/// A roster entry. Owned by the store; read-only to the eligibility engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Enrollment date; the progress baseline until a first promotion exists.
    pub start_date: NaiveDate,
    pub position: RankPosition,
    pub is_active: bool,
}

impl Student {
    /// New active white belt with a generated id.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: StudentId::generate(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            phone: None,
            start_date,
            position: RankPosition::beginner(),
            is_active: true,
        }
    }

    pub fn with_position(mut self, position: RankPosition) -> Self {
        self.position = position;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Roster sort key: (last, first) with ASCII case folding, the same order
    /// as SQLite's `COLLATE NOCASE` on the two columns.
    pub fn sort_name(&self) -> (String, String) {
        (
            self.last_name.to_ascii_lowercase(),
            self.first_name.to_ascii_lowercase(),
        )
    }
}
