use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::ids::{AttendanceId, StudentId};

/// Kind of class attended. Every kind counts equally toward promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Gi,
    Nogi,
    OpenMat,
}

impl ClassType {
    pub const ALL: [ClassType; 3] = [ClassType::Gi, ClassType::Nogi, ClassType::OpenMat];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gi => "gi",
            Self::Nogi => "nogi",
            Self::OpenMat => "open_mat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gi => "Gi",
            Self::Nogi => "No-Gi",
            Self::OpenMat => "Open Mat",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase().replace('-', "_");
        match lowered.as_str() {
            "gi" => Ok(Self::Gi),
            "nogi" | "no_gi" => Ok(Self::Nogi),
            "open_mat" | "openmat" => Ok(Self::OpenMat),
            _ => Err(DomainError::UnknownClassType(s.to_string())),
        }
    }
}

/// One check-in. At most one per (student, date, class type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub class_type: ClassType,
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(student_id: StudentId, date: NaiveDate, class_type: ClassType) -> Self {
        Self {
            id: AttendanceId::generate(),
            student_id,
            date,
            class_type,
            created_at: Utc::now(),
        }
    }

    /// Identity used for duplicate suppression at write time.
    pub fn slot(&self) -> (&StudentId, NaiveDate, ClassType) {
        (&self.student_id, self.date, self.class_type)
    }
}
