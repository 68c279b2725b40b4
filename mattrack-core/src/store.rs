//! Storage ports.
//!
//! The eligibility engine reads students, promotion history, attendance counts
//! and one settings record through these traits. Write paths (enrolment,
//! check-in, recording a promotion, archiving) sit behind [`RosterWriter`] so
//! the calculator never mutates anything.
//!
//! Implementations must be safe to call from several threads at once; the
//! roster aggregation fans out across students.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{AttendanceRecord, PromotionRecord, Student, StudentId};

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("student '{0}' not found")]
    UnknownStudent(StudentId),
    #[error("student '{0}' already exists")]
    DuplicateStudent(StudentId),
    #[error("corrupt {table} row: {reason}")]
    Corrupt { table: &'static str, reason: String },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key/value settings. Values are opaque strings to the store.
pub trait SettingsStore {
    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite.
    fn write_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read side of the roster.
pub trait RosterStore {
    fn student(&self, id: &StudentId) -> Result<Student, StoreError>;

    /// Roster ordered by (last name, first name), ASCII case-insensitive.
    fn students(&self, include_archived: bool) -> Result<Vec<Student>, StoreError>;

    fn active_students(&self) -> Result<Vec<Student>, StoreError> {
        self.students(false)
    }

    fn enrollment_date(&self, id: &StudentId) -> Result<NaiveDate, StoreError> {
        Ok(self.student(id)?.start_date)
    }

    /// Promotion history, newest first. Same-day records: last inserted first.
    fn promotions(&self, id: &StudentId) -> Result<Vec<PromotionRecord>, StoreError>;

    /// Newest promotion record, if any.
    fn latest_promotion(&self, id: &StudentId) -> Result<Option<PromotionRecord>, StoreError> {
        Ok(self.promotions(id)?.into_iter().next())
    }

    /// Newest promotion that changed the belt itself.
    fn latest_rank_change(&self, id: &StudentId) -> Result<Option<PromotionRecord>, StoreError> {
        Ok(self
            .promotions(id)?
            .into_iter()
            .find(PromotionRecord::changes_rank))
    }

    /// Attendance records dated on or after `since`, any class type.
    fn count_attendance_on_or_after(
        &self,
        id: &StudentId,
        since: NaiveDate,
    ) -> Result<u32, StoreError>;
}

/// Write side of the roster.
pub trait RosterWriter {
    fn insert_student(&self, student: &Student) -> Result<(), StoreError>;

    /// Insert the student together with a baseline promotion record, atomically.
    ///
    /// `baseline.student_id` must be `student.id`; otherwise nothing is written
    /// and the baseline's student is reported unknown.
    fn insert_student_with_baseline(
        &self,
        student: &Student,
        baseline: &PromotionRecord,
    ) -> Result<(), StoreError>;

    /// Returns `false` when the (student, date, class type) slot was already taken.
    fn insert_attendance(&self, record: &AttendanceRecord) -> Result<bool, StoreError>;

    /// Append the record and move the student to `record.to`, atomically.
    fn apply_promotion(&self, record: &PromotionRecord) -> Result<(), StoreError>;

    fn set_active(&self, id: &StudentId, active: bool) -> Result<(), StoreError>;
}
