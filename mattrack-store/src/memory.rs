//! In-process store backed by vectors behind an `RwLock`.
//!
//! Insertion order is the tie-breaker for same-day promotions, matching the
//! SQLite adapter's rowid ordering.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;

use mattrack_core::{
    AttendanceRecord, PromotionRecord, RosterStore, RosterWriter, SettingsStore, StoreError,
    Student, StudentId,
};

#[derive(Debug, Default)]
struct Tables {
    students: Vec<Student>,
    attendance: Vec<AttendanceRecord>,
    promotions: Vec<PromotionRecord>,
    settings: HashMap<String, String>,
}

/// Volatile store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl SettingsStore for MemoryStore {
    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.settings.get(key).cloned())
    }

    fn write_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write()?
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl RosterStore for MemoryStore {
    fn student(&self, id: &StudentId) -> Result<Student, StoreError> {
        self.read()?
            .students
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownStudent(id.clone()))
    }

    fn students(&self, include_archived: bool) -> Result<Vec<Student>, StoreError> {
        let mut out: Vec<Student> = self
            .read()?
            .students
            .iter()
            .filter(|s| include_archived || s.is_active)
            .cloned()
            .collect();
        out.sort_by_key(Student::sort_name);
        Ok(out)
    }

    fn promotions(&self, id: &StudentId) -> Result<Vec<PromotionRecord>, StoreError> {
        let t = self.read()?;
        // Reverse first so that a stable sort keeps later inserts ahead on ties.
        let mut out: Vec<PromotionRecord> = t
            .promotions
            .iter()
            .rev()
            .filter(|p| &p.student_id == id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.promoted_at.cmp(&a.promoted_at));
        Ok(out)
    }

    fn count_attendance_on_or_after(
        &self,
        id: &StudentId,
        since: NaiveDate,
    ) -> Result<u32, StoreError> {
        let count = self
            .read()?
            .attendance
            .iter()
            .filter(|a| &a.student_id == id && a.date >= since)
            .count();
        Ok(count as u32)
    }
}

impl RosterWriter for MemoryStore {
    fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.students.iter().any(|s| s.id == student.id) {
            return Err(StoreError::DuplicateStudent(student.id.clone()));
        }
        t.students.push(student.clone());
        Ok(())
    }

    fn insert_student_with_baseline(
        &self,
        student: &Student,
        baseline: &PromotionRecord,
    ) -> Result<(), StoreError> {
        if baseline.student_id != student.id {
            return Err(StoreError::UnknownStudent(baseline.student_id.clone()));
        }
        let mut t = self.write()?;
        if t.students.iter().any(|s| s.id == student.id) {
            return Err(StoreError::DuplicateStudent(student.id.clone()));
        }
        t.students.push(student.clone());
        t.promotions.push(baseline.clone());
        Ok(())
    }

    fn insert_attendance(&self, record: &AttendanceRecord) -> Result<bool, StoreError> {
        let mut t = self.write()?;
        if !t.students.iter().any(|s| s.id == record.student_id) {
            return Err(StoreError::UnknownStudent(record.student_id.clone()));
        }
        if t.attendance.iter().any(|a| a.slot() == record.slot()) {
            debug!(student = %record.student_id, date = %record.date, "duplicate check-in ignored");
            return Ok(false);
        }
        t.attendance.push(record.clone());
        Ok(true)
    }

    fn apply_promotion(&self, record: &PromotionRecord) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let student = t
            .students
            .iter_mut()
            .find(|s| s.id == record.student_id)
            .ok_or_else(|| StoreError::UnknownStudent(record.student_id.clone()))?;
        student.position = record.to;
        t.promotions.push(record.clone());
        Ok(())
    }

    fn set_active(&self, id: &StudentId, active: bool) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let student = t
            .students
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| StoreError::UnknownStudent(id.clone()))?;
        student.is_active = active;
        Ok(())
    }
}
