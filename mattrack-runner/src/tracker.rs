//! Promotion tracker: the service that ties storage to the calculator.
//!
//! Read paths resolve a student's baseline, count attendance since it, and
//! hand the numbers to [`compute_status`]. The roster-wide pass fans out over
//! rayon; every student is computed independently with the same thresholds, so
//! the result equals a serial pass in roster order.
//!
//! Write paths (enrolment, check-in, promotion, archiving) go straight to the
//! store. A promotion always records the student's current position as its
//! `from`, so history and current rank cannot drift apart through this type.

use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use mattrack_core::{
    compute_status, validate_transition, AttendanceRecord, BeltTenure, ClassType,
    PromotionRecord, PromotionStatus, RankPosition, RosterStore, RosterWriter, SettingsStore,
    StoreError, Student, StudentId, ThresholdConfig,
};

use crate::attendance::count_attendance_since;
use crate::baseline::{baseline_date, belt_baseline_date, days_between};
use crate::settings::{load_thresholds, save_thresholds};

/// Note stored on the record created by [`PromotionTracker::enroll_with_history`].
pub const BASELINE_NOTE: &str = "Baseline promotion (pre-existing rank at onboarding)";

/// Errors from tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One roster row: the student and their computed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentStatus {
    pub student: Student,
    pub status: PromotionStatus,
}

/// Result of recording a promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionOutcome {
    pub record: PromotionRecord,
    /// Advisory text when the change was not a standard single step.
    pub warning: Option<String>,
}

/// Eligibility service over a store.
///
/// `today` is fixed at construction so that every status in one pass is
/// measured against the same date.
#[derive(Debug)]
pub struct PromotionTracker<S> {
    store: S,
    today: NaiveDate,
}

impl<S> PromotionTracker<S>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
{
    /// Tracker measuring against the local calendar date.
    pub fn new(store: S) -> Self {
        Self::with_today(store, Local::now().date_naive())
    }

    pub fn with_today(store: S, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    // ─── Thresholds ──────────────────────────────────────────────────

    pub fn thresholds(&self) -> Result<ThresholdConfig, TrackerError> {
        Ok(load_thresholds(&self.store)?)
    }

    pub fn save_thresholds(&self, config: &ThresholdConfig) -> Result<(), TrackerError> {
        save_thresholds(&self.store, config)?;
        info!("promotion thresholds saved");
        Ok(())
    }

    // ─── Status ──────────────────────────────────────────────────────

    /// Status for one student, archived or not.
    pub fn student_status(&self, id: &StudentId) -> Result<PromotionStatus, TrackerError> {
        let student = self.store.student(id)?;
        let thresholds = self.thresholds()?;
        self.status_for(&student, &thresholds)
    }

    /// Status for every active student, in roster order.
    ///
    /// Thresholds are loaded once for the whole pass.
    pub fn all_statuses(&self) -> Result<Vec<StudentStatus>, TrackerError> {
        let thresholds = self.thresholds()?;
        let students = self.store.active_students()?;

        students
            .into_par_iter()
            .map(|student| -> Result<StudentStatus, TrackerError> {
                let status = self.status_for(&student, &thresholds)?;
                Ok(StudentStatus { student, status })
            })
            .collect()
    }

    fn status_for(
        &self,
        student: &Student,
        thresholds: &ThresholdConfig,
    ) -> Result<PromotionStatus, TrackerError> {
        let since = baseline_date(&self.store, &student.id)?;
        let classes = count_attendance_since(&self.store, &student.id, since)?;
        let days = days_between(since, self.today);
        let status = compute_status(student.position, classes, days, since, thresholds);
        debug!(
            student = %student.id,
            baseline = %since,
            classes,
            progress = status.progress,
            "computed promotion status"
        );
        Ok(status)
    }

    /// Time at the current belt.
    pub fn belt_tenure(&self, id: &StudentId) -> Result<BeltTenure, TrackerError> {
        let since = belt_baseline_date(&self.store, id)?;
        Ok(BeltTenure::new(since, self.today))
    }

    // ─── Writes ──────────────────────────────────────────────────────

    pub fn enroll(&self, student: Student) -> Result<Student, TrackerError> {
        self.store.insert_student(&student)?;
        info!(student = %student.id, name = %student.full_name(), "student enrolled");
        Ok(student)
    }

    /// Enroll a student who already holds a rank, e.g. a transfer.
    ///
    /// With `last_promoted` set and a rank above fresh white belt, a same-rank
    /// baseline record dated `last_promoted` anchors their progress instead of
    /// the enrollment date. The student and the record are written together.
    pub fn enroll_with_history(
        &self,
        student: Student,
        last_promoted: Option<NaiveDate>,
    ) -> Result<Student, TrackerError> {
        let date = match last_promoted {
            Some(date) if student.position != RankPosition::beginner() => date,
            _ => return self.enroll(student),
        };
        let record =
            PromotionRecord::new(student.id.clone(), student.position, student.position, date)
                .with_notes(BASELINE_NOTE);
        self.store.insert_student_with_baseline(&student, &record)?;
        info!(
            student = %student.id,
            name = %student.full_name(),
            baseline = %date,
            "student enrolled with baseline promotion"
        );
        Ok(student)
    }

    /// Record attendance. `false` when this class was already checked in.
    pub fn check_in(
        &self,
        id: &StudentId,
        class_type: ClassType,
        date: NaiveDate,
    ) -> Result<bool, TrackerError> {
        let record = AttendanceRecord::new(id.clone(), date, class_type);
        Ok(self.store.insert_attendance(&record)?)
    }

    /// Move a student to `to`, dated today.
    ///
    /// Non-standard changes go through; the warning is returned and logged.
    pub fn promote(
        &self,
        id: &StudentId,
        to: RankPosition,
        notes: Option<String>,
    ) -> Result<PromotionOutcome, TrackerError> {
        let from = self.store.student(id)?.position;
        let warning = validate_transition(from, to);
        if let Some(text) = &warning {
            warn!(student = %id, %from, %to, "{text}");
        }

        let mut record = PromotionRecord::new(id.clone(), from, to, self.today);
        if let Some(notes) = notes {
            record = record.with_notes(notes);
        }
        self.store.apply_promotion(&record)?;
        info!(student = %id, %from, %to, "promotion recorded");

        Ok(PromotionOutcome { record, warning })
    }

    pub fn archive(&self, id: &StudentId) -> Result<(), TrackerError> {
        self.store.set_active(id, false)?;
        info!(student = %id, "student archived");
        Ok(())
    }

    pub fn restore(&self, id: &StudentId) -> Result<(), TrackerError> {
        self.store.set_active(id, true)?;
        info!(student = %id, "student restored");
        Ok(())
    }

    /// Newest first.
    pub fn promotion_history(&self, id: &StudentId) -> Result<Vec<PromotionRecord>, TrackerError> {
        // Resolve the student first so an unknown id is an error, not an empty list.
        self.store.student(id)?;
        Ok(self.store.promotions(id)?)
    }
}
