//! Promotion history resolver.
//!
//! A student's progress baseline is the date of their most recent promotion
//! (stripe or belt), or their enrollment date if they have never been promoted.
//! Belt tenure uses a second baseline: the most recent promotion that changed
//! the belt itself.

use chrono::NaiveDate;

use mattrack_core::{RosterStore, StoreError, StudentId};

/// Date of the latest promotion, else the enrollment date.
pub fn baseline_date<S>(store: &S, id: &StudentId) -> Result<NaiveDate, StoreError>
where
    S: RosterStore + ?Sized,
{
    match store.latest_promotion(id)? {
        Some(record) => Ok(record.promoted_at),
        None => store.enrollment_date(id),
    }
}

/// Date the current belt was awarded, else the enrollment date.
pub fn belt_baseline_date<S>(store: &S, id: &StudentId) -> Result<NaiveDate, StoreError>
where
    S: RosterStore + ?Sized,
{
    match store.latest_rank_change(id)? {
        Some(record) => Ok(record.promoted_at),
        None => store.enrollment_date(id),
    }
}

/// Whole days from `from` to `to`. Negative if `from` is in the future.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
