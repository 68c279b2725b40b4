//! Attendance aggregator.

use chrono::NaiveDate;

use mattrack_core::{RosterStore, StoreError, StudentId};

/// Classes attended on or after `since`. Every class type counts.
pub fn count_attendance_since<S>(
    store: &S,
    id: &StudentId,
    since: NaiveDate,
) -> Result<u32, StoreError>
where
    S: RosterStore + ?Sized,
{
    store.count_attendance_on_or_after(id, since)
}
