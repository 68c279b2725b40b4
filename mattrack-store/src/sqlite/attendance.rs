//! `attendance` table queries.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use mattrack_core::{AttendanceRecord, StoreError, StudentId};

use super::{backend, format_date};

/// `INSERT OR IGNORE` against the slot index; `false` means the slot was taken.
pub(super) fn insert(conn: &Connection, record: &AttendanceRecord) -> Result<bool, StoreError> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO attendance (id, student_id, date, class_type, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.0,
                record.student_id.as_str(),
                format_date(record.date),
                record.class_type.as_str(),
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(backend("insert attendance"))?;
    Ok(changed > 0)
}

pub(super) fn count_since(
    conn: &Connection,
    id: &StudentId,
    since: NaiveDate,
) -> Result<u32, StoreError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM attendance WHERE student_id = ?1 AND date >= ?2",
            params![id.as_str(), format_date(since)],
            |row| row.get(0),
        )
        .map_err(backend("count attendance"))?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}
