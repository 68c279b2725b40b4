//! `promotions` table queries.

use rusqlite::{params, Connection, Row};

use mattrack_core::domain::PromotionId;
use mattrack_core::{PromotionRecord, Rank, RankPosition, StoreError, StudentId};

use super::{backend, corrupt, format_date, parse_date};

const TABLE: &str = "promotions";

struct PromotionRow {
    id: String,
    student_id: String,
    from_belt: String,
    from_stripes: i64,
    to_belt: String,
    to_stripes: i64,
    promoted_at: String,
    notes: Option<String>,
}

impl PromotionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            student_id: row.get(1)?,
            from_belt: row.get(2)?,
            from_stripes: row.get(3)?,
            to_belt: row.get(4)?,
            to_stripes: row.get(5)?,
            promoted_at: row.get(6)?,
            notes: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<PromotionRecord, StoreError> {
        Ok(PromotionRecord {
            id: PromotionId::new(self.id),
            student_id: StudentId::new(self.student_id),
            from: position(&self.from_belt, self.from_stripes)?,
            to: position(&self.to_belt, self.to_stripes)?,
            promoted_at: parse_date(TABLE, &self.promoted_at)?,
            notes: self.notes,
        })
    }
}

fn position(belt: &str, stripes: i64) -> Result<RankPosition, StoreError> {
    let rank: Rank = belt.parse().map_err(corrupt(TABLE))?;
    let stripes = u8::try_from(stripes).map_err(|_| StoreError::Corrupt {
        table: TABLE,
        reason: format!("stripe count {stripes} out of range"),
    })?;
    RankPosition::new(rank, stripes).map_err(corrupt(TABLE))
}

/// Newest first; rowid breaks same-day ties so the last insert wins.
pub(super) fn for_student(
    conn: &Connection,
    id: &StudentId,
    limit: Option<u32>,
) -> Result<Vec<PromotionRecord>, StoreError> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let mut stmt = conn
        .prepare(
            "SELECT id, student_id, from_belt, from_stripes, to_belt, to_stripes, promoted_at, notes \
             FROM promotions WHERE student_id = ?1 \
             ORDER BY promoted_at DESC, rowid DESC LIMIT ?2",
        )
        .map_err(backend("prepare promotions"))?;
    let rows = stmt
        .query_map(params![id.as_str(), limit], PromotionRow::from_row)
        .map_err(backend("query promotions"))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(backend("read promotions"))?;
    rows.into_iter().map(PromotionRow::into_record).collect()
}

pub(super) fn insert(conn: &Connection, record: &PromotionRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO promotions (id, student_id, from_belt, from_stripes, to_belt, to_stripes, \
         promoted_at, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id.0,
            record.student_id.as_str(),
            record.from.rank.as_str(),
            record.from.stripes.get(),
            record.to.rank.as_str(),
            record.to.stripes.get(),
            format_date(record.promoted_at),
            record.notes,
        ],
    )
    .map_err(backend("insert promotion"))?;
    Ok(())
}
