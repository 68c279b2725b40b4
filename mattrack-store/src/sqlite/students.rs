//! `students` table queries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use mattrack_core::{Rank, RankPosition, StoreError, Student, StudentId};

use super::{backend, corrupt, format_date, parse_date};

const TABLE: &str = "students";

const COLUMNS: &str = "id, first_name, last_name, email, phone, start_date, \
                       current_belt, current_stripes, is_active";

/// Raw row before conversion into a [`Student`].
struct StudentRow {
    id: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    start_date: String,
    current_belt: String,
    current_stripes: i64,
    is_active: bool,
}

impl StudentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            start_date: row.get(5)?,
            current_belt: row.get(6)?,
            current_stripes: row.get(7)?,
            is_active: row.get(8)?,
        })
    }

    fn into_student(self) -> Result<Student, StoreError> {
        let rank: Rank = self.current_belt.parse().map_err(corrupt(TABLE))?;
        let stripes = u8::try_from(self.current_stripes).map_err(|_| StoreError::Corrupt {
            table: TABLE,
            reason: format!("stripe count {} out of range", self.current_stripes),
        })?;
        Ok(Student {
            id: StudentId::new(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            start_date: parse_date(TABLE, &self.start_date)?,
            position: RankPosition::new(rank, stripes).map_err(corrupt(TABLE))?,
            is_active: self.is_active,
        })
    }
}

pub(super) fn get(conn: &Connection, id: &StudentId) -> Result<Option<Student>, StoreError> {
    let sql = format!("SELECT {COLUMNS} FROM students WHERE id = ?1");
    conn.query_row(&sql, [id.as_str()], StudentRow::from_row)
        .optional()
        .map_err(backend("load student"))?
        .map(StudentRow::into_student)
        .transpose()
}

pub(super) fn exists(conn: &Connection, id: &StudentId) -> Result<bool, StoreError> {
    conn.query_row(
        "SELECT 1 FROM students WHERE id = ?1",
        [id.as_str()],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(backend("look up student"))
}

pub(super) fn list(conn: &Connection, include_archived: bool) -> Result<Vec<Student>, StoreError> {
    let filter = if include_archived { "" } else { "WHERE is_active = 1" };
    let sql = format!(
        "SELECT {COLUMNS} FROM students {filter} \
         ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE"
    );
    let mut stmt = conn.prepare(&sql).map_err(backend("prepare roster"))?;
    let rows = stmt
        .query_map([], StudentRow::from_row)
        .map_err(backend("query roster"))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(backend("read roster"))?;
    rows.into_iter().map(StudentRow::into_student).collect()
}

pub(super) fn insert(conn: &Connection, student: &Student) -> Result<(), StoreError> {
    if exists(conn, &student.id)? {
        return Err(StoreError::DuplicateStudent(student.id.clone()));
    }
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO students (id, first_name, last_name, email, phone, start_date, \
         current_belt, current_stripes, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            student.id.as_str(),
            student.first_name,
            student.last_name,
            student.email,
            student.phone,
            format_date(student.start_date),
            student.position.rank.as_str(),
            student.position.stripes.get(),
            student.is_active,
            now,
        ],
    )
    .map_err(backend("insert student"))?;
    Ok(())
}

/// Returns `false` when no such student exists.
pub(super) fn set_position(
    conn: &Connection,
    id: &StudentId,
    position: RankPosition,
) -> Result<bool, StoreError> {
    let changed = conn
        .execute(
            "UPDATE students SET current_belt = ?2, current_stripes = ?3, updated_at = ?4 \
             WHERE id = ?1",
            params![
                id.as_str(),
                position.rank.as_str(),
                position.stripes.get(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(backend("update student rank"))?;
    Ok(changed > 0)
}

/// Returns `false` when no such student exists.
pub(super) fn set_active(conn: &Connection, id: &StudentId, active: bool) -> Result<bool, StoreError> {
    let changed = conn
        .execute(
            "UPDATE students SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.as_str(), active, Utc::now().to_rfc3339()],
        )
        .map_err(backend("update student status"))?;
    Ok(changed > 0)
}
