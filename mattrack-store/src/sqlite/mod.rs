//! SQLite roster database.
//!
//! ## Tables
//!
//! - `students` - Roster with current belt and stripes
//! - `attendance` - One row per check-in, unique per (student, date, class type)
//! - `promotions` - Append-only rank change history
//! - `settings` - Key/value records (threshold configuration lives here)
//!
//! Dates are stored as `YYYY-MM-DD` text. Rows that fail to convert back into
//! domain values surface as [`StoreError::Corrupt`].

pub mod schema;

mod attendance;
mod promotions;
mod settings;
mod students;

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{debug, info};

use mattrack_core::{
    AttendanceRecord, PromotionRecord, RosterStore, RosterWriter, SettingsStore, StoreError,
    Student, StudentId,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistent store over a single SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the roster database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Backend(format!("Failed to open SQLite: {e}")))?;

        // WAL keeps readers unblocked while a check-in is written
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| StoreError::Backend(format!("Failed to set PRAGMA: {e}")))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Backend(format!("Failed to open in-memory SQLite: {e}")))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| StoreError::Backend(format!("Failed to set PRAGMA: {e}")))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.with_conn(schema::init_schema)
    }

    /// Run `f` with shared access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Backend(format!("Lock poisoned: {e}")))?;
        f(&conn)
    }

    /// Run `f` with exclusive access (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Backend(format!("Lock poisoned: {e}")))?;
        f(&mut conn)
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

// ─── Row helpers ──────────────────────────────────────────────────

/// Maps a rusqlite failure to a backend error tagged with the operation.
fn backend(what: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |e| StoreError::Backend(format!("{what} failed: {e}"))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(table: &'static str, raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| StoreError::Corrupt {
        table,
        reason: format!("bad date '{raw}': {e}"),
    })
}

fn corrupt(table: &'static str) -> impl Fn(mattrack_core::DomainError) -> StoreError {
    move |e| StoreError::Corrupt {
        table,
        reason: e.to_string(),
    }
}

// ─── Trait impls ──────────────────────────────────────────────────

impl SettingsStore for SqliteStore {
    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| settings::read(conn, key))
    }

    fn write_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| settings::write(conn, key, value))
    }
}

impl RosterStore for SqliteStore {
    fn student(&self, id: &StudentId) -> Result<Student, StoreError> {
        self.with_conn(|conn| {
            students::get(conn, id)?.ok_or_else(|| StoreError::UnknownStudent(id.clone()))
        })
    }

    fn students(&self, include_archived: bool) -> Result<Vec<Student>, StoreError> {
        self.with_conn(|conn| students::list(conn, include_archived))
    }

    fn promotions(&self, id: &StudentId) -> Result<Vec<PromotionRecord>, StoreError> {
        self.with_conn(|conn| promotions::for_student(conn, id, None))
    }

    fn latest_promotion(&self, id: &StudentId) -> Result<Option<PromotionRecord>, StoreError> {
        self.with_conn(|conn| Ok(promotions::for_student(conn, id, Some(1))?.into_iter().next()))
    }

    fn count_attendance_on_or_after(
        &self,
        id: &StudentId,
        since: NaiveDate,
    ) -> Result<u32, StoreError> {
        self.with_conn(|conn| attendance::count_since(conn, id, since))
    }
}

impl RosterWriter for SqliteStore {
    fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        self.with_conn(|conn| students::insert(conn, student))
    }

    fn insert_student_with_baseline(
        &self,
        student: &Student,
        baseline: &PromotionRecord,
    ) -> Result<(), StoreError> {
        if baseline.student_id != student.id {
            return Err(StoreError::UnknownStudent(baseline.student_id.clone()));
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction().map_err(backend("begin transaction"))?;
            students::insert(&tx, student)?;
            promotions::insert(&tx, baseline)?;
            tx.commit().map_err(backend("commit enrollment"))
        })
    }

    fn insert_attendance(&self, record: &AttendanceRecord) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            if !students::exists(conn, &record.student_id)? {
                return Err(StoreError::UnknownStudent(record.student_id.clone()));
            }
            let inserted = attendance::insert(conn, record)?;
            if !inserted {
                debug!(student = %record.student_id, date = %record.date, "duplicate check-in ignored");
            }
            Ok(inserted)
        })
    }

    fn apply_promotion(&self, record: &PromotionRecord) -> Result<(), StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction().map_err(backend("begin transaction"))?;
            if !students::set_position(&tx, &record.student_id, record.to)? {
                // Dropping the transaction rolls it back.
                return Err(StoreError::UnknownStudent(record.student_id.clone()));
            }
            promotions::insert(&tx, record)?;
            tx.commit().map_err(backend("commit promotion"))
        })
    }

    fn set_active(&self, id: &StudentId, active: bool) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            if students::set_active(conn, id, active)? {
                Ok(())
            } else {
                Err(StoreError::UnknownStudent(id.clone()))
            }
        })
    }
}
