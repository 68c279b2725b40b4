//! Database schema definitions

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use mattrack_core::StoreError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        conn.execute_batch(ROSTER_SCHEMA)
            .map_err(|e| StoreError::Backend(format!("Failed to create tables: {e}")))?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(StoreError::Backend(format!(
            "database schema v{current_version} is newer than supported v{SCHEMA_VERSION}"
        )));
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| StoreError::Backend(format!("Failed to create schema_version table: {e}")))?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| StoreError::Backend(format!("Failed to read schema_version: {e}")))?
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| StoreError::Backend(format!("Failed to clear schema_version: {e}")))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| StoreError::Backend(format!("Failed to set schema_version: {e}")))?;
    Ok(())
}

/// Students, attendance, promotions and settings.
///
/// Dates are `YYYY-MM-DD` text so that string comparison is date comparison.
/// Timestamps are RFC 3339 text.
const ROSTER_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    start_date TEXT NOT NULL,
    current_belt TEXT NOT NULL DEFAULT 'white',
    current_stripes INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attendance (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL REFERENCES students(id),
    date TEXT NOT NULL,
    class_type TEXT NOT NULL DEFAULT 'gi',
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_slot
    ON attendance(student_id, date, class_type);

CREATE TABLE IF NOT EXISTS promotions (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL REFERENCES students(id),
    from_belt TEXT NOT NULL,
    from_stripes INTEGER NOT NULL,
    to_belt TEXT NOT NULL,
    to_stripes INTEGER NOT NULL,
    promoted_at TEXT NOT NULL,
    notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_promotions_student
    ON promotions(student_id, promoted_at);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
