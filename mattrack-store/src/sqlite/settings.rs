//! `settings` table queries.

use rusqlite::{params, Connection, OptionalExtension};

use mattrack_core::StoreError;

use super::backend;

pub(super) fn read(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
    .map_err(backend("read setting"))
}

pub(super) fn write(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(backend("write setting"))?;
    Ok(())
}
