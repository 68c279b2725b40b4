//! Storage adapters for the mat tracker.
//!
//! - [`MemoryStore`]: volatile, for tests and embedding
//! - [`SqliteStore`]: the on-disk roster database used by the CLI

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
