//! Mat Tracker Runner: eligibility over a store.
//!
//! This crate builds on `mattrack-core` to provide:
//! - Threshold persistence with default fallback
//! - Baseline resolution from promotion history
//! - Attendance aggregation since the baseline
//! - The promotion tracker (per-student and roster-wide status, write paths)
//! - Promotion reports with filtering, sorting and CSV/Markdown/JSON export

pub mod attendance;
pub mod baseline;
pub mod export;
pub mod report;
pub mod settings;
pub mod tracker;

pub use attendance::count_attendance_since;
pub use baseline::{baseline_date, belt_baseline_date, days_between};
pub use export::{export_csv, export_json, generate_markdown};
pub use report::{
    PromotionReport, ReportOptionError, ReportQuery, ReportSummary, SortDirection, SortKey,
    StandingFilter,
};
pub use settings::{load_thresholds, save_thresholds, THRESHOLDS_KEY};
pub use tracker::{
    PromotionOutcome, PromotionTracker, StudentStatus, TrackerError, BASELINE_NOTE,
};
