//! Mat Tracker Core: domain types and the promotion eligibility rules.
//!
//! This crate is pure: no I/O, no clock. It provides:
//! - Domain types (ranks, stripes, students, attendance, promotion records)
//! - Threshold tables with their defaults and JSON shape
//! - The promotion status calculator
//! - Belt tenure formatting
//! - The advisory rank-change validator
//! - Storage ports implemented by `mattrack-store`

pub mod domain;
pub mod status;
pub mod store;
pub mod tenure;
pub mod thresholds;
pub mod validation;

pub use domain::{
    AttendanceRecord, ClassType, DomainError, PromotionRecord, Rank, RankPosition, Stripes,
    Student, StudentId,
};
pub use status::{compute_status, progress_percent, NextThreshold, PromotionStatus, Standing};
pub use store::{RosterStore, RosterWriter, SettingsStore, StoreError};
pub use tenure::{format_tenure, BeltTenure};
pub use thresholds::{BeltThresholds, StripeThresholds, ThresholdConfig, ThresholdKind};
pub use validation::validate_transition;
