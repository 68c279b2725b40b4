//! Time at the current belt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How long a student has held their current belt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeltTenure {
    /// Date of the last belt change, or enrollment.
    pub since: NaiveDate,
    pub days: i64,
}

impl BeltTenure {
    pub fn new(since: NaiveDate, today: NaiveDate) -> Self {
        Self {
            since,
            days: (today - since).num_days(),
        }
    }

    pub fn describe(&self) -> String {
        format_tenure(self.days)
    }
}

/// Compact duration: "15 days", "6 months", "2y", "1y 3mo".
///
/// Months are 30-day blocks; years are twelve of those blocks.
pub fn format_tenure(days: i64) -> String {
    let days = days.max(0);
    if days < 30 {
        return format!("{} day{}", days, if days == 1 { "" } else { "s" });
    }
    let months = days / 30;
    if days < 365 {
        return format!("{} month{}", months, if months == 1 { "" } else { "s" });
    }
    let years = months / 12;
    let rem = months % 12;
    if rem == 0 {
        format!("{years}y")
    } else {
        format!("{years}y {rem}mo")
    }
}
