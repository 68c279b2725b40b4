//! Promotion report: roster statuses with summary counts, filtering and sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use mattrack_core::{Rank, Standing};

use crate::tracker::StudentStatus;

/// Bad report option from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportOptionError {
    #[error("unknown standing filter '{0}' (expected all, stripe-due, belt-eligible or in-progress)")]
    Standing(String),
    #[error("unknown sort key '{0}' (expected name, belt, classes, days or status)")]
    SortKey(String),
    #[error("unknown sort direction '{0}' (expected asc or desc)")]
    Direction(String),
}

// ─── Query options ─────────────────────────────────────────────────

/// Which standings to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StandingFilter {
    #[default]
    All,
    StripeDue,
    BeltEligible,
    InProgress,
}

impl StandingFilter {
    pub fn matches(self, standing: Standing) -> bool {
        match self {
            Self::All => true,
            Self::StripeDue => standing == Standing::StripeDue,
            Self::BeltEligible => standing == Standing::BeltEligible,
            Self::InProgress => standing == Standing::InProgress,
        }
    }
}

impl FromStr for StandingFilter {
    type Err = ReportOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all" => Ok(Self::All),
            "stripe-due" | "stripe" => Ok(Self::StripeDue),
            "belt-eligible" | "belt" => Ok(Self::BeltEligible),
            "in-progress" | "progress" => Ok(Self::InProgress),
            _ => Err(ReportOptionError::Standing(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Last name, then first name.
    Name,
    /// Rank, then stripes.
    Belt,
    Classes,
    Days,
    /// Belt-eligible above stripe-due above in-progress, then progress.
    #[default]
    Status,
}

impl FromStr for SortKey {
    type Err = ReportOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "belt" | "rank" => Ok(Self::Belt),
            "classes" => Ok(Self::Classes),
            "days" => Ok(Self::Days),
            "status" => Ok(Self::Status),
            _ => Err(ReportOptionError::SortKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = ReportOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ReportOptionError::Direction(s.to_string())),
        }
    }
}

/// Filter and ordering for a report view. Defaults to everyone, most urgent first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub rank: Option<Rank>,
    pub standing: StandingFilter,
    pub sort: SortKey,
    pub direction: SortDirection,
}

// ─── Report ────────────────────────────────────────────────────────

/// Headline counts over the whole roster, before filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub stripe_due: usize,
    pub belt_eligible: usize,
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} active students, {} due for a stripe, {} eligible for a belt",
            self.total, self.stripe_due, self.belt_eligible
        )
    }
}

/// Roster statuses for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromotionReport {
    rows: Vec<StudentStatus>,
}

impl PromotionReport {
    pub fn new(rows: Vec<StudentStatus>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[StudentStatus] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total: self.rows.len(),
            stripe_due: self.rows.iter().filter(|r| r.status.stripe_due).count(),
            belt_eligible: self.rows.iter().filter(|r| r.status.belt_eligible).count(),
        }
    }

    /// Rows matching `query`, in its order. Sorting is stable, so equal rows
    /// keep roster order.
    pub fn select(&self, query: &ReportQuery) -> Vec<&StudentStatus> {
        let mut out: Vec<&StudentStatus> = self
            .rows
            .iter()
            .filter(|r| query.rank.map_or(true, |rank| r.student.position.rank == rank))
            .filter(|r| query.standing.matches(r.status.standing()))
            .collect();

        out.sort_by(|a, b| {
            let ord = compare(query.sort, a, b);
            match query.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        out
    }
}

fn compare(key: SortKey, a: &StudentStatus, b: &StudentStatus) -> Ordering {
    match key {
        SortKey::Name => a.student.sort_name().cmp(&b.student.sort_name()),
        SortKey::Belt => a.student.position.cmp(&b.student.position),
        SortKey::Classes => a
            .status
            .classes_since_baseline
            .cmp(&b.status.classes_since_baseline),
        SortKey::Days => a
            .status
            .days_since_baseline
            .cmp(&b.status.days_since_baseline),
        SortKey::Status => a.status.urgency_cmp(&b.status),
    }
}
