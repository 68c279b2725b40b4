//! Promotion status calculator.
//!
//! Given a student's rank position, the classes attended and days elapsed since
//! their baseline date, and the threshold tables, decide whether a stripe is due
//! or the next belt is within reach, and how far along they are.
//!
//! Decision rules:
//! - Below four stripes the student works toward a stripe; the stripe table
//!   for their rank applies.
//! - At four stripes the student works toward the next belt; the belt table
//!   applies. Black has no next belt, so there is no threshold at all.
//! - Progress is `round(100 * classes / threshold)` rounded half away from zero
//!   and clamped to `[0, 100]`; with no threshold it is reported as 100.
//!
//! Days since the baseline are carried for display only and never influence
//! the decision. The calculator is total: every well-typed input has a result.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::RankPosition;
use crate::thresholds::ThresholdConfig;

/// The class count the student is working toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextThreshold {
    /// Classes required for the next stripe or belt.
    Threshold(i64),
    /// Nothing further to work toward (black belt, four stripes).
    NoThreshold,
}

impl NextThreshold {
    pub fn classes(self) -> Option<i64> {
        match self {
            Self::Threshold(n) => Some(n),
            Self::NoThreshold => None,
        }
    }

    /// True when a threshold exists and `classes` meets it.
    pub fn is_met_by(self, classes: u32) -> bool {
        match self {
            Self::Threshold(n) => i64::from(classes) >= n,
            Self::NoThreshold => false,
        }
    }
}

impl fmt::Display for NextThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threshold(n) => write!(f, "{n}"),
            Self::NoThreshold => f.write_str("none"),
        }
    }
}

/// Where a student stands relative to their next milestone.
///
/// Ordered from least to most urgent, which is the report's status order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Standing {
    InProgress,
    StripeDue,
    BeltEligible,
}

impl Standing {
    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In progress",
            Self::StripeDue => "Due for stripe",
            Self::BeltEligible => "Eligible for belt",
        }
    }
}

/// Result of the calculation for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionStatus {
    pub classes_since_baseline: u32,
    pub days_since_baseline: i64,
    pub baseline_date: NaiveDate,
    pub stripe_due: bool,
    pub belt_eligible: bool,
    /// Percent toward `next_threshold`, 0–100.
    pub progress: u8,
    pub next_threshold: NextThreshold,
    /// True while working toward a stripe; false when working toward a belt.
    pub is_stripe_transition: bool,
}

impl PromotionStatus {
    pub fn standing(&self) -> Standing {
        if self.belt_eligible {
            Standing::BeltEligible
        } else if self.stripe_due {
            Standing::StripeDue
        } else {
            Standing::InProgress
        }
    }

    /// Orders by standing, then by progress. Used for "most urgent first" views.
    pub fn urgency_cmp(&self, other: &Self) -> Ordering {
        self.standing()
            .cmp(&other.standing())
            .then(self.progress.cmp(&other.progress))
    }
}

/// Compute the promotion status for one student.
pub fn compute_status(
    position: RankPosition,
    classes_since_baseline: u32,
    days_since_baseline: i64,
    baseline_date: NaiveDate,
    thresholds: &ThresholdConfig,
) -> PromotionStatus {
    let rank = position.rank;
    let is_stripe_transition = !position.stripes.is_full();

    let next_threshold = if is_stripe_transition {
        NextThreshold::Threshold(thresholds.stripe_thresholds.get(rank))
    } else {
        match thresholds.belt_thresholds.get(rank) {
            Some(n) => NextThreshold::Threshold(n),
            None => NextThreshold::NoThreshold,
        }
    };

    let met = next_threshold.is_met_by(classes_since_baseline);
    let stripe_due = is_stripe_transition && met;
    let belt_eligible = !is_stripe_transition && !rank.is_terminal() && met;

    PromotionStatus {
        classes_since_baseline,
        days_since_baseline,
        baseline_date,
        stripe_due,
        belt_eligible,
        progress: progress_percent(classes_since_baseline, next_threshold),
        next_threshold,
        is_stripe_transition,
    }
}

/// Percent of `next` covered by `classes`, rounded half away from zero and
/// clamped to `[0, 100]`.
///
/// `NoThreshold` reports 100. A zero threshold is already met and reports 100;
/// a negative one reports 0.
pub fn progress_percent(classes: u32, next: NextThreshold) -> u8 {
    let threshold = match next {
        NextThreshold::NoThreshold => return 100,
        NextThreshold::Threshold(n) => n,
    };
    match threshold.cmp(&0) {
        Ordering::Equal => 100,
        Ordering::Less => 0,
        Ordering::Greater => {
            let classes = i64::from(classes);
            if classes >= threshold {
                return 100;
            }
            // Integer form of round(100c/t) for c >= 0, t > 0: floor((200c + t) / 2t).
            // Widened so that thresholds near i64::MAX cannot overflow.
            let (c, t) = (i128::from(classes), i128::from(threshold));
            let pct = (200 * c + t) / (2 * t);
            pct.min(100) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rank;

    fn pos(rank: Rank, stripes: u8) -> RankPosition {
        RankPosition::new(rank, stripes).unwrap()
    }

    fn baseline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn status(rank: Rank, stripes: u8, classes: u32) -> PromotionStatus {
        compute_status(
            pos(rank, stripes),
            classes,
            30,
            baseline(),
            &ThresholdConfig::default(),
        )
    }

    #[test]
    fn below_stripe_threshold() {
        let s = status(Rank::White, 0, 10);
        assert!(!s.stripe_due);
        assert!(!s.belt_eligible);
        assert!(s.is_stripe_transition);
        assert_eq!(s.next_threshold, NextThreshold::Threshold(25));
        assert_eq!(s.progress, 40);
        assert_eq!(s.standing(), Standing::InProgress);
    }

    #[test]
    fn stripe_due_at_threshold() {
        let s = status(Rank::White, 0, 25);
        assert!(s.stripe_due);
        assert!(!s.belt_eligible);
        assert_eq!(s.progress, 100);
        assert_eq!(s.standing(), Standing::StripeDue);
    }

    #[test]
    fn progress_caps_at_100_above_threshold() {
        let s = status(Rank::Blue, 2, 70);
        assert!(s.stripe_due);
        assert_eq!(s.next_threshold, NextThreshold::Threshold(40));
        assert_eq!(s.progress, 100);
    }

    #[test]
    fn rank_specific_stripe_threshold() {
        let s = status(Rank::Purple, 1, 48);
        assert!(!s.stripe_due);
        assert_eq!(s.next_threshold, NextThreshold::Threshold(50));
        assert_eq!(s.progress, 96);
    }

    #[test]
    fn four_stripes_uses_belt_threshold() {
        let s = status(Rank::Brown, 4, 120);
        assert!(!s.is_stripe_transition);
        assert!(!s.stripe_due);
        assert!(!s.belt_eligible);
        assert_eq!(s.next_threshold, NextThreshold::Threshold(150));
        assert_eq!(s.progress, 80);

        let s = status(Rank::Brown, 4, 150);
        assert!(s.belt_eligible);
        assert_eq!(s.standing(), Standing::BeltEligible);
    }

    #[test]
    fn black_belt_stripes_work_normally() {
        let s = status(Rank::Black, 1, 80);
        assert!(s.is_stripe_transition);
        assert_eq!(s.next_threshold, NextThreshold::Threshold(100));
        assert!(!s.stripe_due);
        assert_eq!(s.progress, 80);
    }

    #[test]
    fn black_belt_at_four_stripes_has_nothing_next() {
        let s = status(Rank::Black, 4, 1000);
        assert!(!s.belt_eligible);
        assert!(!s.stripe_due);
        assert_eq!(s.next_threshold, NextThreshold::NoThreshold);
        assert_eq!(s.progress, 100);
    }

    #[test]
    fn days_and_baseline_pass_through() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let s = compute_status(pos(Rank::Blue, 2), 15, 120, date, &ThresholdConfig::default());
        assert_eq!(s.days_since_baseline, 120);
        assert_eq!(s.baseline_date, date);
        assert_eq!(s.classes_since_baseline, 15);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        // 199 / 200 = 99.5%
        assert_eq!(progress_percent(199, NextThreshold::Threshold(200)), 100);
        // 1 / 8 = 12.5%
        assert_eq!(progress_percent(1, NextThreshold::Threshold(8)), 13);
        // 1 / 3 = 33.3%
        assert_eq!(progress_percent(1, NextThreshold::Threshold(3)), 33);
        // 2 / 3 = 66.7%
        assert_eq!(progress_percent(2, NextThreshold::Threshold(3)), 67);
    }

    #[test]
    fn zero_threshold_is_immediately_due() {
        let mut t = ThresholdConfig::default();
        t.stripe_thresholds.set(Rank::White, 0);
        let s = compute_status(pos(Rank::White, 0), 0, 0, baseline(), &t);
        assert!(s.stripe_due);
        assert_eq!(s.progress, 100);
    }

    #[test]
    fn negative_threshold_is_due_with_zero_progress() {
        let mut t = ThresholdConfig::default();
        t.belt_thresholds.set(Rank::Blue, -3).unwrap();
        let s = compute_status(pos(Rank::Blue, 4), 5, 0, baseline(), &t);
        assert!(s.belt_eligible);
        assert_eq!(s.progress, 0);
    }

    #[test]
    fn huge_threshold_is_far_away() {
        assert_eq!(progress_percent(10, NextThreshold::Threshold(i64::MAX)), 0);
        assert_eq!(progress_percent(10, NextThreshold::Threshold(i64::MAX / 2 + 1)), 0);
        assert_eq!(progress_percent(u32::MAX, NextThreshold::Threshold(i64::MAX)), 0);

        let t = ThresholdConfig::from_json(r#"{"stripeThresholds":{"white":9223372036854775807}}"#)
            .unwrap();
        let s = compute_status(pos(Rank::White, 0), 10, 5, baseline(), &t);
        assert!(!s.stripe_due);
        assert_eq!(s.progress, 0);
        assert_eq!(s.next_threshold, NextThreshold::Threshold(i64::MAX));
    }

    #[test]
    fn zero_classes_means_zero_progress() {
        let s = status(Rank::Purple, 3, 0);
        assert_eq!(s.progress, 0);
        assert!(!s.stripe_due);
    }

    #[test]
    fn urgency_orders_by_standing_then_progress() {
        let eligible = status(Rank::White, 4, 200);
        let due = status(Rank::White, 1, 30);
        let near = status(Rank::White, 1, 20);
        let far = status(Rank::White, 1, 5);
        assert_eq!(eligible.urgency_cmp(&due), Ordering::Greater);
        assert_eq!(due.urgency_cmp(&near), Ordering::Greater);
        assert_eq!(far.urgency_cmp(&near), Ordering::Less);
    }
}
