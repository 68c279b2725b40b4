//! Advisory check for manually recorded rank changes.
//!
//! Standard progressions pass silently:
//! - no change at all;
//! - one more stripe on the same belt;
//! - four stripes to the next belt at zero stripes.
//!
//! Anything else yields a single combined warning listing every irregularity.
//! The warning never blocks; the caller decides whether to ask for
//! confirmation.

use crate::domain::RankPosition;

/// Return a warning for a non-standard transition, or `None` if it is standard.
pub fn validate_transition(from: RankPosition, to: RankPosition) -> Option<String> {
    if from == to {
        return None;
    }

    let from_idx = from.rank.index();
    let to_idx = to.rank.index();
    let from_stripes = from.stripes.get();
    let to_stripes = to.stripes.get();
    let same_rank = from.rank == to.rank;

    if same_rank && to_stripes == from_stripes + 1 {
        return None;
    }
    if from.stripes.is_full() && from.rank.next() == Some(to.rank) && to_stripes == 0 {
        return None;
    }

    let mut warnings: Vec<String> = Vec::new();

    if to_idx < from_idx {
        warnings.push(format!(
            "moving backwards from {} to {} belt",
            from.rank, to.rank
        ));
    }

    if to_idx > from_idx + 1 {
        let skipped: Vec<&str> = from.rank.between(to.rank).iter().map(|r| r.as_str()).collect();
        warnings.push(format!(
            "skipping {} belt{}",
            skipped.join(", "),
            plural(skipped.len())
        ));
    }

    if to_idx > from_idx && !from.stripes.is_full() {
        warnings.push(format!(
            "promoting to next belt without 4 stripes (currently at {from_stripes})"
        ));
    }

    if !same_rank && to_stripes > 0 {
        warnings.push(format!(
            "new belt starting with {} stripe{} instead of 0",
            to_stripes,
            plural(usize::from(to_stripes))
        ));
    }

    if same_rank && to_stripes > from_stripes + 1 {
        let skipped = to_stripes - from_stripes - 1;
        warnings.push(format!(
            "skipping {} stripe{}",
            skipped,
            plural(usize::from(skipped))
        ));
    }

    if same_rank && to_stripes < from_stripes {
        warnings.push(format!(
            "reducing stripes from {from_stripes} to {to_stripes}"
        ));
    }

    if warnings.is_empty() {
        return None;
    }

    Some(format!(
        "This is a non-standard promotion: {}. Are you sure?",
        warnings.join(", ")
    ))
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
