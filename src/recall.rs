//! Point-in-time recall strength.
//!
//! Mastery is the ceiling the memory model believes the learner can reach;
//! domain is what is recallable *right now*, decaying between reviews. Both
//! numbers are exposed, both functions are pure reads.

use chrono::{DateTime, Utc};

use crate::models::StudyItem;
use crate::scheduler::MIN_STABILITY_DAYS;

/// Exponential recall decay since a review
///
/// ### Arguments
///
/// * `last_reviewed` - When the item was last reviewed
/// * `stability` - The decay constant in days; malformed values are floored
/// * `now` - The evaluation time
///
/// ### Returns
///
/// `exp(-elapsed_days / stability)` clamped to [0, 1]; equals 1 at zero
/// elapsed time and is monotonically non-increasing in elapsed time
pub fn decay(last_reviewed: DateTime<Utc>, stability: f64, now: DateTime<Utc>) -> f64 {
    let stability = if stability.is_finite() && stability > 0.0 {
        stability
    } else {
        MIN_STABILITY_DAYS
    };
    // A last-review timestamp in the future (clock skew) counts as zero elapsed
    let elapsed_days = (now - last_reviewed).num_milliseconds().max(0) as f64 / 86_400_000.0;
    (-elapsed_days / stability).exp().clamp(0.0, 1.0)
}

/// Current recall probability of an item
///
/// ### Arguments
///
/// * `item` - The item to evaluate
/// * `now` - The evaluation time
///
/// ### Returns
///
/// A value in [0, 1]; 0 for never-reviewed items
pub fn retrievability(item: &StudyItem, now: DateTime<Utc>) -> f64 {
    match item.get_last_reviewed_at() {
        Some(last) => decay(last, item.get_stability(), now),
        None => 0.0,
    }
}

/// Current domain of an item: mastery discounted by recall strength
///
/// ### Arguments
///
/// * `item` - The item to evaluate
/// * `now` - The evaluation time
///
/// ### Returns
///
/// A value in [0, 100], never exceeding the item's mastery score; 0 for
/// never-attempted items
pub fn current_domain(item: &StudyItem, now: DateTime<Utc>) -> f64 {
    if !item.has_attempts() {
        return 0.0;
    }
    let mastery = item.get_mastery_score();
    let mastery = if mastery.is_finite() {
        mastery.clamp(0.0, 100.0)
    } else {
        0.0
    };
    mastery * retrievability(item, now)
}
