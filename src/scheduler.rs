//! The per-item memory-state update.
//!
//! `update` is a pure function from (item state, review outcome, clock,
//! configuration) to the item's next progress state. It performs no I/O and
//! never mutates its inputs; applying the result to the item is the store's
//! job. Because two reviews of the same item do not commute, callers must
//! serialize updates per item.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SrsConfig;
use crate::models::{Rating, StudyItem};
use crate::recall;

/// Difficulty increase after an incorrect answer
const DIFFICULTY_STEP: f64 = 0.15;

/// Difficulty nudge for correct answers rated hard (up) or easy (down)
const DIFFICULTY_NUDGE: f64 = 0.05;

/// Hard floor on stability in days; failures never push an item below this
pub const MIN_STABILITY_DAYS: f64 = 0.5;

/// Mastery floor granted by a first-ever correct attempt
const FIRST_CORRECT_MASTERY_FLOOR: f64 = 5.0;

/// How strongly difficulty suppresses mastery at equal stability
const DIFFICULTY_MASTERY_WEIGHT: f64 = 0.3;

/// Response-time bounds for the informational timing classification
const RUSH_SECS: f64 = 5.0;
const SLOW_SECS: f64 = 60.0;

/// Informational classification of how long the answer took
///
/// Does not affect the numeric update in any way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingClass {
    /// Answered suspiciously fast (under 5 seconds)
    Rush,
    /// Normal response time
    Ok,
    /// Answered very slowly (over 60 seconds)
    Slow,
}

/// The computed outcome of a review: the item's next progress state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// New stability in days, in (0, cap]
    pub stability: f64,
    /// New difficulty in [0, 1]
    pub difficulty: f64,
    /// New mastery score in [0, 100]
    pub mastery_score: f64,
    /// When the item is next due
    pub next_review_at: DateTime<Utc>,
    /// The review time, recorded as the item's last review
    pub last_reviewed_at: DateTime<Utc>,
    /// Informational timing classification
    pub timing: TimingClass,
}

/// Clamps a stored stability into usable shape
///
/// A single corrupted item (NaN, zero or negative stability from a bad
/// import) must not poison every statistic downstream, so malformed values
/// are replaced by the configured initial stability instead of propagating.
fn sanitize_stability(stability: f64, config: &SrsConfig) -> f64 {
    if stability.is_finite() && stability > 0.0 {
        stability.min(config.stability_cap_days)
    } else {
        config.initial_stability_days
    }
}

/// Clamps a stored difficulty into [0, 1], defaulting malformed values
fn sanitize_difficulty(difficulty: f64) -> f64 {
    if difficulty.is_finite() {
        difficulty.clamp(0.0, 1.0)
    } else {
        0.3
    }
}

/// Derives mastery from stability on a logarithmic scale
///
/// Doublings of stability yield diminishing mastery gains; higher difficulty
/// suppresses mastery even at equal stability. The result is clamped to
/// [0, 100].
///
/// ### Arguments
///
/// * `stability` - The item's stability in days
/// * `difficulty` - The item's difficulty in [0, 1]
/// * `cap` - The configured stability cap in days
///
/// ### Returns
///
/// The mastery score in [0, 100]; an item at the stability cap with zero
/// difficulty scores 100
pub fn mastery_from_stability(stability: f64, difficulty: f64, cap: f64) -> f64 {
    let base = 100.0 * (1.0 + stability.max(0.0)).ln() / (1.0 + cap).ln();
    let suppressed = base * (1.0 - DIFFICULTY_MASTERY_WEIGHT * difficulty.clamp(0.0, 1.0));
    suppressed.clamp(0.0, 100.0)
}

/// Classifies the response time
fn classify_timing(response_secs: f64) -> TimingClass {
    if response_secs < RUSH_SECS {
        TimingClass::Rush
    } else if response_secs > SLOW_SECS {
        TimingClass::Slow
    } else {
        // NaN response times land here and stay harmless
        TimingClass::Ok
    }
}

/// Growth rate for a correct answer at the given rating
///
/// A correct answer rated "again" is contradictory input; it falls back to
/// the hard-rating growth rate rather than erroring.
fn alpha_for(rating: Rating, config: &SrsConfig) -> f64 {
    match rating {
        Rating::Again | Rating::Hard => config.alpha_hard,
        Rating::Good => config.alpha_good,
        Rating::Easy => config.alpha_easy,
    }
}

/// Computes an item's next memory state from one review outcome
///
/// Pure: same inputs always produce the same output, and the item itself is
/// not touched.
///
/// ### Arguments
///
/// * `item` - The item being reviewed, in its pre-review state
/// * `was_correct` - Whether the answer was correct
/// * `rating` - The 0-3 rating given during the review
/// * `response_secs` - How long the answer took, in seconds
/// * `now` - The review time
/// * `config` - The scheduler parameters
///
/// ### Returns
///
/// The item's next progress state; stability ends in (0, cap], difficulty in
/// [0, 1] and mastery in [0, 100] regardless of how malformed the input
/// state was
pub fn update(
    item: &StudyItem,
    was_correct: bool,
    rating: Rating,
    response_secs: f64,
    now: DateTime<Utc>,
    config: &SrsConfig,
) -> ReviewState {
    let stability = sanitize_stability(item.get_stability(), config);
    let difficulty = sanitize_difficulty(item.get_difficulty());

    // Current recall strength; 0 for a never-reviewed item
    let retrievability = match item.get_last_reviewed_at() {
        Some(last) => recall::decay(last, stability, now),
        None => 0.0,
    };

    let (new_stability, new_difficulty) = if was_correct {
        let new_difficulty = match rating {
            Rating::Hard => (difficulty + DIFFICULTY_NUDGE).min(1.0),
            Rating::Easy => (difficulty - DIFFICULTY_NUDGE).max(0.0),
            _ => difficulty,
        };
        // Harder-won successes are rewarded more: low retrievability or high
        // difficulty both enlarge the stability jump.
        let gain = alpha_for(rating, config)
            * (1.0 + (1.0 - retrievability) * 2.0)
            * (1.0 + (1.0 - new_difficulty));
        let time_bonus = if response_secs.is_finite()
            && response_secs >= 0.0
            && response_secs < config.expected_response_secs / 2.0
        {
            config.time_bonus
        } else {
            1.0
        };
        (stability * (1.0 + gain * time_bonus), new_difficulty)
    } else {
        (
            stability * config.failure_decay,
            (difficulty + DIFFICULTY_STEP).min(1.0),
        )
    };

    let new_stability = new_stability.clamp(MIN_STABILITY_DAYS, config.stability_cap_days);

    let mut mastery = mastery_from_stability(new_stability, new_difficulty, config.stability_cap_days);
    // The positive floor applies only to a correct first attempt; a first
    // failure keeps whatever residual mastery the formula assigns it.
    if item.get_total_attempts() == 0 && was_correct {
        mastery = mastery.max(FIRST_CORRECT_MASTERY_FLOOR);
    }

    let next_review_at = now + Duration::milliseconds((new_stability * 86_400_000.0) as i64);

    ReviewState {
        stability: new_stability,
        difficulty: new_difficulty,
        mastery_score: mastery,
        next_review_at,
        last_reviewed_at: now,
        timing: classify_timing(response_secs),
    }
}

#[cfg(test)]
mod prop_tests;
