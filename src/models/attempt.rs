use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The rating given to a review, from "again" (complete failure) to "easy"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Could not recall at all
    Again,
    /// Recalled with significant effort
    Hard,
    /// Recalled normally
    Good,
    /// Recalled without effort
    Easy,
}

impl Rating {
    /// Parses a numeric rating (0-3) into a `Rating`
    ///
    /// ### Arguments
    ///
    /// * `value` - The numeric rating: 0 = again, 1 = hard, 2 = good, 3 = easy
    ///
    /// ### Returns
    ///
    /// The corresponding `Rating`, or None if the value is out of range
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Rating::Again),
            1 => Some(Rating::Hard),
            2 => Some(Rating::Good),
            3 => Some(Rating::Easy),
            _ => None,
        }
    }

    /// Returns the numeric form of this rating (0-3)
    pub fn as_i32(self) -> i32 {
        match self {
            Rating::Again => 0,
            Rating::Hard => 1,
            Rating::Good => 2,
            Rating::Easy => 3,
        }
    }
}

/// A single review attempt on a study item
///
/// Attempts form an append-only audit log: they are created once per review
/// and never mutated or removed afterwards. The mastery and stability fields
/// are snapshots of the item state immediately after the attempt was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// When the attempt happened
    at: DateTime<Utc>,

    /// Whether the answer was correct
    was_correct: bool,

    /// The rating given during the review
    rating: Rating,

    /// How long the answer took, in seconds
    response_secs: f64,

    /// The item's mastery score immediately after this attempt
    mastery_after: f64,

    /// The item's stability immediately after this attempt, in days
    stability_after: f64,
}

impl Attempt {
    /// Creates a new attempt record
    ///
    /// ### Arguments
    ///
    /// * `at` - When the attempt happened
    /// * `was_correct` - Whether the answer was correct
    /// * `rating` - The rating given during the review
    /// * `response_secs` - How long the answer took, in seconds
    /// * `mastery_after` - The item's mastery score after the attempt
    /// * `stability_after` - The item's stability after the attempt, in days
    ///
    /// ### Returns
    ///
    /// A new `Attempt` instance
    pub fn new(
        at: DateTime<Utc>,
        was_correct: bool,
        rating: Rating,
        response_secs: f64,
        mastery_after: f64,
        stability_after: f64,
    ) -> Self {
        Self {
            at,
            was_correct,
            rating,
            response_secs,
            mastery_after,
            stability_after,
        }
    }

    /// Gets when the attempt happened
    pub fn get_at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Gets whether the answer was correct
    pub fn get_was_correct(&self) -> bool {
        self.was_correct
    }

    /// Gets the rating given during the review
    pub fn get_rating(&self) -> Rating {
        self.rating
    }

    /// Gets how long the answer took, in seconds
    pub fn get_response_secs(&self) -> f64 {
        self.response_secs
    }

    /// Gets the item's mastery score immediately after this attempt
    pub fn get_mastery_after(&self) -> f64 {
        self.mastery_after
    }

    /// Gets the item's stability immediately after this attempt, in days
    pub fn get_stability_after(&self) -> f64 {
        self.stability_after
    }
}
