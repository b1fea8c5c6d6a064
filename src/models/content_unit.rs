use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An anchor that groups study items across categories
///
/// A content unit (e.g. a legal article or a study note) owns no item
/// lifetime: items reference it weakly by resolvable key, and everything the
/// progress views show about a unit is recomputed from the live item
/// collection on every read. The only facts stored here are ones that are not
/// derivable from items: the reading flag and the pair-game / timed-drill
/// play records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnit {
    /// Canonical key of the unit
    key: String,

    /// Display title of the unit
    title: String,

    /// Whether the learner has marked the unit's text as read
    reading_done: bool,

    /// Error count of the most recent matching-pair game session
    last_pair_errors: Option<u32>,

    /// Number of timed-drill plays recorded for this unit
    drill_plays: u32,

    /// Best timed-drill score ever recorded for this unit
    drill_best_score: u32,

    /// When this unit was created
    created_at: DateTime<Utc>,
}

impl ContentUnit {
    /// Creates a new content unit
    ///
    /// ### Arguments
    ///
    /// * `key` - The canonical key of the unit
    /// * `title` - The display title
    /// * `now` - The creation time
    ///
    /// ### Returns
    ///
    /// A new `ContentUnit` with reading not done and no play records
    pub fn new(key: String, title: String, now: DateTime<Utc>) -> Self {
        Self {
            key,
            title,
            reading_done: false,
            last_pair_errors: None,
            drill_plays: 0,
            drill_best_score: 0,
            created_at: now,
        }
    }

    /// Gets the unit's canonical key
    pub fn get_key(&self) -> String {
        self.key.clone()
    }

    /// Gets the unit's display title
    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    /// Sets the unit's display title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    /// Gets whether the unit's text has been read
    pub fn get_reading_done(&self) -> bool {
        self.reading_done
    }

    /// Sets whether the unit's text has been read
    pub fn set_reading_done(&mut self, done: bool) {
        self.reading_done = done;
    }

    /// Gets the error count of the most recent matching-pair session
    pub fn get_last_pair_errors(&self) -> Option<u32> {
        self.last_pair_errors
    }

    /// Records the outcome of a matching-pair game session
    ///
    /// Only the most recent session matters for the activity status, so this
    /// overwrites any previous value.
    pub fn record_pair_session(&mut self, errors: u32) {
        self.last_pair_errors = Some(errors);
    }

    /// Gets the number of timed-drill plays recorded
    pub fn get_drill_plays(&self) -> u32 {
        self.drill_plays
    }

    /// Gets the best timed-drill score ever recorded
    pub fn get_drill_best_score(&self) -> u32 {
        self.drill_best_score
    }

    /// Records a timed-drill play
    ///
    /// The best score only ever grows; a worse play never lowers it.
    pub fn record_drill(&mut self, score: u32) {
        self.drill_plays += 1;
        if score > self.drill_best_score {
            self.drill_best_score = score;
        }
    }

    /// Gets when this unit was created
    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
