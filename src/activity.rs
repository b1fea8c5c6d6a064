//! Per-category activity status for a content unit.
//!
//! A (unit, category) pair is classified fresh from the live item collection
//! on every call; no transition history is stored anywhere, so the status can
//! never disagree with the items it is derived from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::linkage;
use crate::models::{ContentUnit, ItemKind, Rating, StudyItem};

/// Fraction of attempted question items that must currently be correct
const QUESTION_ACCURACY_THRESHOLD: f64 = 0.85;

/// Maximum error count of the most recent pair session for the category to
/// count as complete
const PAIR_ERROR_LIMIT: u32 = 6;

/// The six activity categories of a content unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Reading,
    Gaps,
    Questions,
    Flashcards,
    Pairs,
    TimedDrill,
}

impl Category {
    /// The item-backed category an item kind belongs to
    pub fn for_kind(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Question => Category::Questions,
            ItemKind::Gap => Category::Gaps,
            ItemKind::Flashcard => Category::Flashcards,
            ItemKind::PairCard => Category::Pairs,
        }
    }
}

/// The status of one (unit, category) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// The category has no items
    Empty,
    /// At least one item has never been attempted
    NeverDone,
    /// Everything has been started but at least one item is due
    DueNow,
    /// Nothing pending, but the category's completion metric is below its
    /// threshold
    Train,
    /// Threshold met and nothing pending
    Ok,
}

/// Derived activity state of one category; recomputed on every read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityState {
    /// The classified status
    pub status: ActivityStatus,
    /// Items never attempted
    pub new_count: usize,
    /// Attempted items due now or earlier
    pub due_count: usize,
    /// Attempted items scheduled in the future
    pub pending_count: usize,
    /// Average mastery over attempted items
    pub avg_mastery: f64,
    /// Average current domain over attempted items
    pub avg_domain: f64,
    /// Fraction of attempted items whose most recent answer was correct
    pub accuracy: f64,
}

impl ActivityState {
    fn bare(status: ActivityStatus) -> Self {
        Self {
            status,
            new_count: 0,
            due_count: 0,
            pending_count: 0,
            avg_mastery: 0.0,
            avg_domain: 0.0,
            accuracy: 0.0,
        }
    }
}

/// Activity states of every category of a unit, plus the recommended next
/// action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitActivity {
    pub reading: ActivityState,
    pub gaps: ActivityState,
    pub questions: ActivityState,
    pub flashcards: ActivityState,
    pub pairs: ActivityState,
    pub timed_drill: ActivityState,
    /// The category the learner should tackle next, if any
    pub recommended: Option<Category>,
}

impl UnitActivity {
    /// Gets the state of a category
    pub fn get(&self, category: Category) -> &ActivityState {
        match category {
            Category::Reading => &self.reading,
            Category::Gaps => &self.gaps,
            Category::Questions => &self.questions,
            Category::Flashcards => &self.flashcards,
            Category::Pairs => &self.pairs,
            Category::TimedDrill => &self.timed_drill,
        }
    }
}

/// Whether a category's completion metric meets its threshold
fn threshold_met(
    category: Category,
    unit: &ContentUnit,
    attempted: &[&StudyItem],
    accuracy: f64,
) -> bool {
    match category {
        Category::Questions => accuracy >= QUESTION_ACCURACY_THRESHOLD,
        Category::Gaps => accuracy >= 1.0,
        Category::Flashcards => attempted.iter().all(|item| {
            item.get_attempts()
                .last()
                .is_some_and(|a| matches!(a.get_rating(), Rating::Good | Rating::Easy))
        }),
        Category::Pairs => unit
            .get_last_pair_errors()
            .is_some_and(|errors| errors <= PAIR_ERROR_LIMIT),
        // Reading and timed-drill never reach the threshold check
        Category::Reading | Category::TimedDrill => true,
    }
}

/// Classifies one category of a unit
///
/// ### Arguments
///
/// * `unit` - The content unit
/// * `linked` - The live items already filtered to this unit
/// * `category` - The category to classify
/// * `now` - The evaluation time
///
/// ### Returns
///
/// The derived `ActivityState` for the category
pub fn category_state(
    unit: &ContentUnit,
    linked: &[&StudyItem],
    category: Category,
    now: DateTime<Utc>,
) -> ActivityState {
    // The two non-collection categories are plain flags on the unit
    match category {
        Category::Reading => {
            let status = if unit.get_reading_done() {
                ActivityStatus::Ok
            } else {
                ActivityStatus::NeverDone
            };
            return ActivityState::bare(status);
        }
        Category::TimedDrill => {
            let status = if unit.get_drill_plays() == 0 {
                ActivityStatus::NeverDone
            } else if unit.get_drill_best_score() == 0 {
                ActivityStatus::Train
            } else {
                ActivityStatus::Ok
            };
            return ActivityState::bare(status);
        }
        _ => {}
    }

    let in_category: Vec<&StudyItem> = linked
        .iter()
        .copied()
        .filter(|item| Category::for_kind(item.get_kind()) == category)
        .collect();

    if in_category.is_empty() {
        return ActivityState::bare(ActivityStatus::Empty);
    }

    let new_count = in_category.iter().filter(|i| !i.has_attempts()).count();
    let due_count = in_category
        .iter()
        .filter(|i| i.has_attempts() && i.get_next_review_at() <= now)
        .count();
    let pending_count = in_category
        .iter()
        .filter(|i| i.has_attempts() && i.get_next_review_at() > now)
        .count();

    let attempted: Vec<&StudyItem> = in_category
        .iter()
        .copied()
        .filter(|i| i.has_attempts())
        .collect();
    let stats = aggregate::aggregate(&in_category, now);
    let accuracy = if stats.attempted == 0 {
        0.0
    } else {
        (stats.attempted - stats.errors) as f64 / stats.attempted as f64
    };

    let status = if new_count > 0 {
        ActivityStatus::NeverDone
    } else if due_count > 0 {
        ActivityStatus::DueNow
    } else if !threshold_met(category, unit, &attempted, accuracy) {
        ActivityStatus::Train
    } else {
        ActivityStatus::Ok
    };

    ActivityState {
        status,
        new_count,
        due_count,
        pending_count,
        avg_mastery: stats.avg_mastery,
        avg_domain: stats.avg_domain,
        accuracy,
    }
}

/// Picks the category the learner should tackle next
///
/// Any never-done category wins first, in fixed priority order (reading,
/// gaps, questions, flashcards, pairs); otherwise the due category with the
/// most due items; otherwise any category still in training.
fn recommend(states: &UnitActivity) -> Option<Category> {
    const PRIORITY: [Category; 5] = [
        Category::Reading,
        Category::Gaps,
        Category::Questions,
        Category::Flashcards,
        Category::Pairs,
    ];
    const ALL: [Category; 6] = [
        Category::Reading,
        Category::Gaps,
        Category::Questions,
        Category::Flashcards,
        Category::Pairs,
        Category::TimedDrill,
    ];

    if let Some(category) = PRIORITY
        .iter()
        .find(|c| states.get(**c).status == ActivityStatus::NeverDone)
    {
        return Some(*category);
    }

    ALL.iter()
        .filter(|c| states.get(**c).status == ActivityStatus::DueNow)
        .max_by_key(|c| states.get(**c).due_count)
        .copied()
        .or_else(|| {
            ALL.iter()
                .find(|c| states.get(**c).status == ActivityStatus::Train)
                .copied()
        })
}

/// Classifies every category of a unit and derives the recommended action
///
/// ### Arguments
///
/// * `unit` - The content unit
/// * `all_items` - The full live item collection
/// * `now` - The evaluation time
///
/// ### Returns
///
/// The complete `UnitActivity` for the unit
pub fn unit_activity(unit: &ContentUnit, all_items: &[&StudyItem], now: DateTime<Utc>) -> UnitActivity {
    let key = unit.get_key();
    let linked: Vec<&StudyItem> = all_items
        .iter()
        .copied()
        .filter(|item| linkage::is_linked(item, &key))
        .collect();

    let mut activity = UnitActivity {
        reading: category_state(unit, &linked, Category::Reading, now),
        gaps: category_state(unit, &linked, Category::Gaps, now),
        questions: category_state(unit, &linked, Category::Questions, now),
        flashcards: category_state(unit, &linked, Category::Flashcards, now),
        pairs: category_state(unit, &linked, Category::Pairs, now),
        timed_drill: category_state(unit, &linked, Category::TimedDrill, now),
        recommended: None,
    };
    activity.recommended = recommend(&activity);
    activity
}
