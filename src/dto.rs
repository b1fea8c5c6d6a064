use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::merge::{MergePolicy, MergeReport};
use crate::models::{ItemKind, StudyItem};
use crate::scheduler::TimingClass;

/// Data transfer object for creating a new study item
///
/// This struct is used to deserialize JSON requests for creating items.
#[derive(Deserialize, Debug)]
pub struct CreateItemDto {
    /// The kind of the item
    pub kind: ItemKind,

    /// The primary text shown to the learner
    pub prompt: String,

    /// The expected answer
    #[serde(default)]
    pub answer: String,

    /// An optional explanation shown after answering
    #[serde(default)]
    pub explanation: String,

    /// Human-readable reference code
    #[serde(default)]
    pub reference: String,

    /// Key of the owning content unit
    #[serde(default)]
    pub unit_key: String,

    /// Legacy owning-unit key
    #[serde(default)]
    pub legacy_unit_key: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Data transfer object for recording a review
///
/// This struct is used to deserialize JSON requests for recording reviews.
#[derive(Deserialize, Debug)]
pub struct CreateReviewDto {
    /// The ID of the item being reviewed
    pub item_id: String,

    /// Whether the answer was correct
    pub was_correct: bool,

    /// The self-assessed rating (0-3)
    pub rating: i32,

    /// Response time in seconds
    pub response_secs: f64,
}

/// Response of a recorded review: the updated item plus the timing
/// classification of the response
#[derive(Serialize, Debug)]
pub struct ReviewResponseDto {
    pub item: StudyItem,
    pub timing: TimingClass,
}

/// Data transfer object for creating a content unit
#[derive(Deserialize, Debug)]
pub struct CreateUnitDto {
    /// The unit key; canonicalized before storage
    pub key: String,

    /// The display title
    pub title: String,
}

/// Data transfer object for marking a unit's text as read
#[derive(Deserialize, Debug)]
pub struct ReadingDto {
    pub done: bool,
}

/// Data transfer object for recording a matching-pair game session
#[derive(Deserialize, Debug)]
pub struct PairSessionDto {
    /// Errors made during the session
    pub errors: u32,
}

/// Data transfer object for recording a timed-drill play
#[derive(Deserialize, Debug)]
pub struct DrillDto {
    /// Score achieved in the play
    pub score: u32,
}

/// Query parameters for listing items
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ItemQueryDto {
    /// Only items linked to this unit key
    pub unit: Option<String>,

    /// Only items whose next review is at or before this time
    pub due_before: Option<DateTime<Utc>>,
}

/// One record of an import batch
///
/// Every content field is optional except the kind and prompt; absent fields
/// import as empty, and an absent id gets a generated one.
#[derive(Deserialize, Debug)]
pub struct ImportRecordDto {
    #[serde(default)]
    pub id: Option<String>,
    pub kind: ItemKind,
    pub prompt: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub unit_key: String,
    #[serde(default)]
    pub legacy_unit_key: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Data transfer object for an import request
#[derive(Deserialize, Debug)]
pub struct ImportDto {
    /// How matched records are applied
    pub policy: MergePolicy,

    /// The batch of records to merge
    pub records: Vec<ImportRecordDto>,
}

/// Response of an import: the merge counters
#[derive(Serialize, Debug)]
pub struct ImportResponseDto {
    #[serde(flatten)]
    pub report: MergeReport,
}
