use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Attempt, Rating};
use crate::scheduler::ReviewState;

/// The kind of a reviewable study item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A quiz question with a model answer
    Question,
    /// A cloze deletion ("gap") inside a studied text
    Gap,
    /// A front/back flashcard
    Flashcard,
    /// One card of a matching-pair game
    PairCard,
}

/// A reviewable unit in the spaced repetition system
///
/// Items are created by import or manual entry with zero attempts, mutated
/// only by applying a review outcome, and soft-deleted rather than removed so
/// the attempt history stays auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyItem {
    /// Unique identifier for the item (UUID v4 as string, or an imported id)
    id: String,

    /// The kind of this item
    kind: ItemKind,

    /// Human-readable reference code (e.g. "art5-q12"), possibly empty
    reference: String,

    /// Key of the owning content unit, possibly empty; resolved lazily
    unit_key: String,

    /// Legacy owning-unit key populated by older import formats, possibly empty
    legacy_unit_key: String,

    /// Free-form tags; older imports used the first tag as the owning-unit key
    tags: Vec<String>,

    /// The primary text shown to the learner
    prompt: String,

    /// The expected answer, possibly empty
    answer: String,

    /// An optional explanation shown after answering
    explanation: String,

    /// Memory stability in days; always > 0 and at most the configured cap
    stability: f64,

    /// Difficulty between 0 and 1
    difficulty: f64,

    /// Mastery score between 0 and 100
    mastery_score: f64,

    /// Number of recorded attempts; always equals `attempts.len()`
    total_attempts: u32,

    /// Whether the most recent attempt was correct
    last_was_correct: bool,

    /// When this item should next be reviewed
    next_review_at: DateTime<Utc>,

    /// When this item was last reviewed, if ever
    last_reviewed_at: Option<DateTime<Utc>>,

    /// Append-only attempt history in chronological order
    attempts: Vec<Attempt>,

    /// When this item was soft-deleted (or None if it is live)
    deleted_at: Option<DateTime<Utc>>,
}

impl StudyItem {
    /// Creates a new item with no attempt history
    ///
    /// ### Arguments
    ///
    /// * `kind` - The kind of the item
    /// * `prompt` - The primary text shown to the learner
    /// * `initial_stability` - The configured default stability in days
    /// * `now` - The creation time; the item is immediately due
    ///
    /// ### Returns
    ///
    /// A new `StudyItem` with zero attempts and zero mastery
    pub fn new(kind: ItemKind, prompt: String, initial_stability: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            reference: String::new(),
            unit_key: String::new(),
            legacy_unit_key: String::new(),
            tags: Vec::new(),
            prompt,
            answer: String::new(),
            explanation: String::new(),
            stability: initial_stability,
            difficulty: 0.3,
            mastery_score: 0.0,
            total_attempts: 0,
            last_was_correct: false,
            next_review_at: now,
            last_reviewed_at: None,
            attempts: Vec::new(),
            deleted_at: None,
        }
    }

    /// Creates an item with all content fields specified
    ///
    /// This is the constructor used by the import path and by tests; progress
    /// fields start at their defaults exactly as with `new`.
    ///
    /// ### Arguments
    ///
    /// * `id` - The unique identifier for the item
    /// * `kind` - The kind of the item
    /// * `reference` - Human-readable reference code
    /// * `unit_key` - Key of the owning content unit
    /// * `legacy_unit_key` - Legacy owning-unit key
    /// * `tags` - Free-form tags
    /// * `prompt` - The primary text
    /// * `answer` - The expected answer
    /// * `explanation` - An optional explanation
    /// * `initial_stability` - The configured default stability in days
    /// * `now` - The creation time
    ///
    /// ### Returns
    ///
    /// A new `StudyItem` with the specified content and no attempt history
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_fields(
        id: String,
        kind: ItemKind,
        reference: String,
        unit_key: String,
        legacy_unit_key: String,
        tags: Vec<String>,
        prompt: String,
        answer: String,
        explanation: String,
        initial_stability: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            reference,
            unit_key,
            legacy_unit_key,
            tags,
            prompt,
            answer,
            explanation,
            stability: initial_stability,
            difficulty: 0.3,
            mastery_score: 0.0,
            total_attempts: 0,
            last_was_correct: false,
            next_review_at: now,
            last_reviewed_at: None,
            attempts: Vec::new(),
            deleted_at: None,
        }
    }

    /// Gets the item's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the item's kind
    pub fn get_kind(&self) -> ItemKind {
        self.kind
    }

    /// Sets the item's kind
    pub fn set_kind(&mut self, kind: ItemKind) {
        self.kind = kind;
    }

    /// Gets the item's human-readable reference code
    pub fn get_reference(&self) -> String {
        self.reference.clone()
    }

    /// Sets the item's human-readable reference code
    pub fn set_reference(&mut self, reference: String) {
        self.reference = reference;
    }

    /// Gets the item's owning-unit key (the modern link field)
    pub fn get_unit_key(&self) -> String {
        self.unit_key.clone()
    }

    /// Sets the item's owning-unit key
    pub fn set_unit_key(&mut self, unit_key: String) {
        self.unit_key = unit_key;
    }

    /// Gets the item's legacy owning-unit key
    pub fn get_legacy_unit_key(&self) -> String {
        self.legacy_unit_key.clone()
    }

    /// Sets the item's legacy owning-unit key
    pub fn set_legacy_unit_key(&mut self, legacy_unit_key: String) {
        self.legacy_unit_key = legacy_unit_key;
    }

    /// Gets the item's tags
    pub fn get_tags(&self) -> &[String] {
        &self.tags
    }

    /// Sets the item's tags
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Gets the item's primary text
    pub fn get_prompt(&self) -> String {
        self.prompt.clone()
    }

    /// Sets the item's primary text
    pub fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
    }

    /// Gets the item's expected answer
    pub fn get_answer(&self) -> String {
        self.answer.clone()
    }

    /// Sets the item's expected answer
    pub fn set_answer(&mut self, answer: String) {
        self.answer = answer;
    }

    /// Gets the item's explanation
    pub fn get_explanation(&self) -> String {
        self.explanation.clone()
    }

    /// Sets the item's explanation
    pub fn set_explanation(&mut self, explanation: String) {
        self.explanation = explanation;
    }

    /// Gets the item's stability in days
    pub fn get_stability(&self) -> f64 {
        self.stability
    }

    /// Gets the item's difficulty
    pub fn get_difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Gets the item's mastery score
    pub fn get_mastery_score(&self) -> f64 {
        self.mastery_score
    }

    /// Gets the number of recorded attempts
    pub fn get_total_attempts(&self) -> u32 {
        self.total_attempts
    }

    /// Returns true if the item has been attempted at least once
    pub fn has_attempts(&self) -> bool {
        self.total_attempts > 0
    }

    /// Gets whether the most recent attempt was correct
    pub fn get_last_was_correct(&self) -> bool {
        self.last_was_correct
    }

    /// Gets when this item should next be reviewed
    pub fn get_next_review_at(&self) -> DateTime<Utc> {
        self.next_review_at
    }

    /// Gets when this item was last reviewed, if ever
    pub fn get_last_reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.last_reviewed_at
    }

    /// Gets the item's attempt history in chronological order
    pub fn get_attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Gets the item's soft-delete timestamp
    pub fn get_deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns true if the item has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-deletes the item
    ///
    /// The item and its attempt history stay in the collection as an audit
    /// record; the read boundary filters tombstoned items out.
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    /// Applies a computed review outcome to this item
    ///
    /// This is the single mutation point for progress state: it copies the
    /// scheduler's output into the item, appends the immutable attempt record,
    /// and keeps `total_attempts` in lockstep with the history length.
    ///
    /// ### Arguments
    ///
    /// * `state` - The scheduler's output for this review
    /// * `was_correct` - Whether the answer was correct
    /// * `rating` - The rating given during the review
    /// * `response_secs` - How long the answer took, in seconds
    pub fn apply_review(
        &mut self,
        state: &ReviewState,
        was_correct: bool,
        rating: Rating,
        response_secs: f64,
    ) {
        self.stability = state.stability;
        self.difficulty = state.difficulty;
        self.mastery_score = state.mastery_score;
        self.next_review_at = state.next_review_at;
        self.last_reviewed_at = Some(state.last_reviewed_at);
        self.last_was_correct = was_correct;
        self.attempts.push(Attempt::new(
            state.last_reviewed_at,
            was_correct,
            rating,
            response_secs,
            state.mastery_score,
            state.stability,
        ));
        self.total_attempts = self.attempts.len() as u32;
    }
}
