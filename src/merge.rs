//! Batch merge and deduplication of imported study items.
//!
//! Incoming records are matched against the working collection in a fixed
//! precedence: item id, then canonicalized reference code, then content
//! fingerprint. Matching runs against the *working set* (the collection as it
//! grows during the batch), so replaying the same batch never creates
//! duplicates.

use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::linkage;
use crate::models::StudyItem;

/// How a matched incoming record is applied to the existing item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Never touch an existing item; any match blocks the record
    Skip,
    /// Fill fields that are empty on the existing item and non-empty on the
    /// incoming one; progress is never touched
    Merge,
    /// Replace the content fields wholesale; id and progress are preserved
    Overwrite,
}

/// Counters describing what a merge did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeReport {
    /// Records that created a new item
    pub imported: usize,
    /// Records that changed an existing item
    pub updated: usize,
    /// Records that matched but changed nothing
    pub blocked: usize,
    /// Total records processed
    pub items: usize,
}

/// Finds the working-set item an incoming record refers to
///
/// Precedence: id equality, then canonicalized reference equality, then
/// fingerprint equality. Degenerate values (empty reference, absent
/// fingerprint) never match anything, and neither do soft-deleted items: a
/// tombstone must not block re-import of the same content.
fn find_match(existing: &[StudyItem], incoming: &StudyItem) -> Option<usize> {
    let id = incoming.get_id();
    if let Some(idx) = existing
        .iter()
        .position(|item| !item.is_deleted() && item.get_id() == id)
    {
        return Some(idx);
    }

    let reference = linkage::canonicalize(&incoming.get_reference());
    if !reference.is_empty() {
        if let Some(idx) = existing.iter().position(|item| {
            !item.is_deleted() && linkage::canonicalize(&item.get_reference()) == reference
        }) {
            return Some(idx);
        }
    }

    let print = aggregate::fingerprint(incoming)?;
    existing.iter().position(|item| {
        !item.is_deleted() && aggregate::fingerprint(item).is_some_and(|p| p == print)
    })
}

/// Copies a single content field when the target is empty and the source is
/// not, reporting whether anything changed
fn fill_field(
    changed: &mut bool,
    current: String,
    candidate: String,
    set: impl FnOnce(String),
) {
    if current.is_empty() && !candidate.is_empty() {
        set(candidate);
        *changed = true;
    }
}

/// Applies the Merge policy: empty-on-existing, non-empty-on-incoming fields
/// only
fn merge_into(existing: &mut StudyItem, incoming: &StudyItem) -> bool {
    let mut changed = false;

    let reference = incoming.get_reference();
    fill_field(&mut changed, existing.get_reference(), reference, |v| {
        existing.set_reference(v)
    });
    let unit_key = incoming.get_unit_key();
    fill_field(&mut changed, existing.get_unit_key(), unit_key, |v| {
        existing.set_unit_key(v)
    });
    let legacy = incoming.get_legacy_unit_key();
    fill_field(&mut changed, existing.get_legacy_unit_key(), legacy, |v| {
        existing.set_legacy_unit_key(v)
    });
    let prompt = incoming.get_prompt();
    fill_field(&mut changed, existing.get_prompt(), prompt, |v| {
        existing.set_prompt(v)
    });
    let answer = incoming.get_answer();
    fill_field(&mut changed, existing.get_answer(), answer, |v| {
        existing.set_answer(v)
    });
    let explanation = incoming.get_explanation();
    fill_field(&mut changed, existing.get_explanation(), explanation, |v| {
        existing.set_explanation(v)
    });

    if existing.get_tags().is_empty() && !incoming.get_tags().is_empty() {
        existing.set_tags(incoming.get_tags().to_vec());
        changed = true;
    }

    changed
}

/// Applies the Overwrite policy: content replaced, id and progress kept
fn overwrite_into(existing: &mut StudyItem, incoming: &StudyItem) {
    existing.set_kind(incoming.get_kind());
    existing.set_reference(incoming.get_reference());
    existing.set_unit_key(incoming.get_unit_key());
    existing.set_legacy_unit_key(incoming.get_legacy_unit_key());
    existing.set_tags(incoming.get_tags().to_vec());
    existing.set_prompt(incoming.get_prompt());
    existing.set_answer(incoming.get_answer());
    existing.set_explanation(incoming.get_explanation());
}

/// Merges a batch of incoming items into an existing collection
///
/// ### Arguments
///
/// * `existing` - The item collection; grows and mutates in place, with
///   insertion order preserved
/// * `incoming` - The batch of records to merge
/// * `policy` - How matched records are applied
///
/// ### Returns
///
/// A `MergeReport` with per-outcome counters
pub fn merge(
    existing: &mut Vec<StudyItem>,
    incoming: Vec<StudyItem>,
    policy: MergePolicy,
) -> MergeReport {
    let mut report = MergeReport::default();

    for record in incoming {
        report.items += 1;

        let Some(idx) = find_match(existing, &record) else {
            existing.push(record);
            report.imported += 1;
            continue;
        };

        match policy {
            MergePolicy::Skip => report.blocked += 1,
            MergePolicy::Merge => {
                if merge_into(&mut existing[idx], &record) {
                    report.updated += 1;
                } else {
                    report.blocked += 1;
                }
            }
            MergePolicy::Overwrite => {
                overwrite_into(&mut existing[idx], &record);
                report.updated += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemKind, Rating};
    use crate::scheduler::{ReviewState, TimingClass};
    use chrono::Utc;

    fn item(id: &str, reference: &str, unit_key: &str, prompt: &str) -> StudyItem {
        StudyItem::new_with_fields(
            id.to_string(),
            ItemKind::Question,
            reference.to_string(),
            unit_key.to_string(),
            String::new(),
            Vec::new(),
            prompt.to_string(),
            String::new(),
            String::new(),
            1.0,
            Utc::now(),
        )
    }

    fn with_progress(mut item: StudyItem) -> StudyItem {
        let now = Utc::now();
        let state = ReviewState {
            stability: 8.0,
            difficulty: 0.3,
            mastery_score: 80.0,
            next_review_at: now,
            last_reviewed_at: now,
            timing: TimingClass::Ok,
        };
        for _ in 0..5 {
            item.apply_review(&state, true, Rating::Good, 10.0);
        }
        item
    }

    #[test]
    fn test_unmatched_records_import() {
        let mut existing = vec![item("a", "q-1", "art-1", "What is X?")];
        let incoming = vec![item("b", "q-2", "art-1", "What is Y?")];

        let report = merge(&mut existing, incoming, MergePolicy::Skip);

        assert_eq!(report.imported, 1);
        assert_eq!(report.blocked, 0);
        assert_eq!(existing.len(), 2);
    }

    #[test]
    fn test_skip_blocks_on_id_match() {
        let mut existing = vec![item("a", "q-1", "art-1", "What is X?")];
        let incoming = vec![item("a", "q-other", "art-2", "Entirely different")];

        let report = merge(&mut existing, incoming, MergePolicy::Skip);

        assert_eq!(report.blocked, 1);
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].get_reference(), "q-1");
    }

    #[test]
    fn test_skip_blocks_on_fingerprint_only_match() {
        // Different id, different reference, same (owner, prompt) content
        let mut existing = vec![item("a", "q-1", "art-1", "Qual é a pena?")];
        let incoming = vec![item("b", "q-2", "art-1", "qual e a pena!!")];

        let report = merge(&mut existing, incoming, MergePolicy::Skip);

        assert_eq!(report.blocked, 1);
        assert_eq!(existing.len(), 1);
    }

    #[test]
    fn test_tombstoned_items_never_match() {
        let mut dead = item("a", "q-1", "art-1", "What is X?");
        dead.mark_deleted(Utc::now());
        let mut existing = vec![dead];

        // Same id, same reference, same fingerprint: none of them count
        let report = merge(
            &mut existing,
            vec![item("a", "q-1", "art-1", "What is X?")],
            MergePolicy::Skip,
        );

        assert_eq!(report.imported, 1);
        assert_eq!(report.blocked, 0);
        assert_eq!(existing.len(), 2);
        assert!(existing[0].is_deleted());
        assert!(!existing[1].is_deleted());
    }

    #[test]
    fn test_reference_match_is_canonicalized() {
        let mut existing = vec![item("a", "Q-1", "art-1", "What is X?")];
        let incoming = vec![item("b", "  q-1 ", "art-2", "Other prompt")];

        let report = merge(&mut existing, incoming, MergePolicy::Skip);

        assert_eq!(report.blocked, 1);
    }

    #[test]
    fn test_merge_fills_only_empty_fields() {
        let mut existing = vec![item("a", "q-1", "art-1", "What is X?")];
        let mut incoming = item("a", "q-other", "art-other", "Other prompt");
        incoming.set_explanation("Because of article 5.".to_string());

        let report = merge(&mut existing, vec![incoming], MergePolicy::Merge);

        assert_eq!(report.updated, 1);
        // Non-empty fields keep their existing values
        assert_eq!(existing[0].get_reference(), "q-1");
        assert_eq!(existing[0].get_prompt(), "What is X?");
        // Empty explanation is filled from the incoming record
        assert_eq!(existing[0].get_explanation(), "Because of article 5.");
    }

    #[test]
    fn test_merge_never_touches_progress() {
        let mut existing = vec![with_progress(item("a", "q-1", "art-1", "What is X?"))];
        let mut incoming = item("a", "q-1", "art-1", "What is X?");
        incoming.set_answer("42".to_string());

        merge(&mut existing, vec![incoming], MergePolicy::Merge);

        assert_eq!(existing[0].get_total_attempts(), 5);
        assert!((existing[0].get_mastery_score() - 80.0).abs() < 1e-9);
        assert_eq!(existing[0].get_answer(), "42");
    }

    #[test]
    fn test_merge_with_no_change_counts_blocked() {
        let mut existing = vec![item("a", "q-1", "art-1", "What is X?")];
        let incoming = vec![item("a", "q-1", "art-1", "What is X?")];

        let report = merge(&mut existing, incoming, MergePolicy::Merge);

        assert_eq!(report.updated, 0);
        assert_eq!(report.blocked, 1);
    }

    #[test]
    fn test_overwrite_replaces_content_but_keeps_id_and_progress() {
        let mut existing = vec![with_progress(item("a", "q-1", "art-1", "What is X?"))];
        let mut incoming = item("incoming-id", "q-1", "art-9", "Rewritten prompt");
        incoming.set_answer("New answer".to_string());

        let report = merge(&mut existing, vec![incoming], MergePolicy::Overwrite);

        assert_eq!(report.updated, 1);
        assert_eq!(existing[0].get_id(), "a");
        assert_eq!(existing[0].get_prompt(), "Rewritten prompt");
        assert_eq!(existing[0].get_unit_key(), "art-9");
        assert_eq!(existing[0].get_total_attempts(), 5);
        assert!((existing[0].get_mastery_score() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_is_internally_deduplicated() {
        // Two copies of the same record in one batch: the second matches the
        // first one's freshly imported copy in the working set
        let mut existing = Vec::new();
        let incoming = vec![
            item("a", "q-1", "art-1", "What is X?"),
            item("b", "q-2", "art-1", "What is X?"),
        ];

        let report = merge(&mut existing, incoming, MergePolicy::Skip);

        assert_eq!(report.imported, 1);
        assert_eq!(report.blocked, 1);
        assert_eq!(existing.len(), 1);
    }

    #[test]
    fn test_replaying_a_batch_is_idempotent() {
        let batch = || {
            vec![
                item("a", "q-1", "art-1", "What is X?"),
                item("b", "q-2", "art-1", "What is Y?"),
            ]
        };

        let mut existing = Vec::new();
        merge(&mut existing, batch(), MergePolicy::Merge);
        let first_pass = existing.clone();

        let report = merge(&mut existing, batch(), MergePolicy::Merge);

        assert_eq!(existing.len(), 2);
        assert_eq!(existing, first_pass);
        assert_eq!(report.imported, 0);
        assert_eq!(report.blocked, 2);
    }

    #[test]
    fn test_overwrite_replay_is_idempotent() {
        let batch = || vec![item("a", "q-1", "art-1", "What is X?")];

        let mut existing = Vec::new();
        merge(&mut existing, batch(), MergePolicy::Overwrite);
        let first_pass = existing.clone();

        merge(&mut existing, batch(), MergePolicy::Overwrite);

        assert_eq!(existing, first_pass);
    }
}
