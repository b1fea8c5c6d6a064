//! Read-only summary statistics over item collections.
//!
//! Everything here is recomputed from the live collection on every call;
//! nothing is cached on the content unit, so the numbers can never drift from
//! the items they describe. Averages are taken over attempted items only --
//! folding never-attempted items in would drag every average toward zero and
//! misrepresent achieved mastery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::linkage;
use crate::models::{ContentUnit, StudyItem};
use crate::recall;

/// Aggregate statistics over a set of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    /// Average mastery over attempted items (0 when none attempted)
    pub avg_mastery: f64,
    /// Average current domain over attempted items (0 when none attempted)
    pub avg_domain: f64,
    /// Number of attempted items
    pub attempted: usize,
    /// Number of attempted items whose most recent answer was wrong
    pub errors: usize,
}

/// The display label of a unit's review situation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum ReviewLabel {
    /// The unit has no items yet
    New,
    /// Something is overdue; carries the *oldest* overdue timestamp so the
    /// label communicates worst-case staleness, not best-case
    OverdueSince(DateTime<Utc>),
    /// Nothing is overdue; carries the nearest future due time
    NextAt(DateTime<Utc>),
}

/// Per-unit summary across all linked items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSummary {
    /// Canonical key of the unit
    pub unit_key: String,
    /// Total number of linked live items
    pub total: usize,
    /// Items never attempted
    pub not_started: usize,
    /// Attempted items whose next review is due now or earlier
    pub due_now: usize,
    /// Attempted items scheduled in the future
    pub scheduled: usize,
    /// Average mastery over attempted items
    pub avg_mastery: f64,
    /// Average current domain over attempted items
    pub avg_domain: f64,
    /// Review-situation label
    pub label: ReviewLabel,
}

/// Normalizes text for content fingerprinting
///
/// Lowercases, strips accents (NFD followed by combining-mark removal), drops
/// punctuation and collapses whitespace, so trivially reformatted copies of
/// the same content collide.
fn normalize_text(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect();
    stripped
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Computes an item's content fingerprint
///
/// Two items with equal fingerprints are content-duplicates regardless of
/// identifier.
///
/// ### Arguments
///
/// * `item` - The item to fingerprint
///
/// ### Returns
///
/// `normalized(owner_key)|normalized(primary_text)`, or None when both parts
/// are empty -- degenerate fingerprints must never make unrelated incomplete
/// records look like duplicates of each other
pub fn fingerprint(item: &StudyItem) -> Option<String> {
    let owner = normalize_text(&linkage::resolve(item).unwrap_or_default());
    let text = normalize_text(&item.get_prompt());
    if owner.is_empty() && text.is_empty() {
        return None;
    }
    Some(format!("{}|{}", owner, text))
}

/// Aggregates mastery/domain statistics over a set of items
///
/// ### Arguments
///
/// * `items` - The items to aggregate (soft-deleted items are the caller's
///   concern; the read boundary filters them before this point)
/// * `now` - The evaluation time for domain decay
///
/// ### Returns
///
/// Averages over attempted items only, plus the attempted and error counts
pub fn aggregate(items: &[&StudyItem], now: DateTime<Utc>) -> ItemStats {
    let attempted: Vec<&&StudyItem> = items.iter().filter(|i| i.has_attempts()).collect();

    if attempted.is_empty() {
        return ItemStats {
            avg_mastery: 0.0,
            avg_domain: 0.0,
            attempted: 0,
            errors: 0,
        };
    }

    let count = attempted.len() as f64;
    let mastery_sum: f64 = attempted
        .iter()
        .map(|i| {
            let m = i.get_mastery_score();
            if m.is_finite() { m.clamp(0.0, 100.0) } else { 0.0 }
        })
        .sum();
    let domain_sum: f64 = attempted.iter().map(|i| recall::current_domain(i, now)).sum();
    let errors = attempted.iter().filter(|i| !i.get_last_was_correct()).count();

    ItemStats {
        avg_mastery: mastery_sum / count,
        avg_domain: domain_sum / count,
        attempted: attempted.len(),
        errors,
    }
}

/// Builds the per-unit summary across all items linked to a content unit
///
/// Resolves linkage over the whole collection, partitions the linked items
/// into not-started / due-now / scheduled, and derives the display label:
/// "new" for an empty unit, the nearest future due time when nothing is
/// overdue, and the oldest overdue timestamp otherwise.
///
/// ### Arguments
///
/// * `unit` - The content unit to summarize
/// * `all_items` - The full live item collection
/// * `now` - The evaluation time
///
/// ### Returns
///
/// The unit's `UnitSummary`
pub fn unit_summary(unit: &ContentUnit, all_items: &[&StudyItem], now: DateTime<Utc>) -> UnitSummary {
    let key = unit.get_key();
    let linked: Vec<&StudyItem> = all_items
        .iter()
        .copied()
        .filter(|item| linkage::is_linked(item, &key))
        .collect();

    let not_started = linked.iter().filter(|i| !i.has_attempts()).count();
    let due: Vec<&&StudyItem> = linked
        .iter()
        .filter(|i| i.has_attempts() && i.get_next_review_at() <= now)
        .collect();
    let scheduled = linked
        .iter()
        .filter(|i| i.has_attempts() && i.get_next_review_at() > now)
        .count();

    let label = if let Some(oldest_overdue) = due.iter().map(|i| i.get_next_review_at()).min() {
        ReviewLabel::OverdueSince(oldest_overdue)
    } else if let Some(next) = linked
        .iter()
        .filter(|i| i.get_next_review_at() > now)
        .map(|i| i.get_next_review_at())
        .min()
    {
        ReviewLabel::NextAt(next)
    } else if let Some(startable) = linked.iter().map(|i| i.get_next_review_at()).min() {
        // Only not-yet-attempted items whose creation due time is <= now;
        // they are startable immediately.
        ReviewLabel::OverdueSince(startable)
    } else {
        ReviewLabel::New
    };

    let stats = aggregate(&linked, now);

    UnitSummary {
        unit_key: linkage::canonicalize(&key),
        total: linked.len(),
        not_started,
        due_now: due.len(),
        scheduled,
        avg_mastery: stats.avg_mastery,
        avg_domain: stats.avg_domain,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemKind, Rating};
    use crate::scheduler::{ReviewState, TimingClass};
    use chrono::Duration;

    fn linked_item(kind: ItemKind, unit_key: &str, prompt: &str) -> StudyItem {
        StudyItem::new_with_fields(
            uuid::Uuid::new_v4().to_string(),
            kind,
            String::new(),
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

    fn with_review(
        mut item: StudyItem,
        mastery: f64,
        stability: f64,
        was_correct: bool,
        reviewed_at: DateTime<Utc>,
        next_at: DateTime<Utc>,
    ) -> StudyItem {
        let state = ReviewState {
            stability,
            difficulty: 0.3,
            mastery_score: mastery,
            next_review_at: next_at,
            last_reviewed_at: reviewed_at,
            timing: TimingClass::Ok,
        };
        item.apply_review(&state, was_correct, Rating::Good, 10.0);
        item
    }

    #[test]
    fn test_fingerprint_normalizes_accents_punctuation_whitespace() {
        let a = linked_item(ItemKind::Question, "Art-5", "  Qual é a  pena?! ");
        let b = linked_item(ItemKind::Question, "art-5", "qual e a pena");

        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).unwrap(), "art 5|qual e a pena");
    }

    #[test]
    fn test_empty_fingerprint_is_none() {
        let item = StudyItem::new_with_fields(
            "itm-1".to_string(),
            ItemKind::Question,
            String::new(),
            String::new(),
            String::new(),
            Vec::new(),
            String::new(),
            String::new(),
            String::new(),
            1.0,
            Utc::now(),
        );
        assert_eq!(fingerprint(&item), None);
    }

    #[test]
    fn test_aggregate_skips_unattempted_items() {
        let now = Utc::now();
        let attempted_1 = with_review(
            linked_item(ItemKind::Question, "art-5", "q1"),
            80.0,
            10.0,
            true,
            now,
            now + Duration::days(10),
        );
        let attempted_2 = with_review(
            linked_item(ItemKind::Question, "art-5", "q2"),
            40.0,
            10.0,
            false,
            now,
            now + Duration::days(10),
        );
        let fresh = linked_item(ItemKind::Question, "art-5", "q3");

        let items = [&attempted_1, &attempted_2, &fresh];
        let stats = aggregate(&items, now);

        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.errors, 1);
        // Averages over the two attempted items only
        assert!((stats.avg_mastery - 60.0).abs() < 1e-9);
        assert!((stats.avg_domain - 60.0).abs() < 1e-9); // zero elapsed time
    }

    #[test]
    fn test_aggregate_of_nothing_is_zero() {
        let stats = aggregate(&[], Utc::now());
        assert_eq!(stats.attempted, 0);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.avg_mastery, 0.0);
        assert_eq!(stats.avg_domain, 0.0);
    }

    #[test]
    fn test_unit_summary_partitions_items() {
        let now = Utc::now();
        let unit = ContentUnit::new("art-5".to_string(), "Article 5".to_string(), now);

        let overdue = with_review(
            linked_item(ItemKind::Question, "art-5", "q1"),
            50.0,
            5.0,
            true,
            now - Duration::days(8),
            now - Duration::days(3),
        );
        let scheduled = with_review(
            linked_item(ItemKind::Question, "art-5", "q2"),
            70.0,
            10.0,
            true,
            now,
            now + Duration::days(10),
        );
        let fresh = linked_item(ItemKind::Question, "art-5", "q3");
        let unrelated = linked_item(ItemKind::Question, "art-99", "q4");

        let items = [&overdue, &scheduled, &fresh, &unrelated];
        let summary = unit_summary(&unit, &items, now);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.not_started, 1);
        assert_eq!(summary.due_now, 1);
        assert_eq!(summary.scheduled, 1);
        // Averages are over the two attempted items only
        assert!((summary.avg_mastery - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_summary_label_new_for_empty_unit() {
        let now = Utc::now();
        let unit = ContentUnit::new("art-5".to_string(), "Article 5".to_string(), now);
        let summary = unit_summary(&unit, &[], now);
        assert_eq!(summary.label, ReviewLabel::New);
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn test_unit_summary_label_prefers_oldest_overdue() {
        let now = Utc::now();
        let unit = ContentUnit::new("art-5".to_string(), "Article 5".to_string(), now);

        let old_overdue_at = now - Duration::days(9);
        let recent_overdue_at = now - Duration::days(1);
        let a = with_review(
            linked_item(ItemKind::Question, "art-5", "q1"),
            50.0,
            5.0,
            true,
            now - Duration::days(12),
            old_overdue_at,
        );
        let b = with_review(
            linked_item(ItemKind::Question, "art-5", "q2"),
            50.0,
            5.0,
            true,
            now - Duration::days(4),
            recent_overdue_at,
        );

        let items = [&a, &b];
        let summary = unit_summary(&unit, &items, now);

        // Worst-case staleness: the oldest overdue timestamp wins
        assert_eq!(summary.label, ReviewLabel::OverdueSince(old_overdue_at));
    }

    #[test]
    fn test_unit_summary_label_next_future_when_nothing_overdue() {
        let now = Utc::now();
        let unit = ContentUnit::new("art-5".to_string(), "Article 5".to_string(), now);

        let near = now + Duration::days(2);
        let far = now + Duration::days(9);
        let a = with_review(
            linked_item(ItemKind::Question, "art-5", "q1"),
            50.0,
            5.0,
            true,
            now,
            far,
        );
        let b = with_review(
            linked_item(ItemKind::Question, "art-5", "q2"),
            50.0,
            5.0,
            true,
            now,
            near,
        );

        let items = [&a, &b];
        let summary = unit_summary(&unit, &items, now);

        assert_eq!(summary.label, ReviewLabel::NextAt(near));
    }

    #[test]
    fn test_unit_summary_includes_items_linked_by_tag() {
        let now = Utc::now();
        let unit = ContentUnit::new("art-5".to_string(), "Article 5".to_string(), now);

        let mut tagged = linked_item(ItemKind::Flashcard, "", "front");
        tagged.set_tags(vec!["Art-5".to_string()]);

        let items = [&tagged];
        let summary = unit_summary(&unit, &items, now);

        assert_eq!(summary.total, 1);
    }
}
