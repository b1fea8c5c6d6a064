//! Best-effort resolution of an item's owning content unit.
//!
//! Imported data has crossed several format versions, and the owning-unit
//! reference ended up spread over four differently-populated fields: a modern
//! link field, a legacy link field, the tag set, and (for hand-authored
//! content) the item's own identifier. Resolution runs an ordered list of
//! strategies and short-circuits on the first that produces a key; linkage
//! checks deliberately OR over all four sources so that no legitimately-linked
//! item is dropped just because one field was empty.

use unicode_normalization::UnicodeNormalization;

use crate::models::StudyItem;

/// Tags that never denote an owning unit
const RESERVED_TAGS: &[&str] = &["pair-match", "literalness"];

/// Prefix of machine-generated item ids; such ids never double as unit keys
const GENERATED_ID_PREFIX: &str = "itm-";

/// Case-sensitive namespace prefix whose keys are passed through verbatim
const TRAIL_PREFIX: &str = "trail:";

/// Returns true for the zero-width characters that copy/paste smuggles into
/// hand-entered keys
fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// Canonicalizes a free-form content-unit reference
///
/// Trims, strips zero-width characters, applies Unicode NFKC normalization
/// and lowercases. Keys in the case-sensitive `trail:` namespace are returned
/// trimmed but otherwise untouched. Idempotent:
/// `canonicalize(canonicalize(x)) == canonicalize(x)`.
///
/// ### Arguments
///
/// * `raw` - The free-form reference
///
/// ### Returns
///
/// The canonical form of the reference; empty input canonicalizes to the
/// empty string
pub fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with(TRAIL_PREFIX) {
        return trimmed.to_string();
    }
    let stripped: String = trimmed.chars().filter(|c| !is_zero_width(*c)).collect();
    let normalized = stripped.nfkc().collect::<String>().to_lowercase();
    // NFKC can expand a compatibility character into a space plus combining
    // mark (U+309B, U+00A8), so the final trim must come after normalization;
    // idempotence depends on it.
    normalized.trim().to_string()
}

/// Strategy 1: the modern link field
fn from_unit_key(item: &StudyItem) -> Option<String> {
    non_empty(canonicalize(&item.get_unit_key()))
}

/// Strategy 2: the legacy link field
fn from_legacy_key(item: &StudyItem) -> Option<String> {
    non_empty(canonicalize(&item.get_legacy_unit_key()))
}

/// Strategy 3: the first tag that is not reserved and is longer than 2 chars
fn from_tags(item: &StudyItem) -> Option<String> {
    item.get_tags()
        .iter()
        .map(|tag| canonicalize(tag))
        .find(|tag| tag.chars().count() > 2 && !RESERVED_TAGS.contains(&tag.as_str()))
}

/// Strategy 4: the item's own id, unless it is machine-generated
fn from_own_id(item: &StudyItem) -> Option<String> {
    let id = item.get_id();
    if id.starts_with(GENERATED_ID_PREFIX) || uuid::Uuid::parse_str(id.trim()).is_ok() {
        return None;
    }
    non_empty(canonicalize(&id))
}

fn non_empty(key: String) -> Option<String> {
    if key.is_empty() { None } else { Some(key) }
}

/// Resolves the canonical key of the unit an item belongs to
///
/// Tries the modern link field, the legacy link field, the tag set, and the
/// item's own identifier, in that order, short-circuiting on the first
/// strategy that yields a key.
///
/// ### Arguments
///
/// * `item` - The item to resolve
///
/// ### Returns
///
/// The canonical owning-unit key, or None if the item is unlinked. An
/// unlinked item is not an error: it is simply excluded from per-unit
/// aggregation while staying visible in global collections.
pub fn resolve(item: &StudyItem) -> Option<String> {
    let strategies: [fn(&StudyItem) -> Option<String>; 4] =
        [from_unit_key, from_legacy_key, from_tags, from_own_id];
    strategies.iter().find_map(|strategy| strategy(item))
}

/// Checks whether an item is linked to the given unit key
///
/// True if the resolved key matches, or any tag canonicalizes to the key, or
/// either link field canonicalizes to the key. The redundancy is intentional:
/// different import format versions populated different subsets of these
/// fields.
///
/// ### Arguments
///
/// * `item` - The item to check
/// * `key` - The unit key, in any form accepted by `canonicalize`
///
/// ### Returns
///
/// True if the item belongs to the unit
pub fn is_linked(item: &StudyItem, key: &str) -> bool {
    let key = canonicalize(key);
    if key.is_empty() {
        return false;
    }
    resolve(item).as_deref() == Some(key.as_str())
        || item.get_tags().iter().any(|tag| canonicalize(tag) == key)
        || canonicalize(&item.get_unit_key()) == key
        || canonicalize(&item.get_legacy_unit_key()) == key
}

#[cfg(test)]
mod prop_tests;
