use super::*;
use crate::models::ItemKind;
use proptest::prelude::*;

fn config() -> SrsConfig {
    SrsConfig::default()
}

/// Builds an item carrying an arbitrary stored progress state
///
/// Deliberately allows malformed numbers: the updater has to recover from
/// whatever a bad import left behind.
fn item_in_state(stability: f64, difficulty: f64, reviewed_days_ago: Option<i64>) -> StudyItem {
    let now = Utc::now();
    let mut item = StudyItem::new(ItemKind::Question, "prompt".to_string(), 1.0, now);
    if let Some(days) = reviewed_days_ago {
        let at = now - Duration::days(days);
        let state = ReviewState {
            stability,
            difficulty,
            mastery_score: 50.0,
            next_review_at: at,
            last_reviewed_at: at,
            timing: TimingClass::Ok,
        };
        item.apply_review(&state, true, Rating::Good, 10.0);
    }
    item
}

fn arb_stored_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1e6..1e6f64,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(0.0),
    ]
}

fn arb_rating() -> impl Strategy<Value = Rating> {
    (0..=3i32).prop_map(|v| Rating::from_i32(v).unwrap())
}

proptest! {
    /// After any update: mastery in [0,100], difficulty in [0,1],
    /// 0 < stability <= cap, all finite
    #[test]
    fn prop_output_ranges_hold_for_any_input(
        stability in arb_stored_f64(),
        difficulty in arb_stored_f64(),
        reviewed_days_ago in proptest::option::of(0..3650i64),
        was_correct in any::<bool>(),
        rating in arb_rating(),
        response_secs in arb_stored_f64(),
    ) {
        let item = item_in_state(stability, difficulty, reviewed_days_ago);
        let state = update(&item, was_correct, rating, response_secs, Utc::now(), &config());

        prop_assert!(state.stability.is_finite());
        prop_assert!(state.stability > 0.0 && state.stability <= config().stability_cap_days);
        prop_assert!((0.0..=1.0).contains(&state.difficulty));
        prop_assert!((0.0..=100.0).contains(&state.mastery_score));
    }

    /// An incorrect answer never increases stability
    #[test]
    fn prop_failure_never_grows_stability(
        stability in 0.5..365.0f64,
        difficulty in 0.0..1.0f64,
        days_ago in 0..400i64,
    ) {
        let item = item_in_state(stability, difficulty, Some(days_ago));
        let state = update(&item, false, Rating::Again, 10.0, Utc::now(), &config());
        prop_assert!(state.stability <= item.get_stability());
    }

    /// A correct answer never decreases stability (short of the cap clamp)
    #[test]
    fn prop_success_never_shrinks_stability(
        stability in 0.5..365.0f64,
        difficulty in 0.0..1.0f64,
        days_ago in 0..400i64,
        rating in (1..=3i32).prop_map(|v| Rating::from_i32(v).unwrap()),
    ) {
        let item = item_in_state(stability, difficulty, Some(days_ago));
        let state = update(&item, true, rating, 10.0, Utc::now(), &config());
        prop_assert!(state.stability >= item.get_stability().min(config().stability_cap_days));
    }

    /// The next due time is always strictly in the future
    #[test]
    fn prop_next_review_is_in_the_future(
        stability in arb_stored_f64(),
        was_correct in any::<bool>(),
        rating in arb_rating(),
    ) {
        let item = item_in_state(stability, 0.3, Some(1));
        let now = Utc::now();
        let state = update(&item, was_correct, rating, 10.0, now, &config());
        prop_assert!(state.next_review_at > now);
    }

    /// Mastery derived from stability is monotone in stability at fixed
    /// difficulty
    #[test]
    fn prop_mastery_monotone_in_stability(
        lo in 0.5..180.0f64,
        delta in 0.1..180.0f64,
        difficulty in 0.0..1.0f64,
    ) {
        let cap = config().stability_cap_days;
        let low = mastery_from_stability(lo, difficulty, cap);
        let high = mastery_from_stability(lo + delta, difficulty, cap);
        prop_assert!(high >= low);
    }

    /// Higher difficulty never raises mastery at equal stability
    #[test]
    fn prop_difficulty_suppresses_mastery(
        stability in 0.5..365.0f64,
        d_lo in 0.0..1.0f64,
        d_delta in 0.0..1.0f64,
    ) {
        let cap = config().stability_cap_days;
        let d_hi = (d_lo + d_delta).min(1.0);
        let easy = mastery_from_stability(stability, d_lo, cap);
        let hard = mastery_from_stability(stability, d_hi, cap);
        prop_assert!(hard <= easy);
    }
}
