mod common;

use football_match_engine::simulate;

/// spec §8 "Determinism": `simulate(inputs, seed)` produces byte-identical
/// Tick sequences across runs on the same implementation.
#[test]
fn same_seed_produces_byte_identical_tick_sequences() {
    let inputs = common::baseline_inputs(0);

    let first: Vec<_> = simulate(&inputs, 42).expect("valid inputs").collect();
    let second: Vec<_> = simulate(&inputs, 42).expect("valid inputs").collect();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        let json_a = serde_json::to_string(a).unwrap();
        let json_b = serde_json::to_string(b).unwrap();
        assert_eq!(json_a, json_b);
    }
}

/// A different seed is not required to diverge by law, but in practice the
/// RNG stream governs enough decisions that two full matches should not
/// collapse to the same event log.
#[test]
fn different_seeds_yield_different_event_logs() {
    let inputs = common::baseline_inputs(0);

    let a: Vec<_> = simulate(&inputs, 1).expect("valid inputs").collect();
    let b: Vec<_> = simulate(&inputs, 2).expect("valid inputs").collect();

    let events_a: usize = a.iter().map(|t| t.events.len()).sum();
    let events_b: usize = b.iter().map(|t| t.events.len()).sum();
    let score_a = a.last().unwrap().score;
    let score_b = b.last().unwrap().score;

    assert!(
        events_a != events_b || (score_a.home, score_a.away) != (score_b.home, score_b.away),
        "two different seeds produced an identical match outcome"
    );
}
