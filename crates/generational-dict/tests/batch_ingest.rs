//! Integration tests for generational-dict

use generational_dict::{DictError, GenerationalDict, InvalidStateReason, View};

// ============================================================================
// Test Types
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
struct Ship {
    name: &'static str,
    hull: u32,
}

/// One incoming batch of entity updates.
type Batch = Vec<(u32, Ship)>;

fn ship(name: &'static str, hull: u32) -> Ship {
    Ship { name, hull }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fold batches into the store, one generation per non-empty batch.
fn ingest(dict: &mut GenerationalDict<u32, Ship>, batches: Vec<Batch>) {
    for batch in batches {
        dict.advance_generation();
        for (id, update) in batch {
            dict.add(id, update);
        }
        if !dict.is_dirty() {
            dict.abandon_generation()
                .expect("empty generation can be abandoned");
        }
    }
}

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn test_empty_batches_do_not_consume_generations() {
    init_tracing();
    let mut dict = GenerationalDict::new();

    ingest(
        &mut dict,
        vec![
            vec![(1, ship("Anaconda", 100))],
            vec![],
            vec![(1, ship("Anaconda", 80)), (2, ship("Cobra", 100))],
            vec![],
        ],
    );

    assert_eq!(dict.generation(), 2);
    assert_eq!(dict.updates_at_this_generation(), 0);
    assert_eq!(dict.get_as_of(&1, 1), Some(&ship("Anaconda", 100)));
    assert_eq!(dict.get_as_of(&1, 2), Some(&ship("Anaconda", 80)));
    assert_eq!(dict.get_as_of(&2, 1), None);
}

#[test]
fn test_entity_state_per_batch() {
    init_tracing();
    let mut dict = GenerationalDict::new();

    ingest(
        &mut dict,
        vec![
            vec![(1, ship("Anaconda", 100)), (2, ship("Cobra", 100))],
            vec![(2, ship("Cobra", 40))],
            vec![(3, ship("Viper", 100))],
            vec![(2, ship("Cobra", 0))],
        ],
    );

    let damaged = |s: &Ship| s.hull < 100;

    let at_two = dict.snapshot_as_of(2, Some(&damaged));
    assert_eq!(at_two.len(), 1);
    assert_eq!(at_two.get(&2), Some(&ship("Cobra", 40)));

    let at_three = dict.snapshot_as_of(3, None);
    assert_eq!(at_three.len(), 3);

    let destroyed: Vec<_> = dict
        .snapshot_latest_values(Some(&|s: &Ship| s.hull == 0))
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(destroyed, vec!["Cobra"]);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_as_of_monotonic_visibility() {
    let mut dict = GenerationalDict::new();
    let writes = [(3, 'a'), (7, 'b'), (12, 'c')];

    for &(generation, value) in &writes {
        while dict.generation() < generation {
            dict.advance_generation();
        }
        dict.add("k", value);
    }

    for g in 0..20 {
        let expected = writes
            .iter()
            .filter(|(written, _)| *written <= g)
            .next_back()
            .map(|(_, value)| value);
        assert_eq!(dict.get_as_of("k", g), expected, "generation {g}");
    }
}

#[test]
fn test_latest_matches_unbounded_as_of() {
    let mut dict = GenerationalDict::new();
    for round in 0..5_u32 {
        dict.add(round % 2, round);
        dict.advance_generation();
    }

    for key in [0, 1] {
        assert_eq!(dict.get_latest(&key), dict.get_as_of(&key, u64::MAX));
        assert_eq!(
            dict.get_latest(&key),
            dict.get_as_of(&key, dict.generation())
        );
    }
}

#[test]
fn test_abandon_round_trip_leaves_history() {
    let mut dict = GenerationalDict::new();
    dict.add("a", 1);
    dict.advance_generation();
    dict.add("a", 2);
    dict.advance_generation();

    let generation = dict.generation();
    let before = dict.snapshot_latest(None);
    let history_len = dict.history("a").map(|h| h.len());

    dict.advance_generation();
    dict.abandon_generation().unwrap();

    assert_eq!(dict.generation(), generation);
    assert_eq!(dict.updates_at_this_generation(), 0);
    assert_eq!(dict.snapshot_latest(None), before);
    assert_eq!(dict.history("a").map(|h| h.len()), history_len);
}

#[test]
fn test_abandon_with_writes_fails_closed() {
    init_tracing();
    let mut dict = GenerationalDict::new();
    dict.add("a", 1);
    dict.advance_generation();
    dict.add("b", 2);

    let err = dict.abandon_generation().unwrap_err();
    assert!(matches!(
        err,
        DictError::InvalidState {
            generation: 1,
            reason: InvalidStateReason::PendingWrites { updates: 1 },
        }
    ));

    assert_eq!(dict.generation(), 1);
    assert_eq!(dict.updates_at_this_generation(), 1);
    assert_eq!(dict.get_as_of("b", 1), Some(&2));
    assert_eq!(dict.highest_written_generation(), Some(1));
}

#[test]
fn test_snapshot_filter_matches_point_reads() {
    let mut dict = GenerationalDict::new();
    for generation in 0..6_u64 {
        for key in 0..10_u64 {
            if (key + generation) % 3 == 0 {
                dict.add(key, key * 100 + generation);
            }
        }
        dict.advance_generation();
    }

    let even = |value: &u64| value % 2 == 0;
    for g in 0..6 {
        let snapshot = dict.snapshot_as_of(g, Some(&even));
        for key in 0..10_u64 {
            let expected = dict.get_as_of(&key, g).filter(|value| even(*value));
            assert_eq!(snapshot.get(&key), expected, "key {key} at {g}");
        }

        let mut values = dict.snapshot_as_of_values(g, Some(&even));
        values.sort_unstable();
        let mut expected: Vec<u64> = snapshot.values().copied().collect();
        expected.sort_unstable();
        assert_eq!(values, expected);
    }
}

#[test]
fn test_select_views() {
    let mut dict = GenerationalDict::new();
    dict.add("a", 1);
    dict.advance_generation();
    dict.add("a", 2);

    assert_eq!(dict.select_map(View::AsOf(0), None).get("a"), Some(&1));
    assert_eq!(dict.select_map(View::Latest, None).get("a"), Some(&2));
    assert_eq!(dict.select_values(View::Latest, None), vec![2]);
}
