// Unit tests for the matching engine

use pairing_bot::core::{is_compatible, partition, EngineError, Matcher};
use pairing_bot::models::{Level, Participant};
use std::collections::HashSet;

const LEVELS: [Level; 3] = [Level::Easy, Level::Medium, Level::Hard];

fn participant(id: &str, experience: Level, prefs: &[Level]) -> Participant {
    Participant::new(id, format!("{}@example.com", id), experience, prefs.iter().copied())
}

/// Deterministic mix of experiences and preferences
fn population(count: usize, salt: usize) -> Vec<Participant> {
    (0..count)
        .map(|i| {
            let experience = LEVELS[(i * 7 + salt) % 3];
            let pref = LEVELS[(i * 5 + salt * 3 + 1) % 3];
            participant(&format!("p{}", i), experience, &[pref])
        })
        .collect()
}

fn valid_pairs_in(order: &[Participant]) -> usize {
    order
        .chunks_exact(2)
        .filter(|pair| is_compatible(&pair[0], &pair[1]))
        .count()
}

/// Best score over every permutation, computed the slow way
fn brute_force_best(people: &[Participant]) -> usize {
    fn walk(people: &[Participant], used: &mut Vec<bool>, order: &mut Vec<usize>, best: &mut usize) {
        if order.len() == people.len() {
            let ordered: Vec<Participant> = order.iter().map(|&i| people[i].clone()).collect();
            *best = (*best).max(valid_pairs_in(&ordered));
            return;
        }
        for i in 0..people.len() {
            if !used[i] {
                used[i] = true;
                order.push(i);
                walk(people, used, order, best);
                order.pop();
                used[i] = false;
            }
        }
    }

    let mut best = 0;
    walk(people, &mut vec![false; people.len()], &mut Vec::new(), &mut best);
    best
}

fn ids(people: &[Participant]) -> Vec<String> {
    let mut ids: Vec<String> = people.iter().map(|p| p.id.clone()).collect();
    ids.sort();
    ids
}

#[test]
fn test_ordering_is_permutation_of_input() {
    let matcher = Matcher::new(4, 2);

    for count in 0..=7 {
        let people = population(count, count);
        let result = matcher.find_matches(people.clone()).unwrap();

        assert_eq!(ids(&result.order), ids(&people), "count {}", count);
        let unique: HashSet<&str> = result.order.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(unique.len(), count);
    }
}

#[test]
fn test_score_bounded_by_half_and_actual_pairs() {
    let matcher = Matcher::new(3, 2);

    for count in 0..=7 {
        let result = matcher.find_matches(population(count, 1)).unwrap();

        assert!(result.valid_pairs <= count / 2);
        assert!(result.valid_pairs <= valid_pairs_in(&result.order));
    }
}

#[test]
fn test_search_finds_true_maximum() {
    let matcher = Matcher::new(4, 2);

    for salt in 0..6 {
        for count in 2..=6 {
            let people = population(count, salt);
            let expected = brute_force_best(&people);
            let result = matcher.find_matches(people).unwrap();

            assert_eq!(result.valid_pairs, expected, "salt {} count {}", salt, count);
            assert_eq!(valid_pairs_in(&result.order), expected);
        }
    }
}

#[test]
fn test_reaches_half_when_attainable() {
    // Everyone accepts easy partners, so any ordering is perfect
    let people: Vec<Participant> = (0..8)
        .map(|i| participant(&i.to_string(), LEVELS[i % 3], &[Level::Easy]))
        .collect();

    let result = Matcher::new(4, 2).find_matches(people).unwrap();
    assert_eq!(result.valid_pairs, 4);
}

#[test]
fn test_predicate_checks_both_directions() {
    // a accepts b (easy pref, b is hard); b rejects a (hard pref, a is easy)
    let a = participant("a", Level::Easy, &[Level::Easy]);
    let b = participant("b", Level::Hard, &[Level::Hard]);

    assert!(!is_compatible(&a, &b));
    assert!(!is_compatible(&b, &a));

    let result = Matcher::new(2, 1).find_matches(vec![a, b]).unwrap();
    assert_eq!(result.valid_pairs, 0);
    assert_eq!(result.pairing.pairs.len(), 1);
}

#[test]
fn test_partition_law() {
    for count in 0..=9 {
        let people = population(count, 2);
        let pairing = partition(people.clone());

        assert_eq!(pairing.pairs.len(), count / 2);
        if count % 2 == 0 {
            assert!(pairing.leftover.is_none());
        } else {
            assert_eq!(pairing.leftover.as_ref(), people.last());
        }
    }
}

#[test]
fn test_scenario_two_hard_participants() {
    let a = participant("A", Level::Hard, &[Level::Hard]);
    let b = participant("B", Level::Hard, &[Level::Hard]);

    let result = Matcher::new(2, 2).find_matches(vec![a, b]).unwrap();

    assert_eq!(result.valid_pairs, 1);
    assert_eq!(result.pairing.pairs.len(), 1);
    let pair = &result.pairing.pairs[0];
    let members: HashSet<&str> = [pair.first.id.as_str(), pair.second.id.as_str()].into_iter().collect();
    let expected: HashSet<&str> = ["A", "B"].into_iter().collect();
    assert_eq!(members, expected);
    assert!(pair.compatible);
}

#[test]
fn test_scenario_incompatible_pair_still_delivered() {
    let a = participant("A", Level::Easy, &[Level::Hard]);
    let b = participant("B", Level::Easy, &[Level::Easy]);

    let result = Matcher::new(2, 2).find_matches(vec![a, b]).unwrap();

    assert_eq!(result.valid_pairs, 0);
    assert_eq!(result.pairing.pairs.len(), 1);
    assert!(!result.pairing.pairs[0].compatible);
    assert!(result.pairing.leftover.is_none());
}

#[test]
fn test_scenario_five_compatible() {
    let people: Vec<Participant> = (0..5)
        .map(|i| participant(&format!("p{}", i), Level::Medium, &[Level::Easy, Level::Medium]))
        .collect();

    let result = Matcher::new(4, 2).find_matches(people).unwrap();

    assert_eq!(result.valid_pairs, 2);
    assert_eq!(result.pairing.pairs.len(), 2);
    assert_eq!(result.pairing.leftover.as_ref(), result.order.last());
}

#[test]
fn test_scenario_zero_participants() {
    let result = Matcher::new(4, 2).find_matches(vec![]).unwrap();

    assert!(result.order.is_empty());
    assert_eq!(result.valid_pairs, 0);
    assert!(result.pairing.pairs.is_empty());
    assert!(result.pairing.leftover.is_none());
}

#[test]
fn test_invalid_input_rejected() {
    let matcher = Matcher::new(2, 2);

    let duplicate = vec![
        participant("x", Level::Easy, &[Level::Easy]),
        participant("x", Level::Easy, &[Level::Easy]),
    ];
    assert!(matches!(matcher.find_matches(duplicate), Err(EngineError::InvalidInput(_))));

    let unconfigured = vec![participant("y", Level::Easy, &[])];
    assert!(matches!(matcher.find_matches(unconfigured), Err(EngineError::InvalidInput(_))));
}
