//! Integration tests for completion tracking, tier evaluation and deferred reveal

mod common;

use common::{open_engine, test_catalog, titles};
use simulateai_badges::badges::{BadgeUnlockState, CompletionTracker, DeferredRevealQueue, TierEvaluator};
use simulateai_badges::store::MemoryStore;
use simulateai_badges::{Badge, BadgeError, CategoryId, ScenarioId, TierDefinition};

fn ethics() -> CategoryId {
    CategoryId::new("ethics-101").unwrap()
}

fn badge(title: &str) -> Badge {
    Badge::new(ethics(), TierDefinition::new(1, title))
}

#[test]
fn test_repeated_completions_count_once() {
    let mut tracker = CompletionTracker::new();
    let sequence = ["a", "b", "a", "c", "b", "a", "d"];

    for scenario in sequence {
        tracker.record_completion("ethics-101", scenario).unwrap();
    }

    assert_eq!(tracker.completion_count("ethics-101"), 4);
}

#[test]
fn test_evaluate_returns_exactly_unshown_reached_tiers() {
    let mut evaluator = TierEvaluator::new(test_catalog());

    for count in 0..=12usize {
        for preshown in [vec![], vec![3], vec![6], vec![3, 10]] {
            let mut unlocks = BadgeUnlockState::default();
            for requirement in &preshown {
                unlocks.mark_shown(*requirement);
            }

            let got: Vec<u32> = evaluator
                .evaluate(&ethics(), count, &mut unlocks)
                .iter()
                .map(|t| t.requirement)
                .collect();
            let expected: Vec<u32> = [3u32, 6, 10]
                .into_iter()
                .filter(|r| *r as usize <= count && !preshown.contains(r))
                .collect();

            assert_eq!(got, expected, "count {} preshown {:?}", count, preshown);
        }
    }
}

#[test]
fn test_defer_release_roundtrip() {
    let mut queue = DeferredRevealQueue::new(8);
    let s = ScenarioId::new("s").unwrap();

    queue.defer(s.clone(), ethics(), vec![badge("B1"), badge("B2")]);
    assert_eq!(titles(&queue.release(&s)), vec!["B1", "B2"]);
    assert!(queue.release(&s).is_empty());
}

#[test]
fn test_defer_accumulates_before_release() {
    let mut queue = DeferredRevealQueue::new(8);
    let s = ScenarioId::new("s").unwrap();

    queue.defer(s.clone(), ethics(), vec![badge("B1")]);
    queue.defer(s.clone(), ethics(), vec![badge("B2")]);
    assert_eq!(titles(&queue.release(&s)), vec!["B1", "B2"]);
}

#[test]
fn test_release_nonexistent_scenario() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);
    assert_eq!(engine.on_reflection_completed("nonexistent-scenario").unwrap(), vec![]);
}

#[test]
fn test_ethics_101_tier_progression() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);

    let mut unlocked_by = Vec::new();
    for n in 1..=6 {
        let report = engine
            .on_scenario_completed("ethics-101", &format!("scenario-{}", n))
            .unwrap();
        unlocked_by.push(titles(&report.newly_unlocked));
    }

    assert!(unlocked_by[0].is_empty());
    assert!(unlocked_by[1].is_empty());
    assert_eq!(unlocked_by[2], vec!["Ethics Explorer"]);
    assert!(unlocked_by[3].is_empty());
    assert!(unlocked_by[4].is_empty());
    assert_eq!(unlocked_by[5], vec!["Ethics Practitioner"]);

    assert_eq!(
        titles(&engine.on_reflection_completed("scenario-3").unwrap()),
        vec!["Ethics Explorer"]
    );
    assert_eq!(
        titles(&engine.on_reflection_completed("scenario-6").unwrap()),
        vec!["Ethics Practitioner"]
    );
}

#[test]
fn test_reset_makes_tiers_eligible_again() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);

    for n in 1..=3 {
        engine
            .on_scenario_completed("ethics-101", &format!("s{}", n))
            .unwrap();
    }
    engine.on_reflection_completed("s3").unwrap();

    engine.reset_category("ethics-101").unwrap();
    assert_eq!(engine.completion_count("ethics-101"), 0);

    engine.on_scenario_completed("ethics-101", "s1").unwrap();
    engine.on_scenario_completed("ethics-101", "s2").unwrap();
    let report = engine.on_scenario_completed("ethics-101", "s3").unwrap();
    assert_eq!(titles(&report.newly_unlocked), vec!["Ethics Explorer"]);
}

#[test]
fn test_reset_all_clears_every_category() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);
    engine.on_scenario_completed("ethics-101", "s1").unwrap();
    engine.on_scenario_completed("privacy", "p1").unwrap();

    engine.reset_all();

    assert_eq!(engine.completion_count("ethics-101"), 0);
    assert_eq!(engine.completion_count("privacy"), 0);
    assert!(engine.state().is_empty());
}

#[test]
fn test_storage_failure_does_not_block_completion() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);

    store.set_fail_saves(true);
    engine.on_scenario_completed("privacy", "p1").unwrap();
    let report = engine.on_scenario_completed("privacy", "p2").unwrap();

    assert!(report.is_new_completion);
    assert_eq!(report.new_count, 2);
    assert!(engine.has_unsaved_changes());
    assert!(store.stored(&common::learner("l1")).is_none());

    let warning = engine.take_storage_warning().expect("warning raised");
    assert!(warning.message.contains("could not be saved"));
}

#[test]
fn test_unknown_category_records_but_unlocks_nothing() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);

    let report = engine.on_scenario_completed("unlisted", "x").unwrap();
    assert!(report.is_new_completion);
    assert!(report.newly_unlocked.is_empty());
    assert_eq!(engine.completion_count("unlisted"), 1);
}

#[test]
fn test_invalid_ids_are_rejected() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);

    let err = engine.on_scenario_completed("ethics-101", "").unwrap_err();
    assert!(matches!(err, BadgeError::InvalidInput { field: "scenario_id", .. }));
    assert!(engine.reset_category(" ").is_err());
    assert!(engine.expire_pending("").is_err());
}

#[test]
fn test_abandoned_reflections_are_bounded() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);

    // Resetting first makes every completion unlock the privacy tier again
    let mut evicted = 0;
    for n in 0..6 {
        engine.reset_category("privacy").unwrap();
        let report = engine
            .on_scenario_completed("privacy", &format!("p{}", n))
            .unwrap();
        assert_eq!(report.newly_unlocked.len(), 1);
        if report.evicted.is_some() {
            evicted += 1;
        }
    }

    assert_eq!(engine.pending_reveals().len(), 4);
    assert_eq!(evicted, 2);
    assert!(engine.on_reflection_completed("p0").unwrap().is_empty());
    assert_eq!(engine.on_reflection_completed("p5").unwrap().len(), 1);
}

#[test]
fn test_progress_summary() {
    let store = MemoryStore::new();
    let mut engine = open_engine("l1", &store);
    for n in 1..=4 {
        engine
            .on_scenario_completed("ethics-101", &format!("s{}", n))
            .unwrap();
    }

    let progress = engine.progress("ethics-101").unwrap();
    assert_eq!(progress.completed, 4);
    assert_eq!(progress.percent, Some(33));
    assert_eq!(progress.unlocked_tiers.len(), 1);
    assert_eq!(progress.next_tier.map(|t| t.title), Some("Ethics Practitioner".to_string()));
    assert_eq!(progress.remaining_to_next, Some(2));
}
