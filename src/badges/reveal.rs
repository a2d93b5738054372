//! Deferred badge reveal
//!
//! Badges earned by completing a scenario are parked here, keyed by that
//! scenario, until its reflection step finishes. Each scenario id is either
//! empty or pending:
//!
//! ```text
//!            defer (non-empty)          release / expire
//!   Empty ───────────────────▶ Pending ──────────────────▶ Empty
//!                              │    ▲
//!                              └────┘ defer (appends)
//! ```
//!
//! The number of pending scenarios is bounded; on overflow the oldest entry
//! is dropped.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::domain::{Badge, CategoryId, ScenarioId};

/// Badges waiting for a scenario's reflection step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredEntry {
    pub scenario: ScenarioId,
    pub category: CategoryId,
    pub badges: Vec<Badge>,
    pub created_at: DateTime<Utc>,
    /// Insertion order, used to find the oldest entry
    seq: u64,
}

/// Pending badges keyed by scenario id
#[derive(Debug, Clone)]
pub struct DeferredRevealQueue {
    entries: HashMap<ScenarioId, DeferredEntry>,
    capacity: usize,
    next_seq: u64,
}

impl DeferredRevealQueue {
    /// Create a queue holding at most `capacity` pending scenarios (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of scenarios with pending badges
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of badges waiting across all scenarios
    pub fn pending_badge_count(&self) -> usize {
        self.entries.values().map(|e| e.badges.len()).sum()
    }

    pub fn pending(&self, scenario: &ScenarioId) -> Option<&DeferredEntry> {
        self.entries.get(scenario)
    }

    /// Park badges until `scenario`'s reflection completes.
    ///
    /// An empty `badges` list does nothing. A second call for a scenario
    /// that is still pending appends. Returns the entry evicted to make room,
    /// if any.
    pub fn defer(
        &mut self,
        scenario: ScenarioId,
        category: CategoryId,
        badges: Vec<Badge>,
    ) -> Option<DeferredEntry> {
        self.defer_at(scenario, category, badges, Utc::now())
    }

    /// [`defer`](Self::defer) with an explicit creation time
    pub fn defer_at(
        &mut self,
        scenario: ScenarioId,
        category: CategoryId,
        badges: Vec<Badge>,
        now: DateTime<Utc>,
    ) -> Option<DeferredEntry> {
        if badges.is_empty() {
            return None;
        }

        if let Some(entry) = self.entries.get_mut(&scenario) {
            if entry.category != category {
                debug!(
                    scenario = %scenario,
                    pending_category = %entry.category,
                    category = %category,
                    "Appending badges from another category"
                );
            }
            entry.badges.extend(badges);
            debug!(scenario = %scenario, pending = entry.badges.len(), "Appended deferred badges");
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        debug!(scenario = %scenario, category = %category, badges = badges.len(), "Deferred badges");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            scenario.clone(),
            DeferredEntry {
                scenario,
                category,
                badges,
                created_at: now,
                seq,
            },
        );

        evicted
    }

    /// Hand out and forget the badges pending for `scenario`.
    ///
    /// Returns an empty list when nothing is pending.
    pub fn release(&mut self, scenario: &ScenarioId) -> Vec<Badge> {
        match self.entries.remove(scenario) {
            Some(entry) => {
                info!(scenario = %scenario, badges = entry.badges.len(), "Releasing deferred badges");
                entry.badges
            }
            None => Vec::new(),
        }
    }

    /// Discard the badges pending for `scenario`; returns how many were dropped
    pub fn expire(&mut self, scenario: &ScenarioId) -> usize {
        match self.entries.remove(scenario) {
            Some(entry) => {
                log_discarded(&entry, "expired");
                entry.badges.len()
            }
            None => 0,
        }
    }

    /// Discard every entry created more than `max_age` before `now`, oldest first
    pub fn expire_older_than(&mut self, now: DateTime<Utc>, max_age: Duration) -> Vec<DeferredEntry> {
        let cutoff = now - max_age;
        let stale: Vec<ScenarioId> = self
            .entries
            .values()
            .filter(|e| e.created_at < cutoff)
            .map(|e| e.scenario.clone())
            .collect();

        let mut removed: Vec<DeferredEntry> = stale
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect();
        removed.sort_by_key(|e| e.seq);
        for entry in &removed {
            log_discarded(entry, "stale");
        }
        removed
    }

    /// Discard everything (session end), oldest first
    pub fn expire_all(&mut self) -> Vec<DeferredEntry> {
        let mut removed: Vec<DeferredEntry> = self.entries.drain().map(|(_, e)| e).collect();
        removed.sort_by_key(|e| e.seq);
        for entry in &removed {
            log_discarded(entry, "session ended");
        }
        removed
    }

    fn evict_oldest(&mut self) -> Option<DeferredEntry> {
        let oldest = self
            .entries
            .values()
            .min_by_key(|e| e.seq)
            .map(|e| e.scenario.clone())?;
        let entry = self.entries.remove(&oldest)?;
        warn!(
            scenario = %entry.scenario,
            badges = entry.badges.len(),
            capacity = self.capacity,
            "Pending badge queue full, dropping oldest entry"
        );
        Some(entry)
    }
}

fn log_discarded(entry: &DeferredEntry, reason: &str) {
    let titles: Vec<&str> = entry.badges.iter().map(|b| b.title()).collect();
    info!(
        scenario = %entry.scenario,
        category = %entry.category,
        reason,
        "Discarded unrevealed badges: {}",
        titles.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TierDefinition;

    fn sid(s: &str) -> ScenarioId {
        ScenarioId::new(s).unwrap()
    }

    fn cid() -> CategoryId {
        CategoryId::new("ethics-101").unwrap()
    }

    fn badge(requirement: u32) -> Badge {
        Badge::new(cid(), TierDefinition::new(requirement, format!("B{}", requirement)))
    }

    fn titles(badges: &[Badge]) -> Vec<String> {
        badges.iter().map(|b| b.title().to_string()).collect()
    }

    #[test]
    fn test_defer_then_release_once() {
        let mut queue = DeferredRevealQueue::new(8);
        queue.defer(sid("s1"), cid(), vec![badge(1), badge(2)]);

        assert_eq!(titles(&queue.release(&sid("s1"))), vec!["B1", "B2"]);
        assert!(queue.release(&sid("s1")).is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_second_defer_appends() {
        let mut queue = DeferredRevealQueue::new(8);
        queue.defer(sid("s1"), cid(), vec![badge(1)]);
        queue.defer(sid("s1"), cid(), vec![badge(2)]);

        assert_eq!(queue.len(), 1);
        assert_eq!(titles(&queue.release(&sid("s1"))), vec!["B1", "B2"]);
    }

    #[test]
    fn test_empty_defer_is_noop() {
        let mut queue = DeferredRevealQueue::new(8);
        assert!(queue.defer(sid("s1"), cid(), Vec::new()).is_none());
        assert!(queue.pending(&sid("s1")).is_none());
    }

    #[test]
    fn test_release_unknown_is_empty() {
        let mut queue = DeferredRevealQueue::new(8);
        assert!(queue.release(&sid("nonexistent-scenario")).is_empty());
    }

    #[test]
    fn test_scenarios_are_independent() {
        let mut queue = DeferredRevealQueue::new(8);
        queue.defer(sid("a"), cid(), vec![badge(1)]);
        queue.defer(sid("b"), cid(), vec![badge(3)]);

        assert_eq!(titles(&queue.release(&sid("b"))), vec!["B3"]);
        assert_eq!(queue.pending_badge_count(), 1);
        assert_eq!(titles(&queue.release(&sid("a"))), vec!["B1"]);
    }

    #[test]
    fn test_expire_discards_and_is_safe_when_absent() {
        let mut queue = DeferredRevealQueue::new(8);
        queue.defer(sid("s1"), cid(), vec![badge(1), badge(2)]);

        assert_eq!(queue.expire(&sid("s1")), 2);
        assert_eq!(queue.expire(&sid("s1")), 0);
        assert!(queue.release(&sid("s1")).is_empty());
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut queue = DeferredRevealQueue::new(2);
        assert!(queue.defer(sid("a"), cid(), vec![badge(1)]).is_none());
        assert!(queue.defer(sid("b"), cid(), vec![badge(2)]).is_none());
        // Appending to a pending scenario never evicts
        assert!(queue.defer(sid("a"), cid(), vec![badge(3)]).is_none());

        let evicted = queue.defer(sid("c"), cid(), vec![badge(4)]).unwrap();
        assert_eq!(evicted.scenario, sid("a"));
        assert_eq!(titles(&evicted.badges), vec!["B1", "B3"]);
        assert_eq!(queue.len(), 2);
        assert!(queue.pending(&sid("a")).is_none());
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let mut queue = DeferredRevealQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.defer(sid("a"), cid(), vec![badge(1)]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_expire_older_than() {
        let mut queue = DeferredRevealQueue::new(8);
        let start = Utc::now();
        queue.defer_at(sid("old"), cid(), vec![badge(1)], start);
        queue.defer_at(sid("new"), cid(), vec![badge(2)], start + Duration::minutes(20));

        let removed = queue.expire_older_than(start + Duration::minutes(30), Duration::minutes(15));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].scenario, sid("old"));
        assert!(queue.pending(&sid("new")).is_some());
    }

    #[test]
    fn test_expire_all_in_insertion_order() {
        let mut queue = DeferredRevealQueue::new(8);
        queue.defer(sid("b"), cid(), vec![badge(1)]);
        queue.defer(sid("a"), cid(), vec![badge(2)]);

        let removed: Vec<_> = queue.expire_all().into_iter().map(|e| e.scenario).collect();
        assert_eq!(removed, vec![sid("b"), sid("a")]);
        assert!(queue.is_empty());
    }
}
