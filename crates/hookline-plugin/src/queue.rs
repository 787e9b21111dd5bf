//! Priority-ordered hook subscriptions.
//!
//! Each hook name owns a max-heap of subscriptions. Higher priorities run
//! first; equal priorities run in subscription order. Dispatch never walks
//! the live heaps: it takes an ordered snapshot, so a handler that
//! subscribes or re-invokes a hook mid-dispatch cannot disturb the pass in
//! progress.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use compact_str::CompactString;

use crate::handler::HandlerRef;

/// A handler subscribed to a hook at a priority.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Hook the handler is subscribed to.
    pub hook: CompactString,

    /// Higher numbers are invoked first.
    pub priority: i32,

    /// Capability-checked handler.
    pub handler: HandlerRef,

    /// Insertion sequence, breaks priority ties.
    seq: u64,
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Subscription {}

impl PartialOrd for Subscription {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Subscription {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier subscriptions rank higher among equal priorities.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Collection of subscriptions across all hooks.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionQueue {
    by_hook: HashMap<CompactString, BinaryHeap<Subscription>>,
    next_seq: u64,
}

impl SubscriptionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to a hook.
    ///
    /// The same handler may subscribe to the same hook any number of times.
    pub fn subscribe(&mut self, hook: impl Into<CompactString>, priority: i32, handler: HandlerRef) {
        let hook = hook.into();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.by_hook
            .entry(hook.clone())
            .or_default()
            .push(Subscription {
                hook,
                priority,
                handler,
                seq,
            });
    }

    /// Ordered copy of the subscriptions for one hook, highest priority first.
    pub fn snapshot(&self, hook: &str) -> Vec<Subscription> {
        let Some(heap) = self.by_hook.get(hook) else {
            return Vec::new();
        };
        let mut ordered = heap.clone().into_sorted_vec();
        ordered.reverse();
        ordered
    }

    /// Handlers subscribed to `hook` in dispatch order.
    ///
    /// Subscriptions for other hooks, and the live queue itself, are left
    /// untouched.
    pub fn drain_in_order(&self, hook: &str) -> Vec<HandlerRef> {
        self.snapshot(hook)
            .into_iter()
            .map(|subscription| subscription.handler)
            .collect()
    }

    /// Number of subscriptions for one hook.
    pub fn handler_count(&self, hook: &str) -> usize {
        self.by_hook.get(hook).map_or(0, BinaryHeap::len)
    }

    /// Total number of subscriptions.
    pub fn len(&self) -> usize {
        self.by_hook.values().map(BinaryHeap::len).sum()
    }

    /// Check if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnPlugin;

    fn handler(name: &str) -> HandlerRef {
        HandlerRef::check(&FnPlugin::instance(name, |_, io| io)).unwrap()
    }

    fn names(handlers: &[HandlerRef]) -> Vec<&str> {
        handlers.iter().map(HandlerRef::name).collect()
    }

    #[test]
    fn test_priority_order() {
        let mut queue = SubscriptionQueue::new();
        queue.subscribe("X", 5, handler("h1"));
        queue.subscribe("X", 10, handler("h2"));
        queue.subscribe("X", 1, handler("h3"));

        assert_eq!(names(&queue.drain_in_order("X")), ["h2", "h1", "h3"]);
    }

    #[test]
    fn test_ties_are_fifo() {
        let mut queue = SubscriptionQueue::new();
        for name in ["a", "b", "c", "d"] {
            queue.subscribe("X", 0, handler(name));
        }
        queue.subscribe("X", 1, handler("first"));

        assert_eq!(
            names(&queue.drain_in_order("X")),
            ["first", "a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_drain_is_scoped_and_non_destructive() {
        let mut queue = SubscriptionQueue::new();
        queue.subscribe("X", 1, handler("x"));
        queue.subscribe("Y", 2, handler("y"));

        assert_eq!(names(&queue.drain_in_order("X")), ["x"]);
        assert_eq!(names(&queue.drain_in_order("X")), ["x"]);
        assert_eq!(queue.handler_count("Y"), 1);
        assert_eq!(queue.len(), 2);
        assert!(queue.drain_in_order("Z").is_empty());
    }

    #[test]
    fn test_snapshot_carries_priorities() {
        let mut queue = SubscriptionQueue::new();
        queue.subscribe("X", -3, handler("low"));
        queue.subscribe("X", 7, handler("high"));

        let priorities: Vec<i32> = queue.snapshot("X").iter().map(|s| s.priority).collect();
        assert_eq!(priorities, [7, -3]);
    }
}
