//! Bounded, access-ordered step history.
//!
//! The [`HistoryCache`] maps a [`Position`] to the in-progress traversal
//! count for that cell. It holds at most `capacity` entries and evicts the
//! least recently used one when full. Any read or write through [`get`] or
//! [`advance`] promotes the entry to most recently used; [`peek`] does not.
//!
//! Internally the cache is a slot arena threaded by a doubly-linked list
//! (head = least recent, tail = most recent) plus a hash index from
//! position to slot. Every operation is O(1); freed slots are recycled so
//! a cache at steady state does not allocate.
//!
//! Evicted progress is simply lost. An eviction hook can be installed to
//! observe it.
//!
//! [`get`]: HistoryCache::get
//! [`advance`]: HistoryCache::advance
//! [`peek`]: HistoryCache::peek

use std::collections::HashMap;
use std::fmt;

use trailblazer_rules::Rule;
use trailblazer_types::Position;

/// Progress toward a rule's threshold at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRecord {
    /// Qualifying traversals counted so far (always at least 1).
    pub count: u32,
    /// Tick of the most recent qualifying traversal.
    pub last_tick: u64,
}

/// Result of recording one qualifying traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The threshold was reached; the position's record has been removed.
    Transition(u32),
    /// Progress recorded, threshold not yet reached.
    Progress(u32),
}

impl AdvanceOutcome {
    /// The traversal count after this step.
    pub const fn count(self) -> u32 {
        match self {
            Self::Transition(count) | Self::Progress(count) => count,
        }
    }

    /// Whether the step crossed the threshold.
    pub const fn is_transition(self) -> bool {
        matches!(self, Self::Transition(_))
    }
}

/// Callback invoked with each entry evicted for capacity.
pub type EvictionHook = Box<dyn FnMut(Position, ProgressRecord) + Send>;

#[derive(Debug, Clone, Copy)]
struct Node {
    position: Position,
    record: ProgressRecord,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Fixed-capacity LRU map from position to [`ProgressRecord`].
pub struct HistoryCache {
    capacity: usize,
    index: HashMap<Position, usize>,
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    evictions: u64,
    on_evict: Option<EvictionHook>,
}

impl HistoryCache {
    /// Create an empty cache that will hold at most `capacity` entries.
    ///
    /// A capacity of 0 retains nothing: a first traversal that does not
    /// immediately transition is evicted as soon as it is inserted.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            index: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            evictions: 0,
            on_evict: None,
        }
    }

    /// Install a callback that observes every capacity eviction.
    pub fn set_eviction_hook(&mut self, hook: impl FnMut(Position, ProgressRecord) + Send + 'static) {
        self.on_evict = Some(Box::new(hook));
    }

    /// Swap the eviction hook, returning the previous one.
    ///
    /// Passing `None` removes the hook.
    pub const fn replace_eviction_hook(&mut self, hook: Option<EvictionHook>) -> Option<EvictionHook> {
        std::mem::replace(&mut self.on_evict, hook)
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of positions with unresolved progress.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no progress is being tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total entries evicted for capacity since creation.
    pub const fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Record one qualifying traversal of `position` under `rule` at tick
    /// `now`.
    ///
    /// - No record: the count starts at 1. If that already meets the
    ///   threshold the outcome is a transition and nothing is stored;
    ///   otherwise a record is inserted, evicting the least recently used
    ///   entry if the cache is full.
    /// - Existing record: if the rule has a timeout and more than
    ///   `timeout_ticks` elapsed since the last traversal, the count resets
    ///   to 1; otherwise it increments. The timestamp becomes `now`.
    ///
    /// On [`AdvanceOutcome::Transition`] the position's record is removed,
    /// so the next arrival starts a fresh cycle.
    pub fn advance(&mut self, position: Position, rule: &Rule, now: u64) -> AdvanceOutcome {
        let threshold = rule.step_threshold();

        let Some(slot) = self.index.get(&position).copied() else {
            return self.advance_new(position, threshold, now);
        };
        let Some(node) = self.nodes.get_mut(slot) else {
            self.index.remove(&position);
            return self.advance_new(position, threshold, now);
        };

        let record = &mut node.record;
        let elapsed = now.saturating_sub(record.last_tick);
        if rule.timeout_ticks() > 0 && elapsed > rule.timeout_ticks() {
            tracing::debug!(
                %position,
                rule = rule.name(),
                elapsed,
                previous_count = record.count,
                "step timeout, progress reset"
            );
            record.count = 1;
        } else {
            record.count = record.count.saturating_add(1);
            tracing::debug!(%position, rule = rule.name(), count = record.count, "step counted");
        }
        record.last_tick = now;
        let count = record.count;

        if count >= threshold {
            self.remove(&position);
            AdvanceOutcome::Transition(count)
        } else {
            self.touch(slot);
            AdvanceOutcome::Progress(count)
        }
    }

    fn advance_new(&mut self, position: Position, threshold: u32, now: u64) -> AdvanceOutcome {
        if threshold <= 1 {
            return AdvanceOutcome::Transition(1);
        }
        self.insert(
            position,
            ProgressRecord {
                count: 1,
                last_tick: now,
            },
        );
        AdvanceOutcome::Progress(1)
    }

    /// Read a record and promote it to most recently used.
    pub fn get(&mut self, position: &Position) -> Option<ProgressRecord> {
        let slot = self.index.get(position).copied()?;
        let record = self.nodes.get(slot)?.record;
        self.touch(slot);
        Some(record)
    }

    /// Read a record without changing recency.
    pub fn peek(&self, position: &Position) -> Option<ProgressRecord> {
        let slot = self.index.get(position).copied()?;
        self.nodes.get(slot).map(|node| node.record)
    }

    /// Whether `position` has a record.
    pub fn contains(&self, position: &Position) -> bool {
        self.index.contains_key(position)
    }

    /// Insert or replace a record, promoting it to most recently used.
    ///
    /// Evicts least recently used entries until the cache is back within
    /// capacity. The entry just inserted is never the victim unless the
    /// capacity is 0.
    pub fn insert(&mut self, position: Position, record: ProgressRecord) {
        if let Some(slot) = self.index.get(&position).copied() {
            if let Some(node) = self.nodes.get_mut(slot) {
                node.record = record;
                self.touch(slot);
                return;
            }
            self.index.remove(&position);
        }

        let node = Node {
            position,
            record,
            prev: None,
            next: None,
        };
        let slot = if let Some(slot) = self.free.pop() {
            if let Some(existing) = self.nodes.get_mut(slot) {
                *existing = node;
            }
            slot
        } else {
            self.nodes.push(node);
            self.nodes.len().saturating_sub(1)
        };
        self.index.insert(position, slot);
        self.push_back(slot);

        while self.index.len() > self.capacity {
            if !self.evict_lru() {
                break;
            }
        }
    }

    /// Remove a record, returning it if present.
    pub fn remove(&mut self, position: &Position) -> Option<ProgressRecord> {
        let slot = self.index.remove(position)?;
        self.unlink(slot);
        self.free.push(slot);
        self.nodes.get(slot).map(|node| node.record)
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Positions from least to most recently used.
    pub fn lru_order(&self) -> Vec<Position> {
        let mut order = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(node) = self.nodes.get(slot) else {
                break;
            };
            order.push(node.position);
            cursor = node.next;
        }
        order
    }

    /// Evict the least recently used entry. Returns `false` if empty.
    fn evict_lru(&mut self) -> bool {
        let Some(slot) = self.head else {
            return false;
        };
        let Some(node) = self.nodes.get(slot).copied() else {
            return false;
        };
        self.index.remove(&node.position);
        self.unlink(slot);
        self.free.push(slot);
        self.evictions = self.evictions.saturating_add(1);
        tracing::trace!(position = %node.position, count = node.record.count, "history evicted");
        if let Some(hook) = self.on_evict.as_mut() {
            hook(node.position, node.record);
        }
        true
    }

    fn touch(&mut self, slot: usize) {
        if self.tail == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.push_back(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let Some(node) = self.nodes.get_mut(slot) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());
        match prev {
            Some(p) => {
                if let Some(prev_node) = self.nodes.get_mut(p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = self.nodes.get_mut(n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn push_back(&mut self, slot: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.nodes.get_mut(slot) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(tail_node) = self.nodes.get_mut(t) {
                    tail_node.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }
}

impl fmt::Debug for HistoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryCache")
            .field("capacity", &self.capacity)
            .field("len", &self.index.len())
            .field("evictions", &self.evictions)
            .field("has_eviction_hook", &self.on_evict.is_some())
            .finish_non_exhaustive()
    }
}
