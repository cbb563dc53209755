// In-process TTL cache for the reference tables
//
// The four reference tables change rarely and back every product page
// load, so their contents are cached for an hour. Entries are evicted
// lazily: a read past the deadline clears the slot and reports a miss.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::catalog::models::RefItem;

const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// The fixed cache slots, one per reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKey {
    Categories,
    Types,
    Objectives,
    Colors,
}

struct Entry {
    items: Vec<RefItem>,
    stored_at: Instant,
}

#[derive(Default)]
struct Slots {
    categories: Option<Entry>,
    types: Option<Entry>,
    objectives: Option<Entry>,
    colors: Option<Entry>,
}

impl Slots {
    fn slot(&mut self, key: MetaKey) -> &mut Option<Entry> {
        match key {
            MetaKey::Categories => &mut self.categories,
            MetaKey::Types => &mut self.types,
            MetaKey::Objectives => &mut self.objectives,
            MetaKey::Colors => &mut self.colors,
        }
    }
}

/// Read-through cache shared across request handlers
pub struct MetaCache {
    ttl: Duration,
    slots: RwLock<Slots>,
}

impl MetaCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: RwLock::new(Slots::default()),
        }
    }

    /// Return the cached snapshot for `key`, or None when the slot is
    /// empty or its entry has outlived the TTL (the stale entry is
    /// dropped on the spot).
    pub async fn get(&self, key: MetaKey) -> Option<Vec<RefItem>> {
        let mut slots = self.slots.write().await;
        let slot = slots.slot(key);

        match slot {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.items.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Store a fresh snapshot for `key`, restarting its TTL
    pub async fn set(&self, key: MetaKey, items: Vec<RefItem>) {
        let mut slots = self.slots.write().await;
        *slots.slot(key) = Some(Entry {
            items,
            stored_at: Instant::now(),
        });
    }
}

impl Default for MetaCache {
    fn default() -> Self {
        Self::new()
    }
}
