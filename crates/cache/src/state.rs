use std::collections::{BTreeMap, HashMap, HashSet};

use tokio::time::Instant;

use crate::Payload;

struct Entry {
    payload: Payload,
    expires_at: Instant,
    tags: Vec<String>,
    seq: u64,
}

/// Entries plus the tag index and insertion order. Every mutation keeps all
/// three in sync.
#[derive(Default)]
pub(crate) struct State {
    entries: HashMap<String, Entry>,
    tags: HashMap<String, HashSet<String>>,
    generations: HashMap<String, u64>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
    capacity: Option<usize>,
}

impl State {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub(crate) fn lookup(&mut self, key: &str, now: Instant) -> Option<Payload> {
        let entry = self.entries.get(key)?;
        if now < entry.expires_at {
            return Some(entry.payload.clone());
        }
        self.remove(key);
        None
    }

    pub(crate) fn store(&mut self, key: &str, payload: Payload, tags: &[&str], expires_at: Instant) {
        self.remove(key);
        for tag in tags {
            self.tags
                .entry((*tag).to_owned())
                .or_default()
                .insert(key.to_owned());
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_owned());
        self.entries.insert(
            key.to_owned(),
            Entry {
                payload,
                expires_at,
                tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
                seq,
            },
        );
        self.evict_over_capacity();
    }

    /// Drop the oldest entries until the capacity holds again.
    fn evict_over_capacity(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.entries.len() > capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            if self.remove(&oldest) {
                tracing::debug!(key = %oldest, capacity, "cache full; oldest entry evicted");
            }
        }
    }

    /// Store only if none of `tags` was invalidated since `generation` was read.
    pub(crate) fn store_if_current(
        &mut self,
        key: &str,
        payload: Payload,
        tags: &[&str],
        expires_at: Instant,
        generation: u64,
    ) -> bool {
        if self.generation(tags) != generation {
            return false;
        }
        self.store(key, payload, tags, expires_at);
        true
    }

    /// Combined invalidation counter of `tags`. Counters only grow, so any
    /// invalidation of one of the tags changes the sum.
    pub(crate) fn generation(&self, tags: &[&str]) -> u64 {
        tags.iter()
            .map(|tag| self.generations.get(*tag).copied().unwrap_or(0))
            .fold(0u64, u64::wrapping_add)
    }

    pub(crate) fn invalidate(&mut self, tags: &[&str]) -> usize {
        let mut removed = 0;
        for tag in tags {
            *self.generations.entry((*tag).to_owned()).or_insert(0) += 1;
            let Some(keys) = self.tags.remove(*tag) else {
                continue;
            };
            for key in keys {
                if self.remove(&key) {
                    removed += 1;
                }
            }
        }
        removed
    }

    pub(crate) fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| now >= entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect();
        expired.iter().filter(|key| self.remove(key)).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn remove(&mut self, key: &str) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        self.order.remove(&entry.seq);
        for tag in &entry.tags {
            if let Some(keys) = self.tags.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tags.remove(tag);
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[test]
    fn replacing_an_entry_moves_it_between_tags() {
        let mut state = State::default();
        state.store("k", "v1".into(), &["a"], later());
        state.store("k", "v2".into(), &["b"], later());

        assert_eq!(state.invalidate(&["a"]), 0);
        assert_eq!(state.invalidate(&["b"]), 1);
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn entries_under_several_tags_are_unlinked_everywhere() {
        let mut state = State::default();
        state.store("k", "v".into(), &["a", "b"], later());

        assert_eq!(state.invalidate(&["a"]), 1);
        assert!(state.tags.is_empty());
        assert_eq!(state.invalidate(&["b"]), 0);
    }

    #[test]
    fn generation_changes_when_any_tag_is_invalidated() {
        let mut state = State::default();
        let before = state.generation(&["a", "b"]);
        state.invalidate(&["b"]);
        assert_ne!(state.generation(&["a", "b"]), before);
        assert!(!state.store_if_current("k", "v".into(), &["a", "b"], later(), before));
        assert!(state.lookup("k", Instant::now()).is_none());
    }

    #[test]
    fn oldest_entries_are_evicted_beyond_capacity() {
        let mut state = State::with_capacity(2);
        state.store("getAllAuthors-1-3", "a".into(), &["a"], later());
        state.store("getAllAuthors-2-3", "b".into(), &["a"], later());
        state.store("getAllAuthors-3-3", "c".into(), &["a"], later());

        let now = Instant::now();
        assert_eq!(state.len(), 2);
        assert!(state.lookup("getAllAuthors-1-3", now).is_none());
        assert!(state.lookup("getAllAuthors-3-3", now).is_some());
        assert_eq!(state.invalidate(&["a"]), 2);
        assert!(state.order.is_empty());
    }

    #[test]
    fn replacing_a_key_refreshes_its_age() {
        let mut state = State::with_capacity(2);
        state.store("old", "v".into(), &["a"], later());
        state.store("new", "v".into(), &["a"], later());
        state.store("old", "v2".into(), &["a"], later());
        state.store("newest", "v".into(), &["a"], later());

        let now = Instant::now();
        assert!(state.lookup("new", now).is_none());
        assert_eq!(state.lookup("old", now).as_deref(), Some("v2"));
        assert_eq!(state.order.len(), 2);
    }
}
