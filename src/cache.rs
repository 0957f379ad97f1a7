//! Bounded cache of decode results keyed by `(PGN, payload)`.
//!
//! Keys are kept in a [`Deque`] in eviction order next to a
//! [`FnvIndexMap`] holding the results, so evicting the oldest entry is a
//! `pop_front` plus one map removal. With [`EvictionPolicy::Fifo`] the deque
//! is in insertion order and a read never moves an entry; with
//! [`EvictionPolicy::Lru`] a read moves the entry to the back.

#[cfg(feature = "defmt")]
use defmt::trace;
use heapless::{Deque, FnvIndexMap};

use crate::{Decoded, DecoderConfig, EvictionPolicy, Pgn, RawFrame};

/// Storage slots reserved for the cache. The configured capacity can be
/// anything from 1 up to this.
pub const SLOTS: usize = 128;

/// Two frames hit the same entry only if they have the same PGN and
/// byte-identical data, length included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CacheKey {
    pgn: Pgn,
    len: u8,
    data: [u8; 8],
}

impl CacheKey {
    #[must_use]
    pub fn new(pgn: Pgn, data: &[u8]) -> Self {
        let len = data.len().min(8);
        let mut bytes = [0; 8];
        bytes[..len].copy_from_slice(&data[..len]);

        Self {
            pgn,
            len: len as u8,
            data: bytes,
        }
    }

    /// Key for a frame whose PGN is in the decode table.
    #[must_use]
    pub fn for_frame(pgn: Pgn, frame: &RawFrame) -> Self {
        Self::new(pgn, &frame.data)
    }

    #[must_use]
    pub fn pgn(&self) -> Pgn {
        self.pgn
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u32,
    pub misses: u32,
    pub evictions: u32,
}

pub struct DecodeCache {
    entries: FnvIndexMap<CacheKey, Decoded, SLOTS>,
    order: Deque<CacheKey, SLOTS>,
    capacity: usize,
    policy: EvictionPolicy,
    hits: u32,
    misses: u32,
    evictions: u32,
}

impl Default for DecodeCache {
    fn default() -> Self {
        Self::new(DecoderConfig::DEFAULT)
    }
}

impl DecodeCache {
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self {
            entries: FnvIndexMap::new(),
            order: Deque::new(),
            capacity: config.effective_capacity(),
            policy: config.policy,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a key, counting the hit or miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<&Decoded> {
        if !self.entries.contains_key(key) {
            self.misses = self.misses.wrapping_add(1);
            return None;
        }

        self.hits = self.hits.wrapping_add(1);
        if self.policy == EvictionPolicy::Lru {
            self.promote(key);
        }

        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a result, evicting as many entries as needed to stay within
    /// capacity. Returns the evicted key, if any.
    pub fn insert(&mut self, key: CacheKey, value: Decoded) -> Option<CacheKey> {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            if self.policy == EvictionPolicy::Lru {
                self.promote(&key);
            }
            return None;
        }

        let mut evicted = None;
        while self.order.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions = self.evictions.wrapping_add(1);

            #[cfg(feature = "defmt")]
            trace!("evicting {} from decode cache", oldest);

            evicted = Some(oldest);
        }

        // capacity <= SLOTS and both collections were just trimmed below it
        let stored = self.entries.insert(key, value).is_ok() && self.order.push_back(key).is_ok();
        debug_assert!(stored, "decode cache overflowed its slots");

        evicted
    }

    /// Move `key` to the back of the eviction order.
    fn promote(&mut self, key: &CacheKey) {
        for _ in 0..self.order.len() {
            if let Some(k) = self.order.pop_front() {
                if k != *key {
                    // the slot was just freed by pop_front
                    let _ = self.order.push_back(k);
                }
            }
        }
        let _ = self.order.push_back(*key);
    }

    /// Keys from the next one to be evicted to the most recent one.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}
