//! Decoder configuration.

use crate::cache::SLOTS;

/// What the cache throws out when it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EvictionPolicy {
    /// Evict the oldest inserted entry. Reads do not refresh an entry.
    #[default]
    Fifo,
    /// Evict the least recently read or inserted entry.
    Lru,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Maximum number of cached decodes, clamped to `1..=SLOTS`.
    pub capacity: usize,
    pub policy: EvictionPolicy,
}

impl DecoderConfig {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub const DEFAULT: Self = Self {
        capacity: Self::DEFAULT_CAPACITY,
        policy: EvictionPolicy::Fifo,
    };

    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The capacity the cache will actually use.
    #[must_use]
    pub const fn effective_capacity(&self) -> usize {
        if self.capacity == 0 {
            1
        } else if self.capacity > SLOTS {
            SLOTS
        } else {
            self.capacity
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
