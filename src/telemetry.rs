//! Latest readings and a short history of decoded frames, shared between the
//! bus reader and whatever serves the dashboard.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use heapless::{FnvIndexMap, HistoryBuffer};

use crate::{Decoded, Pgn, RawFrame};

/// Number of decoded samples kept for the dashboard history.
pub const HISTORY_LEN: usize = 100;

// next power of two above the number of table entries
const LATEST_SLOTS: usize = 16;

/// One decoded frame together with where and when it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sample {
    pub timestamp_ms: u64,
    pub source: u8,
    pub priority: u8,
    pub decoded: Decoded,
}

impl Sample {
    #[must_use]
    pub fn new(frame: &RawFrame, decoded: Decoded) -> Self {
        Self {
            timestamp_ms: frame.timestamp_ms,
            source: frame.id.source(),
            priority: frame.id.priority(),
            decoded,
        }
    }

    #[must_use]
    pub fn pgn(&self) -> Pgn {
        self.decoded.pgn()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Counters {
    /// Frames that decoded to a sample.
    pub decoded: u32,
    /// Frames with a PGN outside the decode table.
    pub unsupported: u32,
    /// Frames with an 11-bit identifier.
    pub standard: u32,
}

pub struct TelemetryState {
    latest: FnvIndexMap<Pgn, Sample, LATEST_SLOTS>,
    history: HistoryBuffer<Sample, HISTORY_LEN>,
    counters: Counters,
}

impl TelemetryState {
    const fn new() -> Self {
        Self {
            latest: FnvIndexMap::new(),
            history: HistoryBuffer::new(),
            counters: Counters {
                decoded: 0,
                unsupported: 0,
                standard: 0,
            },
        }
    }

    fn record(&mut self, sample: Sample) {
        self.counters.decoded = self.counters.decoded.wrapping_add(1);

        let pgn = sample.pgn();
        if let Some(slot) = self.latest.get_mut(&pgn) {
            *slot = sample.clone();
        } else {
            // one slot per table entry, never full
            let _ = self.latest.insert(pgn, sample.clone());
        }

        self.history.write(sample);
    }

    /// The most recently decoded sample of any group.
    #[must_use]
    pub fn current(&self) -> Option<&Sample> {
        self.history.recent()
    }

    #[must_use]
    pub fn latest(&self, pgn: Pgn) -> Option<&Sample> {
        self.latest.get(&pgn)
    }

    /// Latest sample of every group seen so far, in order of first
    /// appearance.
    pub fn latest_all(&self) -> impl Iterator<Item = &Sample> {
        self.latest.values()
    }

    /// Up to [`HISTORY_LEN`] samples, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Sample> {
        self.history.oldest_ordered()
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }
}

/// Thread-safe wrapper around [`TelemetryState`].
pub struct Telemetry<M: RawMutex> {
    inner: Mutex<M, RefCell<TelemetryState>>,
}

impl<M: RawMutex> Default for Telemetry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Telemetry<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(TelemetryState::new())),
        }
    }

    pub fn record(&self, sample: Sample) {
        self.inner.lock(|state| state.borrow_mut().record(sample));
    }

    pub fn record_unsupported(&self) {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            state.counters.unsupported = state.counters.unsupported.wrapping_add(1);
        });
    }

    pub fn record_standard(&self) {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            state.counters.standard = state.counters.standard.wrapping_add(1);
        });
    }

    #[must_use]
    pub fn latest(&self, pgn: Pgn) -> Option<Sample> {
        self.inner.lock(|state| state.borrow().latest(pgn).cloned())
    }

    #[must_use]
    pub fn current(&self) -> Option<Sample> {
        self.inner.lock(|state| state.borrow().current().cloned())
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.inner.lock(|state| state.borrow().counters())
    }

    /// Read the whole state under the lock, e.g. to serialize a response.
    pub fn with<R>(&self, f: impl FnOnce(&TelemetryState) -> R) -> R {
        self.inner.lock(|state| f(&state.borrow()))
    }

    pub fn clear(&self) {
        self.inner.lock(|state| *state.borrow_mut() = TelemetryState::new());
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::ser::{Serialize, SerializeStruct, Serializer};

    use super::{Sample, TelemetryState, HISTORY_LEN};

    struct History<'a>(&'a heapless::HistoryBuffer<Sample, HISTORY_LEN>);

    impl Serialize for History<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.0.oldest_ordered())
        }
    }

    /// `{ "current": .., "history": [..], "counters": .. }`, the shape the
    /// dashboard polls.
    impl Serialize for TelemetryState {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("Telemetry", 3)?;
            state.serialize_field("current", &self.current())?;
            state.serialize_field("history", &History(&self.history))?;
            state.serialize_field("counters", &self.counters)?;
            state.end()
        }
    }
}
