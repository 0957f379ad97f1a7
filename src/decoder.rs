//! Frame dispatcher: PGN extraction, cache lookup and decoding.

use core::cell::RefCell;

#[cfg(feature = "defmt")]
use defmt::{debug, trace};
use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};

use crate::{
    cache::{CacheKey, CacheStats, DecodeCache},
    Decoded, DecoderConfig, Pgn, RawFrame,
};

pub struct Decoder {
    cache: DecodeCache,
    decoded: u32,
    unsupported: u32,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::DEFAULT)
    }
}

impl Decoder {
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self {
            cache: DecodeCache::new(config),
            decoded: 0,
            unsupported: 0,
        }
    }

    /// Decode a frame, serving repeated `(PGN, payload)` pairs from the
    /// cache. Returns `None` if the PGN is not in the decode table; such
    /// frames are never cached.
    pub fn decode(&mut self, frame: &RawFrame) -> Option<Decoded> {
        let Some(pgn) = Pgn::from_raw(frame.pgn()) else {
            self.unsupported = self.unsupported.wrapping_add(1);

            #[cfg(feature = "defmt")]
            trace!("no decoder for PGN {:x}", frame.pgn());

            return None;
        };

        let key = CacheKey::for_frame(pgn, frame);
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit.clone());
        }

        let decoded = pgn.decode(&frame.payload());
        self.decoded = self.decoded.wrapping_add(1);

        #[cfg(feature = "defmt")]
        debug!("decoded {} from {}", pgn.name(), frame.id);

        self.cache.insert(key, decoded.clone());
        Some(decoded)
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn cache(&self) -> &DecodeCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// How many times a decoder actually ran (cache misses on supported
    /// groups).
    #[must_use]
    pub fn decode_count(&self) -> u32 {
        self.decoded
    }

    /// Frames seen whose PGN is not in the table.
    #[must_use]
    pub fn unsupported_count(&self) -> u32 {
        self.unsupported
    }
}

/// A [`Decoder`] that can be shared between tasks, e.g. the bus reader and
/// an HTTP handler. Every call holds the lock for the whole
/// lookup-decode-insert-evict sequence.
///
/// ```
/// use agri_j1939::{DecoderConfig, SharedDecoder};
/// use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
///
/// static DECODER: SharedDecoder<CriticalSectionRawMutex> =
///     SharedDecoder::new(DecoderConfig::DEFAULT);
///
/// assert_eq!(DECODER.cache_stats().capacity, 100);
/// ```
pub struct SharedDecoder<M: RawMutex> {
    inner: Mutex<M, RefCell<Decoder>>,
}

impl<M: RawMutex> SharedDecoder<M> {
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Decoder::new(config))),
        }
    }

    pub fn decode(&self, frame: &RawFrame) -> Option<Decoded> {
        self.lock(|decoder| decoder.decode(frame))
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.lock(|decoder| decoder.cache_stats())
    }

    pub fn clear_cache(&self) {
        self.lock(Decoder::clear_cache);
    }

    /// Run `f` with exclusive access to the decoder.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Decoder) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::{DecoderConfig, Id, Pgn, RawFrame, DESTINATION_BROADCAST};

    fn frame(pgn: u32, data: &[u8]) -> RawFrame {
        RawFrame::from_slice(Id::new(3, pgn, 0x00, DESTINATION_BROADCAST), data, 0)
    }

    #[test]
    fn decodes_engine_speed() {
        let mut decoder = Decoder::default();
        let decoded = decoder
            .decode(&frame(0xf004, &[0, 0, 0x10, 0x27, 0, 0, 0, 0]))
            .unwrap();
        assert_eq!(decoded.pgn(), Pgn::EngineSpeed);
        assert_eq!(decoded.reading("engine_speed").unwrap().value(), 1250.0);
    }

    #[test]
    fn repeated_frame_is_served_from_cache() {
        let mut decoder = Decoder::default();
        let f = frame(0xfefc, &[0xe8, 0x03, 0, 0, 0, 0, 0, 0]);

        let first = decoder.decode(&f).unwrap();
        let second = decoder.decode(&f).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.reading("vehicle_speed").unwrap().value(), 1.0);

        assert_eq!(decoder.decode_count(), 1);
        let stats = decoder.cache_stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn source_address_does_not_split_the_cache() {
        let mut decoder = Decoder::default();
        let data = [0x21, 0, 0, 0, 0, 0, 0, 0];
        decoder.decode(&RawFrame::from_slice(Id::new(3, 0xf005, 0x01, 0xff), &data, 0));
        decoder.decode(&RawFrame::from_slice(Id::new(6, 0xf005, 0x02, 0xff), &data, 5));
        assert_eq!(decoder.cache_stats().size, 1);
    }

    #[test]
    fn unsupported_pgn_is_not_cached() {
        let mut decoder = Decoder::default();
        assert_eq!(decoder.decode(&frame(0x0000, &[0; 8])), None);
        assert_eq!(decoder.decode(&frame(0x0000, &[0; 8])), None);
        assert_eq!(decoder.cache_stats().size, 0);
        assert_eq!(decoder.unsupported_count(), 2);
        assert_eq!(decoder.cache_stats().misses, 0);
    }

    #[test]
    fn short_frame_is_padded_but_keyed_separately() {
        let mut decoder = Decoder::default();
        let short = decoder.decode(&frame(0xfef3, &[250])).unwrap();
        assert_eq!(short.reading("coolant_level").unwrap().value(), 100.0);
        assert_eq!(short.reading("oil_level").unwrap().value(), 0.0);

        let full = decoder
            .decode(&frame(0xfef3, &[250, 0, 0, 0, 0, 0, 0, 0]))
            .unwrap();
        assert_eq!(short, full);
        assert_eq!(decoder.cache_stats().size, 2);
    }

    #[test]
    fn single_bit_difference_misses() {
        let mut decoder = Decoder::new(DecoderConfig::DEFAULT);
        decoder.decode(&frame(0xfe80, &[0x10, 0, 0, 0, 0, 0, 0, 0]));
        decoder.decode(&frame(0xfe80, &[0x10, 0, 0, 0, 0, 0, 0, 0x01]));
        assert_eq!(decoder.cache_stats().size, 2);
        assert_eq!(decoder.decode_count(), 2);
    }
}
