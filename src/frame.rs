use generic_array::{
    typenum::{self, U8},
    GenericArray,
};

use crate::{Id, Message};

/// A frame as received from the bus: identifier, up to 8 data bytes and the
/// time it was captured, in milliseconds since boot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame {
    pub id: Id,
    pub data: heapless::Vec<u8, 8>,
    pub timestamp_ms: u64,
}

impl RawFrame {
    pub fn new(id: Id, data: heapless::Vec<u8, 8>, timestamp_ms: u64) -> Self {
        Self {
            id,
            data,
            timestamp_ms,
        }
    }

    /// Build a frame from a byte slice. Anything past the eighth byte cannot
    /// be carried by a classic CAN frame and is dropped.
    pub fn from_slice(id: Id, data: &[u8], timestamp_ms: u64) -> Self {
        let len = data.len().min(8);
        let mut buf = heapless::Vec::new();
        // len <= 8 == capacity
        let _ = buf.extend_from_slice(&data[..len]);

        Self::new(id, buf, timestamp_ms)
    }

    /// Convert a driver frame. Standard (11-bit) frames carry no PGN and
    /// yield `None`.
    pub fn from_can_frame<F: embedded_can::Frame>(frame: &F, timestamp_ms: u64) -> Option<Self> {
        let id = match frame.id() {
            embedded_can::Id::Extended(extended_id) => Id::from_can_id(extended_id),
            embedded_can::Id::Standard(_) => return None,
        };

        let data = frame.data();
        let len = frame.dlc().min(data.len());

        Some(Self::from_slice(id, &data[..len], timestamp_ms))
    }

    pub fn to_can_frame<T: embedded_can::Frame>(&self) -> Option<T> {
        T::new(self.id.as_can_id(), &self.data)
    }

    /// Convert a message to a frame. The typenum bounds are used to ensure
    /// that the message is not larger than 8 bytes.
    pub fn from_message<T: Message>(id: Id, msg: &T, timestamp_ms: u64) -> Self
    where
        T::EncodedLen: typenum::IsLessOrEqual<U8>,
    {
        let mut buf = GenericArray::<u8, T::EncodedLen>::default();
        msg.encode(buf.as_mut_slice());

        Self::from_slice(id, buf.as_slice(), timestamp_ms)
    }

    #[inline]
    #[must_use]
    pub fn pgn(&self) -> u32 {
        self.id.pgn()
    }

    /// The data bytes canonicalized to a full 8-byte payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Payload {
        Payload::from_slice(&self.data)
    }
}

/// Exactly eight data bytes. Shorter frames are zero-padded, so every
/// decoder can index the whole payload without bounds checks failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Payload(pub [u8; 8]);

impl Payload {
    pub const ZERO: Self = Self([0; 8]);

    #[must_use]
    pub fn from_slice(data: &[u8]) -> Self {
        let mut bytes = [0; 8];
        let len = data.len().min(8);
        bytes[..len].copy_from_slice(&data[..len]);
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> &GenericArray<u8, U8> {
        GenericArray::from_slice(&self.0)
    }
}

impl From<[u8; 8]> for Payload {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::{Payload, RawFrame};
    use crate::{Id, DESTINATION_BROADCAST};

    #[test]
    fn short_payload_is_zero_padded() {
        let id = Id::new(3, 0xf004, 0, DESTINATION_BROADCAST);
        let frame = RawFrame::from_slice(id, &[1, 2, 3], 0);
        assert_eq!(frame.data.len(), 3);
        assert_eq!(frame.payload(), Payload([1, 2, 3, 0, 0, 0, 0, 0]));
        assert_eq!(frame.pgn(), 0xf004);
    }

    #[test]
    fn long_input_is_truncated() {
        let id = Id::new(3, 0xf004, 0, DESTINATION_BROADCAST);
        let frame = RawFrame::from_slice(id, &[9; 12], 7);
        assert_eq!(frame.data.len(), 8);
        assert_eq!(frame.timestamp_ms, 7);
        assert_eq!(frame.payload(), Payload([9; 8]));
    }

    #[test]
    fn empty_payload_is_all_zero() {
        assert_eq!(Payload::from_slice(&[]), Payload::ZERO);
        assert_eq!(Payload::ZERO.as_array().as_slice(), &[0; 8]);
    }
}
