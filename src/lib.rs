//! This crate decodes the J1939 parameter groups broadcast on the CAN bus of
//! agricultural machinery: engine, transmission, hydraulics, implement and
//! performance telemetry. It uses no heap allocation whatsoever and is meant
//! to run on the same microcontroller that owns the CAN transceiver.
//!
//! Decoding goes through a [`Decoder`], which extracts the PGN from the
//! 29-bit identifier, looks the frame up in a bounded cache keyed by
//! `(PGN, payload)` and only runs the decoder from the [`Pgn`] table on a
//! miss:
//!
//! ```
//! use agri_j1939::{Decoder, DecoderConfig, Id, RawFrame, Pgn};
//!
//! let mut decoder = Decoder::new(DecoderConfig::DEFAULT);
//! let id = Id::new(3, Pgn::EngineSpeed.raw(), 0x00, 0xff);
//! let frame = RawFrame::from_slice(id, &[0, 0, 0x10, 0x27, 0, 0, 0, 0], 0);
//!
//! let decoded = decoder.decode(&frame).unwrap();
//! assert_eq!(decoded.reading("engine_speed").unwrap().value(), 1250.0);
//! ```
//!
//! Frames whose PGN is not in the table decode to `None`; that is the common
//! case on a busy bus and not an error.

#![no_std]

mod buf;
pub mod cache;
pub mod config;
mod decoded;
pub mod decoder;
mod frame;
mod id;
pub mod messages;
#[cfg(feature = "monitor")]
pub mod monitor;
mod pgn;
pub mod spn;
pub mod telemetry;

use generic_array::{ArrayLength, GenericArray};

pub use buf::{Buf, BufMut};
pub use cache::{CacheStats, DecodeCache};
pub use config::{DecoderConfig, EvictionPolicy};
pub use decoded::{Decoded, Field, Reading, Scale, Unit, Value, MAX_FIELDS};
pub use decoder::{Decoder, SharedDecoder};
pub use frame::{Payload, RawFrame};
pub use generic_array::typenum;
pub use id::{Format, Id, DESTINATION_BROADCAST};
pub use pgn::{DecodeFn, Pgn};

/// A J1939 parameter group with a fixed-length encoding. This trait is very
/// much inspired by [the gRPC library Prost's trait with the same
/// name](https://docs.rs/prost/latest/prost/trait.Message.html).
pub trait Message {
    /// The parameter group number this message is sent under.
    const PGN: u32;

    /// Total length of the encoded message in bytes.
    type EncodedLen: ArrayLength;

    /// The error type returned when a message fails to decode.
    type DecodeError;

    /// Encode the message into `buf`, which is exactly
    /// [`Message::EncodedLen`] bytes long.
    fn encode(&self, buf: &mut [u8]);

    /// Decode a message from its encoded form.
    fn decode(data: &GenericArray<u8, Self::EncodedLen>) -> Result<Self, Self::DecodeError>
    where
        Self: Sized;
}
