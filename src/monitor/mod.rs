//! Bus monitor: pulls frames off a CAN driver, decodes them through a
//! [`SharedDecoder`] and keeps the results in a [`Telemetry`] store that the
//! dashboard side can read at any time.

use core::fmt;

#[cfg(feature = "defmt")]
use defmt::{info, trace};
use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use embassy_time::Instant;

use crate::{
    telemetry::{Sample, Telemetry},
    RawFrame, SharedDecoder,
};

mod async_can;

pub use async_can::AsyncCan;

pub enum Error<C: AsyncCan> {
    Can(C::Error),
}

impl<C> fmt::Debug for Error<C>
where
    C: AsyncCan,
    C::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Can(e) => f.debug_tuple("Can").field(e).finish(),
        }
    }
}

/// What became of one received frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Decoded(Sample),
    /// Extended frame whose PGN is not in the decode table.
    Unsupported(RawFrame),
    /// 11-bit frame, not J1939.
    Standard,
}

pub struct Monitor<'d, C: AsyncCan, M: RawMutex> {
    can: C,
    decoder: &'d SharedDecoder<M>,
    telemetry: &'d Telemetry<M>,
}

impl<'d, C: AsyncCan, M: RawMutex> Monitor<'d, C, M> {
    pub fn new(can: C, decoder: &'d SharedDecoder<M>, telemetry: &'d Telemetry<M>) -> Self {
        Self {
            can,
            decoder,
            telemetry,
        }
    }

    /// Receive and process a single frame.
    pub async fn receive(&mut self) -> Result<Outcome, Error<C>> {
        let frame = self.can.receive().await.map_err(Error::Can)?;
        let timestamp_ms = Instant::now().as_millis();

        let Some(frame) = RawFrame::from_can_frame(&frame, timestamp_ms) else {
            self.telemetry.record_standard();
            return Ok(Outcome::Standard);
        };

        match self.decoder.decode(&frame) {
            Some(decoded) => {
                let sample = Sample::new(&frame, decoded);
                self.telemetry.record(sample.clone());
                Ok(Outcome::Decoded(sample))
            }
            None => {
                #[cfg(feature = "defmt")]
                trace!("ignoring PGN {:x} from {}", frame.pgn(), frame.id.source());

                self.telemetry.record_unsupported();
                Ok(Outcome::Unsupported(frame))
            }
        }
    }

    /// Wait for the next frame that decodes to a sample. Everything else is
    /// counted in the telemetry store and skipped.
    pub async fn poll(&mut self) -> Result<Sample, Error<C>> {
        loop {
            if let Outcome::Decoded(sample) = self.receive().await? {
                return Ok(sample);
            }
        }
    }

    /// Process frames until `stop` is signalled or the driver fails.
    pub async fn run<S: RawMutex>(&mut self, stop: &Signal<S, ()>) -> Result<(), Error<C>> {
        #[cfg(feature = "defmt")]
        info!("bus monitor started");

        loop {
            match select(stop.wait(), self.receive()).await {
                Either::First(()) => {
                    #[cfg(feature = "defmt")]
                    info!("bus monitor stopped");

                    return Ok(());
                }
                Either::Second(res) => {
                    res?;
                }
            }
        }
    }

    #[must_use]
    pub fn decoder(&self) -> &'d SharedDecoder<M> {
        self.decoder
    }

    #[must_use]
    pub fn telemetry(&self) -> &'d Telemetry<M> {
        self.telemetry
    }

    pub fn into_inner(self) -> C {
        self.can
    }
}
