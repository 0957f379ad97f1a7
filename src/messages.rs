//! Typed parameter groups. Each struct keeps the raw bus fields of one group
//! and knows how to turn them into physical readings.
//!
//! Bytes the decoders do not interpret are written as `0xff` ("not
//! available") when encoding and ignored when decoding.

use core::convert::Infallible;

use generic_array::{typenum::U8, GenericArray};

use crate::{Buf, BufMut, Decoded, Message, Pgn, Reading, Scale, Unit, Value};

/// 0.125 rpm/bit.
pub const RPM: Scale = Scale::new(0.125, 0.0, 1, Unit::Rpm);
/// 0.03125 °C/bit, -273 °C offset.
pub const TEMPERATURE: Scale = Scale::new(0.03125, -273.0, 1, Unit::Celsius);
/// 0.4 %/bit.
pub const PERCENT: Scale = Scale::new(0.4, 0.0, 1, Unit::Percent);
/// 0.001 km/h per bit, shown with two decimals.
pub const TRANSMISSION_SPEED: Scale = Scale::new(0.001, 0.0, 2, Unit::KilometersPerHour);
/// 0.001 km/h per bit.
pub const VEHICLE_SPEED: Scale = Scale::new(0.001, 0.0, 1, Unit::KilometersPerHour);
/// 0.5 bar/bit.
pub const PRESSURE: Scale = Scale::new(0.5, 0.0, 1, Unit::Bar);
/// 0.1 L/min per bit.
pub const FLOW: Scale = Scale::new(0.1, 0.0, 1, Unit::LitersPerMinute);
/// 0.5 kg/bit.
pub const LOAD: Scale = Scale::new(0.5, 0.0, 1, Unit::Kilograms);
/// 0.05 L/h per bit.
pub const FUEL_RATE: Scale = Scale::new(0.05, 0.0, 1, Unit::LitersPerHour);

/// A group with a single scaled field at the start of the payload.
macro_rules! scalar_message {
    (
        $(#[$meta:meta])*
        $name:ident, $pgn:ident, $field:literal, $raw:ty, $get:ident, $put:ident, $scale:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name {
            pub raw: $raw,
        }

        impl $name {
            pub const SCALE: Scale = $scale;

            #[must_use]
            pub const fn reading(&self) -> Reading {
                Self::SCALE.apply(self.raw as u32)
            }
        }

        impl Message for $name {
            const PGN: u32 = Pgn::$pgn.raw();

            type EncodedLen = U8;

            type DecodeError = Infallible;

            fn encode(&self, mut buf: &mut [u8]) {
                buf.$put(self.raw);
                buf.put_unavailable(8 - core::mem::size_of::<$raw>());
            }

            fn decode(data: &GenericArray<u8, U8>) -> Result<Self, Self::DecodeError> {
                let mut data = data.as_slice();
                Ok(Self { raw: data.$get() })
            }
        }

        impl From<$name> for Decoded {
            fn from(msg: $name) -> Self {
                Decoded::new(Pgn::$pgn).with($field, Value::Reading(msg.reading()))
            }
        }
    };
}

/// Engine speed, bytes 2 and 3 of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineSpeed {
    pub raw: u16,
}

impl EngineSpeed {
    #[must_use]
    pub const fn rpm(&self) -> Reading {
        RPM.apply(self.raw as u32)
    }
}

impl Message for EngineSpeed {
    const PGN: u32 = Pgn::EngineSpeed.raw();

    type EncodedLen = U8;

    type DecodeError = Infallible;

    fn encode(&self, mut buf: &mut [u8]) {
        buf.put_unavailable(2);
        buf.put_u16(self.raw);
        buf.put_unavailable(4);
    }

    fn decode(data: &GenericArray<u8, U8>) -> Result<Self, Self::DecodeError> {
        let mut data = data.as_slice();
        data.advance(2);
        Ok(Self {
            raw: data.get_u16(),
        })
    }
}

impl From<EngineSpeed> for Decoded {
    fn from(msg: EngineSpeed) -> Self {
        Decoded::new(Pgn::EngineSpeed).with("engine_speed", Value::Reading(msg.rpm()))
    }
}

scalar_message!(
    /// Engine coolant temperature.
    EngineTemperature, EngineTemperature, "engine_temp", u16, get_u16, put_u16, TEMPERATURE
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineFluidLevel {
    pub coolant_raw: u8,
    pub oil_raw: u8,
}

impl EngineFluidLevel {
    #[must_use]
    pub const fn coolant(&self) -> Reading {
        PERCENT.apply(self.coolant_raw as u32)
    }

    #[must_use]
    pub const fn oil(&self) -> Reading {
        PERCENT.apply(self.oil_raw as u32)
    }
}

impl Message for EngineFluidLevel {
    const PGN: u32 = Pgn::EngineFluidLevel.raw();

    type EncodedLen = U8;

    type DecodeError = Infallible;

    fn encode(&self, mut buf: &mut [u8]) {
        buf.put_u8(self.coolant_raw);
        buf.put_u8(self.oil_raw);
        buf.put_unavailable(6);
    }

    fn decode(data: &GenericArray<u8, U8>) -> Result<Self, Self::DecodeError> {
        let mut data = data.as_slice();
        Ok(Self {
            coolant_raw: data.get_u8(),
            oil_raw: data.get_u8(),
        })
    }
}

impl From<EngineFluidLevel> for Decoded {
    fn from(msg: EngineFluidLevel) -> Self {
        Decoded::new(Pgn::EngineFluidLevel)
            .with("coolant_level", Value::Reading(msg.coolant()))
            .with("oil_level", Value::Reading(msg.oil()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionMode {
    Manual,
    Auto,
    PowrShift,
    Ivt,
    Unknown,
}

impl TransmissionMode {
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Manual,
            1 => Self::Auto,
            2 => Self::PowrShift,
            3 => Self::Ivt,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Auto => "Auto",
            Self::PowrShift => "PowrShift",
            Self::Ivt => "IVT",
            Self::Unknown => "Unknown",
        }
    }
}

/// Gear in the low nibble of byte 0, mode index in the high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transmission {
    pub gear: u8,
    pub mode_index: u8,
}

impl Transmission {
    #[must_use]
    pub const fn mode(&self) -> TransmissionMode {
        TransmissionMode::from_index(self.mode_index)
    }
}

impl Message for Transmission {
    const PGN: u32 = Pgn::Transmission.raw();

    type EncodedLen = U8;

    type DecodeError = Infallible;

    fn encode(&self, mut buf: &mut [u8]) {
        buf.put_u8((self.mode_index & 0x0f) << 4 | (self.gear & 0x0f));
        buf.put_unavailable(7);
    }

    fn decode(data: &GenericArray<u8, U8>) -> Result<Self, Self::DecodeError> {
        let mut data = data.as_slice();
        let b0 = data.get_u8();
        Ok(Self {
            gear: b0 & 0x0f,
            mode_index: (b0 >> 4) & 0x0f,
        })
    }
}

impl From<Transmission> for Decoded {
    fn from(msg: Transmission) -> Self {
        Decoded::new(Pgn::Transmission)
            .with("gear", Value::Discrete(msg.gear))
            .with("mode", Value::State(msg.mode().as_str()))
    }
}

scalar_message!(
    TransmissionSpeed, TransmissionSpeed, "transmission_speed", u16, get_u16, put_u16,
    TRANSMISSION_SPEED
);

scalar_message!(
    HydraulicPressure, HydraulicPressure, "hydraulic_pressure", u16, get_u16, put_u16, PRESSURE
);

scalar_message!(HydraulicFlow, HydraulicFlow, "hydraulic_flow", u16, get_u16, put_u16, FLOW);

scalar_message!(
    /// Hydraulic oil temperature.
    HydraulicTemperature, HydraulicTemperature, "hydraulic_temp", u16, get_u16, put_u16,
    TEMPERATURE
);

/// Operating state of the implement. The labels are the ones the dashboard
/// shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImplementState {
    Off,
    On,
    Fault,
    Maintenance,
    Unknown,
}

impl ImplementState {
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Off,
            1 => Self::On,
            2 => Self::Fault,
            3 => Self::Maintenance,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Desligado",
            Self::On => "Ligado",
            Self::Fault => "Erro",
            Self::Maintenance => "Manutenção",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImplementStatus {
    pub state_index: u8,
}

impl ImplementStatus {
    #[must_use]
    pub const fn state(&self) -> ImplementState {
        ImplementState::from_index(self.state_index)
    }
}

impl Message for ImplementStatus {
    const PGN: u32 = Pgn::ImplementStatus.raw();

    type EncodedLen = U8;

    type DecodeError = Infallible;

    fn encode(&self, mut buf: &mut [u8]) {
        // upper nibble reserved
        buf.put_u8(0xf0 | (self.state_index & 0x0f));
        buf.put_unavailable(7);
    }

    fn decode(data: &GenericArray<u8, U8>) -> Result<Self, Self::DecodeError> {
        let mut data = data.as_slice();
        Ok(Self {
            state_index: data.get_u8() & 0x0f,
        })
    }
}

impl From<ImplementStatus> for Decoded {
    fn from(msg: ImplementStatus) -> Self {
        Decoded::new(Pgn::ImplementStatus)
            .with("implement_status", Value::State(msg.state().as_str()))
    }
}

scalar_message!(
    ImplementPosition, ImplementPosition, "implement_position", u8, get_u8, put_u8, PERCENT
);

scalar_message!(ImplementLoad, ImplementLoad, "implement_load", u16, get_u16, put_u16, LOAD);

scalar_message!(
    FuelConsumption, FuelConsumption, "fuel_consumption", u16, get_u16, put_u16, FUEL_RATE
);

scalar_message!(FuelLevel, FuelLevel, "fuel_level", u8, get_u8, put_u8, PERCENT);

scalar_message!(
    /// Ground speed of the vehicle.
    VehicleSpeed, VehicleSpeed, "vehicle_speed", u16, get_u16, put_u16, VEHICLE_SPEED
);

#[cfg(test)]
mod tests {
    use generic_array::GenericArray;

    use super::*;
    use crate::Payload;

    fn payload(bytes: [u8; 8]) -> Payload {
        Payload(bytes)
    }

    #[test]
    fn engine_speed_reads_bytes_two_and_three() {
        let msg = EngineSpeed::decode(payload([0, 0, 0x10, 0x27, 0, 0, 0, 0]).as_array()).unwrap();
        assert_eq!(msg.raw, 0x2710);
        assert_eq!(msg.rpm().value(), 1250.0);
        assert_eq!(msg.rpm().unit(), Unit::Rpm);

        // bytes 0 and 1 are not part of the reading
        let other = EngineSpeed::decode(payload([0xaa, 0xbb, 0x10, 0x27, 1, 2, 3, 4]).as_array());
        assert_eq!(other, Ok(msg));
    }

    #[test]
    fn engine_speed_rounds_eighths_to_tenths() {
        // 1 * 0.125 = 0.125 -> 0.1, 3 * 0.125 = 0.375 -> 0.4, 2 * 0.125 = 0.25 -> 0.2
        assert_eq!(EngineSpeed { raw: 1 }.rpm().scaled(), 1);
        assert_eq!(EngineSpeed { raw: 3 }.rpm().scaled(), 4);
        assert_eq!(EngineSpeed { raw: 2 }.rpm().scaled(), 2);
        assert_eq!(EngineSpeed { raw: 6 }.rpm().scaled(), 8);
    }

    #[test]
    fn vehicle_speed_thousandths() {
        let msg = VehicleSpeed::decode(payload([0xe8, 0x03, 0, 0, 0, 0, 0, 0]).as_array()).unwrap();
        assert_eq!(msg.reading().value(), 1.0);
        assert_eq!(msg.reading().unit(), Unit::KilometersPerHour);
    }

    #[test]
    fn transmission_speed_keeps_two_decimals() {
        let msg = TransmissionSpeed { raw: 12_341 };
        assert_eq!(msg.reading().scaled(), 1234);
        assert_eq!(msg.reading().decimals(), 2);
    }

    #[test]
    fn temperatures_apply_offset() {
        // 0x2540 = 9536, 9536 / 32 - 273 = 25
        let bytes = payload([0x40, 0x25, 0, 0, 0, 0, 0, 0]);
        let engine = EngineTemperature::decode(bytes.as_array()).unwrap();
        let hydraulic = HydraulicTemperature::decode(bytes.as_array()).unwrap();
        assert_eq!(engine.reading().value(), 25.0);
        assert_eq!(hydraulic.reading().value(), 25.0);
    }

    #[test]
    fn fluid_levels_are_independent_bytes() {
        let msg = EngineFluidLevel::decode(payload([250, 125, 0, 0, 0, 0, 0, 0]).as_array()).unwrap();
        assert_eq!(msg.coolant().value(), 100.0);
        assert_eq!(msg.oil().value(), 50.0);

        let decoded = Decoded::from(msg);
        assert_eq!(decoded.reading("coolant_level"), Some(msg.coolant()));
        assert_eq!(decoded.reading("oil_level"), Some(msg.oil()));
    }

    #[test]
    fn transmission_nibbles() {
        let msg = Transmission::decode(payload([0x21, 0, 0, 0, 0, 0, 0, 0]).as_array()).unwrap();
        assert_eq!(msg.gear, 1);
        assert_eq!(msg.mode(), TransmissionMode::PowrShift);

        let decoded = Decoded::from(msg);
        assert_eq!(decoded.discrete("gear"), Some(1));
        assert_eq!(decoded.state("mode"), Some("PowrShift"));

        let msg = Transmission::decode(payload([0xf0, 0, 0, 0, 0, 0, 0, 0]).as_array()).unwrap();
        assert_eq!(msg.gear, 0);
        assert_eq!(msg.mode_index, 15);
        assert_eq!(Decoded::from(msg).state("mode"), Some("Unknown"));
    }

    #[test]
    fn implement_status_lookup() {
        let decode = |b0| {
            let msg = ImplementStatus::decode(payload([b0, 0, 0, 0, 0, 0, 0, 0]).as_array()).unwrap();
            Decoded::from(msg).state("implement_status")
        };

        assert_eq!(decode(0x00), Some("Desligado"));
        assert_eq!(decode(0x01), Some("Ligado"));
        assert_eq!(decode(0x02), Some("Erro"));
        assert_eq!(decode(0x03), Some("Manutenção"));
        assert_eq!(decode(0x04), Some("Unknown"));
        // upper nibble is ignored
        assert_eq!(decode(0xf1), Some("Ligado"));
    }

    #[test]
    fn decimal_resolutions_round_like_the_float_product() {
        // 1 * 0.05 and 9 * 0.05 land just above .x5, so they round up
        assert_eq!(FuelConsumption { raw: 1 }.reading().value(), 0.1);
        assert_eq!(FuelConsumption { raw: 9 }.reading().value(), 0.5);
        assert_eq!(FuelConsumption { raw: 3 }.reading().value(), 0.2);
        assert_eq!(TransmissionSpeed { raw: 5 }.reading().value(), 0.01);
        assert_eq!(VehicleSpeed { raw: 50 }.reading().value(), 0.1);
    }

    #[test]
    fn largest_load_keeps_full_precision() {
        let reading = ImplementLoad { raw: u16::MAX }.reading();
        assert_eq!(reading.scaled(), 327_675);
        assert_eq!(reading.value(), 32_767.5_f64);
    }

    #[test]
    fn remaining_scalars() {
        let bytes = payload([0xc8, 0x00, 0, 0, 0, 0, 0, 0]); // 200
        let array = bytes.as_array();

        assert_eq!(HydraulicPressure::decode(array).unwrap().reading().value(), 100.0);
        assert_eq!(HydraulicFlow::decode(array).unwrap().reading().value(), 20.0);
        assert_eq!(ImplementLoad::decode(array).unwrap().reading().value(), 100.0);
        assert_eq!(FuelConsumption::decode(array).unwrap().reading().value(), 10.0);
        assert_eq!(ImplementPosition::decode(array).unwrap().reading().value(), 80.0);
        assert_eq!(FuelLevel::decode(array).unwrap().reading().value(), 80.0);
    }

    #[test]
    fn encode_then_decode_preserves_raw_fields() {
        let mut buf = GenericArray::<u8, U8>::default();

        EngineSpeed { raw: 0x1234 }.encode(buf.as_mut_slice());
        assert_eq!(buf.as_slice(), &[0xff, 0xff, 0x34, 0x12, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(EngineSpeed::decode(&buf), Ok(EngineSpeed { raw: 0x1234 }));

        Transmission { gear: 5, mode_index: 3 }.encode(buf.as_mut_slice());
        assert_eq!(buf[0], 0x35);

        FuelLevel { raw: 200 }.encode(buf.as_mut_slice());
        assert_eq!(buf.as_slice(), &[200, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn message_pgns_match_table() {
        assert_eq!(EngineSpeed::PGN, 0xf004);
        assert_eq!(EngineTemperature::PGN, 0xfef2);
        assert_eq!(Transmission::PGN, 0xf005);
        assert_eq!(ImplementStatus::PGN, 0xfe0f);
        assert_eq!(VehicleSpeed::PGN, 0xfefc);
    }
}
