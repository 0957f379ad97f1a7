//! Suspect parameter numbers of interest on agricultural buses.
//!
//! This is a lookup table only: it tells a caller where a signal lives
//! inside its parameter group and what unit it is reported in. The decode
//! table in [`crate::Pgn`] does not depend on it.

use crate::{Buf, Payload, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Spn {
    number: u32,
    name: &'static str,
    offset: u8,
    length: u8,
    resolution: (u32, u32),
    unit: Option<Unit>,
}

impl Spn {
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Byte offset inside the payload.
    #[must_use]
    pub const fn offset(&self) -> u8 {
        self.offset
    }

    /// Length in bytes, little-endian.
    #[must_use]
    pub const fn length(&self) -> u8 {
        self.length
    }

    /// Resolution per bit as `num / den`.
    #[must_use]
    pub const fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    #[must_use]
    pub const fn unit(&self) -> Option<Unit> {
        self.unit
    }

    /// Read the raw little-endian value of this parameter from a payload.
    /// Bytes past the end of the payload read as missing.
    ///
    /// ```
    /// # use agri_j1939::{spn, Payload};
    /// let speed = spn::by_name("EngineSpeed").unwrap();
    /// assert_eq!(speed.raw(&Payload([0x10, 0x27, 0, 0, 0, 0, 0, 0])), 10_000);
    /// ```
    #[must_use]
    pub fn raw(&self, payload: &Payload) -> u32 {
        let bytes = payload.as_bytes();
        let mut data = &bytes[..];
        data.advance(usize::from(self.offset).min(bytes.len()));

        let len = usize::from(self.length).min(data.len()).min(4);
        let mut value = 0;
        for i in 0..len {
            value |= u32::from(data.get_u8()) << (8 * i);
        }
        value
    }
}

pub static SPNS: [Spn; 8] = [
    Spn {
        number: 190,
        name: "EngineSpeed",
        offset: 0,
        length: 2,
        resolution: (1, 8),
        unit: Some(Unit::Rpm),
    },
    Spn {
        number: 92,
        name: "EngineLoad",
        offset: 2,
        length: 1,
        resolution: (1, 1),
        unit: Some(Unit::Percent),
    },
    Spn {
        number: 183,
        name: "FuelRate",
        offset: 0,
        length: 2,
        resolution: (1, 20),
        unit: Some(Unit::LitersPerHour),
    },
    Spn {
        number: 523,
        name: "TransmissionGear",
        offset: 3,
        length: 1,
        resolution: (1, 1),
        unit: None,
    },
    Spn {
        number: 177,
        name: "TransmissionOilTemp",
        offset: 0,
        length: 1,
        resolution: (1, 1),
        unit: Some(Unit::Celsius),
    },
    Spn {
        number: 84,
        name: "VehicleSpeed",
        offset: 1,
        length: 2,
        resolution: (1, 256),
        unit: Some(Unit::KilometersPerHour),
    },
    Spn {
        number: 175,
        name: "HydraulicOilTemp",
        offset: 0,
        length: 1,
        resolution: (1, 1),
        unit: Some(Unit::Celsius),
    },
    Spn {
        number: 169,
        name: "HydraulicPressure",
        offset: 2,
        length: 1,
        resolution: (16, 1),
        unit: Some(Unit::Kilopascal),
    },
];

#[must_use]
pub fn by_name(name: &str) -> Option<&'static Spn> {
    SPNS.iter().find(|spn| spn.name == name)
}

#[must_use]
pub fn by_number(number: u32) -> Option<&'static Spn> {
    SPNS.iter().find(|spn| spn.number == number)
}

/// Unit of a named parameter, or `None` if the parameter is unknown or
/// unitless.
#[must_use]
pub fn unit_of(name: &str) -> Option<Unit> {
    by_name(name)?.unit
}
