use core::fmt;

use crate::Pgn;

/// Most fields any parameter group in the table decodes to.
pub const MAX_FIELDS: usize = 4;

const POWERS_OF_TEN: [i64; 4] = [1, 10, 100, 1000];

/// Physical unit of a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Rpm,
    Celsius,
    Percent,
    KilometersPerHour,
    Bar,
    Kilopascal,
    LitersPerMinute,
    LitersPerHour,
    Kilograms,
}

impl Unit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rpm => "RPM",
            Self::Celsius => "°C",
            Self::Percent => "%",
            Self::KilometersPerHour => "km/h",
            Self::Bar => "bar",
            Self::Kilopascal => "kPa",
            Self::LitersPerMinute => "L/min",
            Self::LitersPerHour => "L/h",
            Self::Kilograms => "kg",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linear transform from a raw integer field to a physical value:
/// `raw * factor + offset` in `f64`, rounded to `decimals` places.
///
/// Rounding looks at the exact binary value of the product, so a resolution
/// such as 0.05 L/h per bit rounds the way the float product says and not
/// the way the decimal written in the table suggests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub factor: f64,
    pub offset: f64,
    pub decimals: u8,
    pub unit: Unit,
}

impl Scale {
    pub const fn new(factor: f64, offset: f64, decimals: u8, unit: Unit) -> Self {
        debug_assert!((decimals as usize) < POWERS_OF_TEN.len());

        Self {
            factor,
            offset,
            decimals,
            unit,
        }
    }

    /// Apply the transform.
    ///
    /// ```
    /// # use agri_j1939::{messages::RPM, Unit};
    /// let reading = RPM.apply(10_000);
    /// assert_eq!(reading.scaled(), 12_500);
    /// assert_eq!(reading.unit(), Unit::Rpm);
    /// ```
    #[must_use]
    pub const fn apply(&self, raw: u32) -> Reading {
        let value = raw as f64 * self.factor + self.offset;

        Reading {
            scaled: round_scaled(value, self.decimals) as i32,
            decimals: self.decimals,
            unit: self.unit,
        }
    }
}

/// `x * 10^decimals` rounded to the nearest integer, ties to even. The
/// multiplication is done on the exact mantissa of `x`, so a float that sits
/// just above or below a decimal tie is never mistaken for one.
const fn round_scaled(x: f64, decimals: u8) -> i64 {
    let bits = x.to_bits();
    let negative = bits >> 63 != 0;
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);

    // |x| = mantissa * 2^exp
    let (mantissa, exp) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };

    let n = mantissa as u128 * POWERS_OF_TEN[decimals as usize] as u128;

    let magnitude = if exp >= 0 {
        // |x| >= 2^52, far outside anything a frame can carry
        if exp > 60 {
            i64::MAX as u128
        } else {
            n << exp
        }
    } else {
        let shift = (-exp) as u32;
        if shift >= 128 {
            0
        } else {
            let q = n >> shift;
            let rem = n - (q << shift);
            let half = 1u128 << (shift - 1);

            if rem > half || (rem == half && q & 1 == 1) {
                q + 1
            } else {
                q
            }
        }
    };

    let magnitude = if magnitude > i64::MAX as u128 {
        i64::MAX
    } else {
        magnitude as i64
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// A physical quantity in fixed point: `scaled / 10^decimals` in `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    scaled: i32,
    decimals: u8,
    unit: Unit,
}

impl Reading {
    #[must_use]
    pub const fn scaled(&self) -> i32 {
        self.scaled
    }

    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.scaled as f64 / POWERS_OF_TEN[self.decimals as usize] as f64
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pow = POWERS_OF_TEN[self.decimals as usize];
        let abs = (self.scaled as i64).abs();
        let sign = if self.scaled < 0 { "-" } else { "" };

        if self.decimals == 0 {
            write!(f, "{sign}{abs} {}", self.unit)
        } else {
            write!(
                f,
                "{sign}{}.{:0width$} {}",
                abs / pow,
                abs % pow,
                self.unit,
                width = self.decimals as usize
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    /// A measured quantity with its unit.
    Reading(Reading),
    /// A categorical state such as a transmission mode.
    State(&'static str),
    /// A plain count, e.g. the selected gear.
    Discrete(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pub name: &'static str,
    pub value: Value,
}

/// The named quantities one parameter group decoded to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoded {
    pgn: Pgn,
    fields: heapless::Vec<Field, MAX_FIELDS>,
}

impl Decoded {
    pub(crate) const fn new(pgn: Pgn) -> Self {
        Self {
            pgn,
            fields: heapless::Vec::new(),
        }
    }

    /// Append a field. Parameter groups are declared with at most
    /// [`MAX_FIELDS`] fields, so this never runs out of room.
    pub(crate) fn with(mut self, name: &'static str, value: Value) -> Self {
        let pushed = self.fields.push(Field { name, value });
        debug_assert!(pushed.is_ok(), "too many fields for {}", self.pgn.name());
        self
    }

    #[inline]
    #[must_use]
    pub fn pgn(&self) -> Pgn {
        self.pgn
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    #[must_use]
    pub fn reading(&self, name: &str) -> Option<Reading> {
        match self.get(name)? {
            Value::Reading(reading) => Some(*reading),
            _ => None,
        }
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<&'static str> {
        match self.get(name)? {
            Value::State(state) => Some(*state),
            _ => None,
        }
    }

    #[must_use]
    pub fn discrete(&self, name: &str) -> Option<u8> {
        match self.get(name)? {
            Value::Discrete(n) => Some(*n),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

    use super::{Decoded, Reading, Unit, Value};

    impl Serialize for Unit {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.as_str())
        }
    }

    impl Serialize for Reading {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("Reading", 2)?;
            state.serialize_field("value", &self.value())?;
            state.serialize_field("unit", &self.unit)?;
            state.end()
        }
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Reading(reading) => reading.serialize(serializer),
                Value::State(state) => {
                    let mut s = serializer.serialize_struct("State", 1)?;
                    s.serialize_field("value", state)?;
                    s.end()
                }
                Value::Discrete(n) => {
                    let mut s = serializer.serialize_struct("Discrete", 1)?;
                    s.serialize_field("value", n)?;
                    s.end()
                }
            }
        }
    }

    /// `{ "engine_speed": { "value": 1250.0, "unit": "RPM" } }`
    impl Serialize for Decoded {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.fields.len()))?;
            for field in &self.fields {
                map.serialize_entry(field.name, &field.value)?;
            }
            map.end()
        }
    }
}
