use embedded_can::ExtendedId;

/// A J1939 message identifier. This is a 29-bit extended CAN ID with a 3-bit
/// priority, the parameter group number (PGN) in bits 8 to 24, and an 8-bit
/// source address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id(ExtendedId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Format {
    Pdu1,
    Pdu2,
}

impl Format {
    #[inline]
    #[must_use]
    pub fn from_pgn(pgn: u32) -> Self {
        let id_pf = (pgn >> 8) & 0xff;

        if id_pf < 240 {
            Self::Pdu1
        } else {
            Self::Pdu2
        }
    }
}

pub const DESTINATION_BROADCAST: u8 = 0xff;

const PGN_MASK: u32 = 0x1ffff;

impl Id {
    /// Build an identifier from its parts. For PDU1 groups the destination
    /// is placed in the low byte of the PGN field, PDU2 groups ignore it.
    #[inline]
    #[must_use]
    pub const fn new(priority: u8, pgn: u32, source: u8, destination: u8) -> Self {
        debug_assert!(priority <= 7, "Priority must be in the range 0-7");
        debug_assert!(pgn <= PGN_MASK, "PGN must fit in 17 bits");

        let pgn = pgn & PGN_MASK;
        let id_pf = (pgn >> 8) & 0xff;

        let pgn_field = if id_pf < 240 {
            // PDU1
            (pgn & 0x1ff00) | destination as u32
        } else {
            // PDU2
            pgn
        };

        let raw = (priority as u32 & 0x7) << 26 | pgn_field << 8 | source as u32;

        // 3 + 17 + 8 bits always fit in 29
        match ExtendedId::new(raw) {
            Some(id) => Self(id),
            None => Self(ExtendedId::ZERO),
        }
    }

    /// Wrap a raw 29-bit arbitration identifier, or `None` if it does not
    /// fit in 29 bits.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match ExtendedId::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Create a new identifier from an extended CAN ID.
    #[inline]
    #[must_use]
    pub const fn from_can_id(can_id: ExtendedId) -> Self {
        Self(can_id)
    }

    #[inline]
    #[must_use]
    pub const fn as_can_id(self) -> ExtendedId {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn as_raw(self) -> u32 {
        self.0.as_raw()
    }

    #[inline]
    #[must_use]
    pub fn priority(self) -> u8 {
        (self.0.as_raw() >> 26) as u8 & 0x7
    }

    /// The parameter group number, `(id >> 8) & 0x1ffff`.
    ///
    /// The destination byte of PDU1 groups stays in place; the decode table
    /// is keyed on exactly these 17 bits.
    #[inline]
    #[must_use]
    pub fn pgn(self) -> u32 {
        (self.0.as_raw() >> 8) & PGN_MASK
    }

    #[inline]
    #[must_use]
    pub fn source(self) -> u8 {
        self.0.as_raw() as u8
    }

    #[inline]
    #[must_use]
    pub fn format(self) -> Format {
        Format::from_pgn(self.pgn())
    }

    #[inline]
    #[must_use]
    pub fn destination(self) -> u8 {
        match self.format() {
            Format::Pdu1 => (self.0.as_raw() >> 8) as u8,
            Format::Pdu2 => DESTINATION_BROADCAST, // implied global
        }
    }
}

impl From<ExtendedId> for Id {
    fn from(id: ExtendedId) -> Self {
        Self::from_can_id(id)
    }
}

impl From<Id> for embedded_can::Id {
    fn from(id: Id) -> Self {
        Self::Extended(id.as_can_id())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Id {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Id({:x})", self.0.as_raw())
    }
}
