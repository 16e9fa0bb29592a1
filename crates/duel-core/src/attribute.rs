//! Monster attributes.
//!
//! Attributes are wire bit flags. Announcement prompts send an
//! availability mask; the enumeration order of [`Attribute::ALL`]
//! matches the wire bit order because reply indices depend on it.

/// A monster attribute flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attribute(u32);

impl Attribute {
    pub const EARTH: Attribute = Attribute(0x01);
    pub const WATER: Attribute = Attribute(0x02);
    pub const FIRE: Attribute = Attribute(0x04);
    pub const WIND: Attribute = Attribute(0x08);
    pub const LIGHT: Attribute = Attribute(0x10);
    pub const DARK: Attribute = Attribute(0x20);
    pub const DIVINE: Attribute = Attribute(0x40);

    /// All attributes in wire bit order.
    pub const ALL: [Attribute; 7] = [
        Attribute::EARTH,
        Attribute::WATER,
        Attribute::FIRE,
        Attribute::WIND,
        Attribute::LIGHT,
        Attribute::DARK,
        Attribute::DIVINE,
    ];

    pub fn from_raw(raw: u32) -> Self {
        Attribute(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// True if this attribute is contained in the availability mask.
    pub fn in_mask(self, mask: u32) -> bool {
        mask & self.0 != 0
    }
}
