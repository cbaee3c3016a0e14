//! The object ID newtype.
//!
//! A Cryptomatte ID is a 32-bit float whose bit pattern is what matters.
//! `ObjectId` compares, hashes and orders by bits, so two IDs are equal
//! exactly when every bit matches.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Byte order used when moving ID bits through a byte buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// A Cryptomatte object ID.
#[derive(Clone, Copy)]
pub struct ObjectId(f32);

impl ObjectId {
    /// Wraps a raw float read from an ID channel.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self(value)
    }

    /// Builds an ID from its IEEE-754 bit pattern.
    #[inline]
    pub fn from_bits(bits: u32) -> Self {
        Self(f32::from_bits(bits))
    }

    /// Reinterprets four bytes as an ID in the given byte order.
    #[inline]
    pub fn from_bytes(bytes: [u8; 4], order: ByteOrder) -> Self {
        match order {
            ByteOrder::Little => Self(f32::from_le_bytes(bytes)),
            ByteOrder::Big => Self(f32::from_be_bytes(bytes)),
        }
    }

    /// Parses the manifest representation: the bit pattern as big-endian hex.
    ///
    /// Shorter strings are left-padded with zeros, a `0x` prefix is accepted.
    /// Returns `None` when the text is not hex or needs more than 32 bits.
    pub fn from_hex(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() || digits.starts_with('+') {
            return None;
        }
        let bits = u32::from_str_radix(digits, 16).ok()?;
        Some(Self::from_bytes(bits.to_be_bytes(), ByteOrder::Big))
    }

    /// Returns the float stored in the ID channels.
    #[inline]
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Returns the raw bit pattern.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.0.to_bits()
    }

    /// Returns the bytes of the ID in the given byte order.
    #[inline]
    pub fn to_bytes(&self, order: ByteOrder) -> [u8; 4] {
        match order {
            ByteOrder::Little => self.0.to_le_bytes(),
            ByteOrder::Big => self.0.to_be_bytes(),
        }
    }

    /// Formats the bit pattern as 8 lowercase hex digits, as manifests store it.
    pub fn to_hex(&self) -> String {
        format!("{:08x}", self.bits())
    }

    /// A color derived from the ID bits, used by renderers for ID previews.
    ///
    /// Red is always 0; green and blue are the bits shifted left by 8 and 16,
    /// truncated to 32 bits and normalized.
    pub fn preview_rgb(&self) -> [f32; 3] {
        let bits = u64::from(self.bits());
        let mask = u64::from(u32::MAX);
        let green = ((bits << 8) & mask) as f64 / mask as f64;
        let blue = ((bits << 16) & mask) as f64 / mask as f64;
        [0.0, green as f32, blue as f32]
    }
}

impl PartialEq for ObjectId {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for ObjectId {}

impl Hash for ObjectId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bits().cmp(&other.bits())
    }
}

impl From<f32> for ObjectId {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:08x} = {:e})", self.bits(), self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.bits())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
