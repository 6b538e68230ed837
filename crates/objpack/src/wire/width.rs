//! Width selection: the smallest wire representation for an integer or length.
//!
//! Every family escalates through the same tier table shape: an optional
//! inline "fix" form, then explicit 8, 16 and 32-bit length prefixes. The
//! first tier whose exclusive bound exceeds the magnitude wins.

use super::format::*;
use crate::error::EncodeError;

/// Size of the explicit length prefix that follows a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// Length is embedded in the tag (or implied by it)
    None,
    /// One byte
    U8,
    /// Two bytes, big-endian
    U16,
    /// Four bytes, big-endian
    U32,
}

impl Prefix {
    /// Number of prefix bytes.
    pub fn size(self) -> usize {
        match self {
            Prefix::None => 0,
            Prefix::U8 => 1,
            Prefix::U16 => 2,
            Prefix::U32 => 4,
        }
    }
}

/// A selected header: the tag byte plus how the length follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Tag byte, with the length already folded in for fix forms
    pub tag: u8,
    /// Explicit length prefix
    pub prefix: Prefix,
}

impl Header {
    /// Total header size in bytes.
    pub fn size(&self) -> usize {
        1 + self.prefix.size()
    }
}

#[derive(Debug, Clone, Copy)]
enum Tier {
    Fix(u8),
    Prefixed(u8, Prefix),
}

struct LenFamily {
    what: &'static str,
    tiers: &'static [(u64, Tier)],
}

const STR: LenFamily = LenFamily {
    what: "str",
    tiers: &[
        (FIXSTR_MAX as u64, Tier::Fix(FIXSTR)),
        (1 << 8, Tier::Prefixed(STR8, Prefix::U8)),
        (1 << 16, Tier::Prefixed(STR16, Prefix::U16)),
        (1 << 32, Tier::Prefixed(STR32, Prefix::U32)),
    ],
};

const BIN: LenFamily = LenFamily {
    what: "bytes",
    tiers: &[
        (1 << 8, Tier::Prefixed(BIN8, Prefix::U8)),
        (1 << 16, Tier::Prefixed(BIN16, Prefix::U16)),
        (1 << 32, Tier::Prefixed(BIN32, Prefix::U32)),
    ],
};

const ARRAY: LenFamily = LenFamily {
    what: "array",
    tiers: &[
        (FIXOBJ_MAX as u64, Tier::Fix(FIXARRAY)),
        (1 << 16, Tier::Prefixed(ARRAY16, Prefix::U16)),
        (1 << 32, Tier::Prefixed(ARRAY32, Prefix::U32)),
    ],
};

const MAP: LenFamily = LenFamily {
    what: "map",
    tiers: &[
        (FIXOBJ_MAX as u64, Tier::Fix(FIXMAP)),
        (1 << 16, Tier::Prefixed(MAP16, Prefix::U16)),
        (1 << 32, Tier::Prefixed(MAP32, Prefix::U32)),
    ],
};

const EXT: LenFamily = LenFamily {
    what: "extension data",
    tiers: &[
        (1 << 8, Tier::Prefixed(EXT8, Prefix::U8)),
        (1 << 16, Tier::Prefixed(EXT16, Prefix::U16)),
        (1 << 32, Tier::Prefixed(EXT32, Prefix::U32)),
    ],
};

/// Pick the first tier whose exclusive bound is above `magnitude`.
fn escalate<T: Copy>(tiers: &[(u64, T)], magnitude: u64) -> Option<T> {
    tiers
        .iter()
        .find(|(bound, _)| magnitude < *bound)
        .map(|(_, tier)| *tier)
}

impl LenFamily {
    fn select(&self, len: usize) -> Result<Header, EncodeError> {
        let magnitude = len as u64;
        match escalate(self.tiers, magnitude) {
            // fix tiers only cover lengths that fit in the tag's low bits
            Some(Tier::Fix(base)) => Ok(Header {
                tag: base | (len as u8),
                prefix: Prefix::None,
            }),
            Some(Tier::Prefixed(tag, prefix)) => Ok(Header { tag, prefix }),
            None => Err(EncodeError::ValueTooLarge {
                what: self.what,
                len: magnitude,
            }),
        }
    }
}

/// Header for a `str` of `len` UTF-8 bytes.
pub fn str_len_width(len: usize) -> Result<Header, EncodeError> {
    STR.select(len)
}

/// Header for a `bin` of `len` bytes.
pub fn bin_len_width(len: usize) -> Result<Header, EncodeError> {
    BIN.select(len)
}

/// Header for an array of `len` elements.
pub fn array_len_width(len: usize) -> Result<Header, EncodeError> {
    ARRAY.select(len)
}

/// Header for a map of `len` pairs.
pub fn map_len_width(len: usize) -> Result<Header, EncodeError> {
    MAP.select(len)
}

/// Header for an extension payload of `len` bytes (excluding the type byte).
pub fn ext_len_width(len: usize) -> Result<Header, EncodeError> {
    let fixed = match len {
        1 => Some(FIXEXT1),
        2 => Some(FIXEXT2),
        4 => Some(FIXEXT4),
        8 => Some(FIXEXT8),
        16 => Some(FIXEXT16),
        _ => None,
    };
    match fixed {
        Some(tag) => Ok(Header {
            tag,
            prefix: Prefix::None,
        }),
        None => EXT.select(len),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Integers
// ═══════════════════════════════════════════════════════════════════

/// Integer representation chosen for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// Value is the tag byte itself (-32..=127)
    Fix,
    /// `int 8`
    Int8,
    /// `int 16`
    Int16,
    /// `int 32`
    Int32,
    /// `int 64`
    Int64,
    /// `uint 8`
    Uint8,
    /// `uint 16`
    Uint16,
    /// `uint 32`
    Uint32,
    /// `uint 64`
    Uint64,
}

const NEGATIVE: [(u64, IntWidth); 4] = [
    (1 << 7, IntWidth::Int8),
    (1 << 15, IntWidth::Int16),
    (1 << 31, IntWidth::Int32),
    (1 << 63, IntWidth::Int64),
];

const NON_NEGATIVE: [(u64, IntWidth); 3] = [
    (1 << 8, IntWidth::Uint8),
    (1 << 16, IntWidth::Uint16),
    (1 << 32, IntWidth::Uint32),
];

impl IntWidth {
    /// Tag byte, or `None` for fixints.
    pub fn tag(self) -> Option<u8> {
        match self {
            IntWidth::Fix => None,
            IntWidth::Int8 => Some(INT8),
            IntWidth::Int16 => Some(INT16),
            IntWidth::Int32 => Some(INT32),
            IntWidth::Int64 => Some(INT64),
            IntWidth::Uint8 => Some(UINT8),
            IntWidth::Uint16 => Some(UINT16),
            IntWidth::Uint32 => Some(UINT32),
            IntWidth::Uint64 => Some(UINT64),
        }
    }

    /// Number of payload bytes after the tag.
    pub fn size(self) -> usize {
        match self {
            IntWidth::Fix => 0,
            IntWidth::Int8 | IntWidth::Uint8 => 1,
            IntWidth::Int16 | IntWidth::Uint16 => 2,
            IntWidth::Int32 | IntWidth::Uint32 => 4,
            IntWidth::Int64 | IntWidth::Uint64 => 8,
        }
    }

    /// Whether the payload is two's complement.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntWidth::Int8 | IntWidth::Int16 | IntWidth::Int32 | IntWidth::Int64
        )
    }

    /// Map an explicit integer tag back to its width.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            INT8 => Some(IntWidth::Int8),
            INT16 => Some(IntWidth::Int16),
            INT32 => Some(IntWidth::Int32),
            INT64 => Some(IntWidth::Int64),
            UINT8 => Some(IntWidth::Uint8),
            UINT16 => Some(IntWidth::Uint16),
            UINT32 => Some(IntWidth::Uint32),
            UINT64 => Some(IntWidth::Uint64),
            _ => None,
        }
    }
}

/// Smallest representation for a signed integer.
pub fn int_width(value: i64) -> IntWidth {
    if (FIXINT_MIN..FIXUINT_MAX).contains(&value) {
        IntWidth::Fix
    } else if value < 0 {
        // !value == -(value + 1), the magnitude two's complement has to hold
        escalate(&NEGATIVE, !value as u64).unwrap_or(IntWidth::Int64)
    } else {
        escalate(&NON_NEGATIVE, value as u64).unwrap_or(IntWidth::Uint64)
    }
}

/// Smallest representation for an unsigned integer.
pub fn uint_width(value: u64) -> IntWidth {
    match i64::try_from(value) {
        Ok(value) => int_width(value),
        Err(_) => IntWidth::Uint64,
    }
}
