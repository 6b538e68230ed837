//! MessagePack type tags and objpack extension discriminants.
//!
//! See <https://github.com/msgpack/msgpack/blob/master/spec.md>.

#![allow(missing_docs)]

use crate::error::DecodeError;

// ═══════════════════════════════════════════════════════════════════
// Range limits
// ═══════════════════════════════════════════════════════════════════

/// Smallest value encoded as a negative fixint
pub const FIXINT_MIN: i64 = -(1 << 5);
/// Exclusive upper bound of positive fixints
pub const FIXUINT_MAX: i64 = 1 << 7;
/// Exclusive upper bound of fixstr lengths
pub const FIXSTR_MAX: usize = 1 << 5;
/// Exclusive upper bound of fixarray and fixmap lengths
pub const FIXOBJ_MAX: usize = 1 << 4;

/// Mask extracting a fixstr length from its tag
pub const FIXSTR_BITS: u8 = 0x1f;
/// Mask extracting a fixarray or fixmap length from its tag
pub const FIXOBJ_BITS: u8 = 0x0f;

// ═══════════════════════════════════════════════════════════════════
// Type tags
// ═══════════════════════════════════════════════════════════════════

pub const POSITIVE_FIXINT: u8 = 0x00;
pub const POSITIVE_FIXINT_END: u8 = 0x7f;
pub const FIXMAP: u8 = 0x80;
pub const FIXMAP_END: u8 = 0x8f;
pub const FIXARRAY: u8 = 0x90;
pub const FIXARRAY_END: u8 = 0x9f;
pub const FIXSTR: u8 = 0xa0;
pub const FIXSTR_END: u8 = 0xbf;
pub const NIL: u8 = 0xc0;
pub const INVALID: u8 = 0xc1;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;
pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;
pub const EXT8: u8 = 0xc7;
pub const EXT16: u8 = 0xc8;
pub const EXT32: u8 = 0xc9;
pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;
pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;
pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;
pub const FIXEXT1: u8 = 0xd4;
pub const FIXEXT2: u8 = 0xd5;
pub const FIXEXT4: u8 = 0xd6;
pub const FIXEXT8: u8 = 0xd7;
pub const FIXEXT16: u8 = 0xd8;
pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;
pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;
pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;
pub const NEGATIVE_FIXINT: u8 = 0xe0;
pub const NEGATIVE_FIXINT_END: u8 = 0xff;

// ═══════════════════════════════════════════════════════════════════
// Extension types
// ═══════════════════════════════════════════════════════════════════

/// The reserved "invalid" extension discriminant
pub const EXT_INVALID: u8 = 0x00;

/// Extension discriminant written right after an ext/fixext header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExtType {
    /// Two float64 values
    Complex = 0x01,
    /// Mutable byte buffer
    ByteArray = 0x02,
    /// Ordered, mutable sequence
    List = 0x03,
    /// Mutable set
    Set = 0x04,
    /// Immutable set
    FrozenSet = 0x05,
    /// Registered class reference
    Class = 0x06,
    /// Registered singleton reference
    Singleton = 0x07,
    /// Reducible object instance
    Object = 0x7f,
    /// MessagePack timestamp (type -1)
    Timestamp = 0xff,
}

impl ExtType {
    /// The discriminant byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ExtType::Complex => "complex",
            ExtType::ByteArray => "bytearray",
            ExtType::List => "list",
            ExtType::Set => "set",
            ExtType::FrozenSet => "frozenset",
            ExtType::Class => "class",
            ExtType::Singleton => "singleton",
            ExtType::Object => "object",
            ExtType::Timestamp => "timestamp",
        }
    }
}

impl TryFrom<u8> for ExtType {
    type Error = DecodeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            EXT_INVALID => Err(DecodeError::InvalidTypeTag {
                context: "extension",
                tag,
            }),
            0x01 => Ok(ExtType::Complex),
            0x02 => Ok(ExtType::ByteArray),
            0x03 => Ok(ExtType::List),
            0x04 => Ok(ExtType::Set),
            0x05 => Ok(ExtType::FrozenSet),
            0x06 => Ok(ExtType::Class),
            0x07 => Ok(ExtType::Singleton),
            0x7f => Ok(ExtType::Object),
            0xff => Ok(ExtType::Timestamp),
            _ => Err(DecodeError::UnknownExtensionType { tag }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_type_round_trip() {
        for ext in [
            ExtType::Complex,
            ExtType::ByteArray,
            ExtType::List,
            ExtType::Set,
            ExtType::FrozenSet,
            ExtType::Class,
            ExtType::Singleton,
            ExtType::Object,
            ExtType::Timestamp,
        ] {
            assert_eq!(ExtType::try_from(ext.as_u8()).ok(), Some(ext));
        }
    }

    #[test]
    fn test_ext_type_rejects_invalid_and_unknown() {
        assert!(matches!(
            ExtType::try_from(0x00),
            Err(DecodeError::InvalidTypeTag { tag: 0x00, .. })
        ));
        assert!(matches!(
            ExtType::try_from(0x42),
            Err(DecodeError::UnknownExtensionType { tag: 0x42 })
        ));
    }
}
