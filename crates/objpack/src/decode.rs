//! Decoder: reads MessagePack bytes back into a value tree
//!
//! Every read is bounds checked before it happens. Extension payloads are
//! decoded by a sub-decoder whose view ends at the declared payload end, so
//! a payload can never read into the bytes that follow it.

use tracing::trace;

use crate::config::CodecConfig;
use crate::error::DecodeError;
use crate::reduce::{reconstruct, Reduction};
use crate::registry::Registry;
use crate::timestamp::Timestamp;
use crate::value::{dedup, display_name, Value};
use crate::wire::format::*;
use crate::wire::{ExtType, IntWidth, Prefix};

/// Reads values from a byte buffer, tracking position and container depth.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    registry: &'a Registry,
    config: &'a CodecConfig,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder at the start of `buf`.
    pub fn new(buf: &'a [u8], registry: &'a Registry, config: &'a CodecConfig) -> Self {
        Self::at(buf, 0, registry, config)
    }

    /// Create a decoder starting at `pos`.
    pub fn at(buf: &'a [u8], pos: usize, registry: &'a Registry, config: &'a CodecConfig) -> Self {
        Self {
            buf,
            pos,
            registry,
            config,
            depth: 0,
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    // ═══════════════════════════════════════════════════════════════════
    // Depth Guard
    // ═══════════════════════════════════════════════════════════════════

    fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.config.max_depth {
            return Err(DecodeError::RecursionLimitExceeded {
                max: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Bounded Reads
    // ═══════════════════════════════════════════════════════════════════

    fn end_of(&self, needed: usize) -> Result<usize, DecodeError> {
        self.pos
            .checked_add(needed)
            .filter(|end| *end <= self.buf.len())
            .ok_or(DecodeError::UnexpectedEndOfInput {
                offset: self.pos,
                needed,
            })
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.end_of(needed)?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_len(&mut self, prefix: Prefix) -> Result<usize, DecodeError> {
        Ok(match prefix {
            Prefix::None => 0,
            Prefix::U8 => self.read_u8()? as usize,
            Prefix::U16 => u16::from_be_bytes(self.take_array()?) as usize,
            Prefix::U32 => u32::from_be_bytes(self.take_array()?) as usize,
        })
    }

    /// Upper bound for preallocation: every item takes at least one byte.
    fn capacity_hint(&self, items: usize) -> usize {
        items.min(self.buf.len().saturating_sub(self.pos))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════

    /// Decode one value.
    pub fn decode(&mut self) -> Result<Value, DecodeError> {
        let tag = self.read_u8()?;
        match tag {
            POSITIVE_FIXINT..=POSITIVE_FIXINT_END => Ok(Value::Int(tag as i64)),
            FIXMAP..=FIXMAP_END => self.read_map((tag & FIXOBJ_BITS) as usize),
            FIXARRAY..=FIXARRAY_END => self.read_array((tag & FIXOBJ_BITS) as usize),
            FIXSTR..=FIXSTR_END => self.read_str((tag & FIXSTR_BITS) as usize),
            NIL => Ok(Value::Nil),
            INVALID => Err(DecodeError::InvalidTypeTag {
                context: "msgpack",
                tag,
            }),
            FALSE => Ok(Value::Bool(false)),
            TRUE => Ok(Value::Bool(true)),
            BIN8 => self.read_len_then(Prefix::U8, Self::read_bin),
            BIN16 => self.read_len_then(Prefix::U16, Self::read_bin),
            BIN32 => self.read_len_then(Prefix::U32, Self::read_bin),
            EXT8 => self.read_len_then(Prefix::U8, Self::read_extension),
            EXT16 => self.read_len_then(Prefix::U16, Self::read_extension),
            EXT32 => self.read_len_then(Prefix::U32, Self::read_extension),
            FLOAT32 => self.read_float32(),
            FLOAT64 => self.read_float64(),
            UINT8..=INT64 => match IntWidth::from_tag(tag) {
                Some(width) => self.read_int(width),
                None => Err(DecodeError::InvalidTypeTag {
                    context: "msgpack",
                    tag,
                }),
            },
            FIXEXT1 => self.read_extension(1),
            FIXEXT2 => self.read_extension(2),
            FIXEXT4 => self.read_extension(4),
            FIXEXT8 => self.read_extension(8),
            FIXEXT16 => self.read_extension(16),
            STR8 => self.read_len_then(Prefix::U8, Self::read_str),
            STR16 => self.read_len_then(Prefix::U16, Self::read_str),
            STR32 => self.read_len_then(Prefix::U32, Self::read_str),
            ARRAY16 => self.read_len_then(Prefix::U16, Self::read_array),
            ARRAY32 => self.read_len_then(Prefix::U32, Self::read_array),
            MAP16 => self.read_len_then(Prefix::U16, Self::read_map),
            MAP32 => self.read_len_then(Prefix::U32, Self::read_map),
            NEGATIVE_FIXINT..=NEGATIVE_FIXINT_END => Ok(Value::Int(tag as i8 as i64)),
        }
    }

    fn read_len_then(
        &mut self,
        prefix: Prefix,
        read: fn(&mut Self, usize) -> Result<Value, DecodeError>,
    ) -> Result<Value, DecodeError> {
        let len = self.read_len(prefix)?;
        read(self, len)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Core Readers
    // ═══════════════════════════════════════════════════════════════════

    fn read_int(&mut self, width: IntWidth) -> Result<Value, DecodeError> {
        let size = width.size();
        let raw = self
            .take(size)?
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | *byte as u64);
        if width.is_signed() {
            // sign-extend from the payload width
            let shift = 64 - 8 * size as u32;
            Ok(Value::Int(((raw << shift) as i64) >> shift))
        } else {
            Ok(Value::from(raw))
        }
    }

    fn read_float32(&mut self) -> Result<Value, DecodeError> {
        Ok(Value::Float(f32::from_be_bytes(self.take_array()?) as f64))
    }

    fn read_float64(&mut self) -> Result<Value, DecodeError> {
        Ok(Value::Float(f64::from_be_bytes(self.take_array()?)))
    }

    fn read_bin(&mut self, len: usize) -> Result<Value, DecodeError> {
        Ok(Value::bytes(self.take(len)?))
    }

    fn read_str(&mut self, len: usize) -> Result<Value, DecodeError> {
        let offset = self.pos;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset })?;
        Ok(Value::string(s))
    }

    fn read_items(&mut self, len: usize) -> Result<Vec<Value>, DecodeError> {
        self.enter()?;
        let mut items = Vec::with_capacity(self.capacity_hint(len));
        for _ in 0..len {
            items.push(self.decode()?);
        }
        self.exit();
        Ok(items)
    }

    fn read_array(&mut self, len: usize) -> Result<Value, DecodeError> {
        Ok(Value::array(self.read_items(len)?))
    }

    fn read_map(&mut self, len: usize) -> Result<Value, DecodeError> {
        self.enter()?;
        let mut pairs = Vec::with_capacity(self.capacity_hint(len));
        for _ in 0..len {
            let key = self.decode()?;
            let value = self.decode()?;
            pairs.push((key, value));
        }
        self.exit();
        Ok(Value::map(pairs))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extensions
    // ═══════════════════════════════════════════════════════════════════

    fn read_extension(&mut self, len: usize) -> Result<Value, DecodeError> {
        let raw_type = self.read_u8()?;
        let end = self.end_of(len)?;
        let ext = ExtType::try_from(raw_type)?;
        trace!(ext = ext.name(), len, "dispatching extension");

        let mut payload = Decoder {
            buf: &self.buf[..end],
            pos: self.pos,
            registry: self.registry,
            config: self.config,
            depth: self.depth,
        };
        let value = payload.read_payload(ext, len)?;
        if payload.pos != end {
            return Err(DecodeError::InvalidSize {
                what: ext.name(),
                size: len,
            });
        }
        self.pos = end;
        Ok(value)
    }

    fn read_payload(&mut self, ext: ExtType, len: usize) -> Result<Value, DecodeError> {
        match ext {
            ExtType::Complex => {
                if len != 16 {
                    return Err(DecodeError::InvalidSize {
                        what: ext.name(),
                        size: len,
                    });
                }
                let re = f64::from_be_bytes(self.take_array()?);
                let im = f64::from_be_bytes(self.take_array()?);
                Ok(Value::complex(re, im))
            }
            ExtType::ByteArray => Ok(Value::byte_array(self.take(len)?)),
            ExtType::List => Ok(Value::List(self.read_sequence()?.into())),
            ExtType::Set => Ok(Value::Set(dedup(self.read_sequence()?).into())),
            ExtType::FrozenSet => Ok(Value::FrozenSet(dedup(self.read_sequence()?).into())),
            ExtType::Class => self.read_reference("class", len),
            ExtType::Singleton => self.read_reference("singleton", len),
            ExtType::Object => self.read_object(),
            ExtType::Timestamp => Ok(Value::Timestamp(Timestamp::read_payload(
                self.take(len)?,
            )?)),
        }
    }

    /// Length of the array header that opens a list or set payload.
    fn read_sequence_len(&mut self) -> Result<usize, DecodeError> {
        let tag = self.read_u8()?;
        match tag {
            FIXARRAY..=FIXARRAY_END => Ok((tag & FIXOBJ_BITS) as usize),
            ARRAY16 => self.read_len(Prefix::U16),
            ARRAY32 => self.read_len(Prefix::U32),
            _ => Err(DecodeError::InvalidTypeTag {
                context: "array",
                tag,
            }),
        }
    }

    fn read_sequence(&mut self) -> Result<Vec<Value>, DecodeError> {
        let len = self.read_sequence_len()?;
        self.read_items(len)
    }

    #[inline(never)]
    fn read_object(&mut self) -> Result<Value, DecodeError> {
        let descriptor = self.decode()?;
        let reduction = Reduction::from_value(&descriptor)?;
        Ok(Value::Object(reconstruct(reduction)?))
    }

    #[inline(never)]
    fn read_reference(&mut self, kind: &'static str, len: usize) -> Result<Value, DecodeError> {
        let key = self.take(len)?;
        match self.registry.resolve(key) {
            Some(value) => Ok(value),
            None => Err(DecodeError::UnresolvedReference {
                kind,
                name: reference_name(kind, key),
            }),
        }
    }
}

/// Readable name for an unregistered key, for error messages only.
///
/// The key is read as plain strings. Anything else in it falls back to the
/// key length, so a hostile key never reaches the value decoder.
fn reference_name(kind: &str, key: &[u8]) -> String {
    let mut pos = 0;
    let mut next_str = || key_str(key, &mut pos);
    let name = match kind {
        "class" => next_str()
            .zip(next_str())
            .map(|(module, qualname)| display_name(module, qualname)),
        _ => next_str().map(str::to_string),
    };
    name.unwrap_or_else(|| format!("<{} byte key>", key.len()))
}

/// One string at `*pos`, advancing past it.
fn key_str<'k>(key: &'k [u8], pos: &mut usize) -> Option<&'k str> {
    let tag = *key.get(*pos)?;
    let (len, header) = match tag {
        FIXSTR..=FIXSTR_END => ((tag & FIXSTR_BITS) as usize, 1),
        STR8 => (*key.get(*pos + 1)? as usize, 2),
        STR16 => {
            let bytes = key.get(*pos + 1..*pos + 3)?;
            (u16::from_be_bytes([bytes[0], bytes[1]]) as usize, 3)
        }
        STR32 => {
            let bytes = key.get(*pos + 1..*pos + 5)?;
            (
                u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize,
                5,
            )
        }
        _ => return None,
    };
    let start = *pos + header;
    let end = start.checked_add(len)?;
    let s = std::str::from_utf8(key.get(start..end)?).ok()?;
    *pos = end;
    Some(s)
}

/// Decode one value from `buf` starting at `*cursor`, advancing the cursor.
pub fn decode_value(
    buf: &[u8],
    cursor: &mut usize,
    registry: &Registry,
    config: &CodecConfig,
) -> Result<Value, DecodeError> {
    let mut decoder = Decoder::at(buf, *cursor, registry, config);
    let value = decoder.decode()?;
    *cursor = decoder.position();
    Ok(value)
}

/// Unpack one value using the global registry.
///
/// Returns the value and the number of bytes consumed.
pub fn unpack(buf: &[u8]) -> Result<(Value, usize), DecodeError> {
    unpack_with(buf, Registry::global(), &CodecConfig::default())
}

/// Unpack one value with an explicit registry and configuration.
pub fn unpack_with(
    buf: &[u8],
    registry: &Registry,
    config: &CodecConfig,
) -> Result<(Value, usize), DecodeError> {
    let mut decoder = Decoder::new(buf, registry, config);
    let value = decoder.decode()?;
    Ok((value, decoder.position()))
}
