//! Encoder: walks a value tree and writes MessagePack bytes
//!
//! Core values are written straight into the output sink. Extension values
//! are written in two passes: the payload goes into a scratch sink first,
//! then it is framed as `ext header + sub-type byte + payload` once its
//! length is known.

use tracing::trace;

use crate::config::CodecConfig;
use crate::error::EncodeError;
use crate::timestamp::Timestamp;
use crate::value::{Class, Object, ReductionOutcome, Value};
use crate::wire::format::{FALSE, FLOAT64, NIL, TRUE, UINT64};
use crate::wire::width::{
    array_len_width, bin_len_width, ext_len_width, int_width, map_len_width, str_len_width,
};
use crate::wire::{ByteSink, ExtType};

/// Writes values into a [`ByteSink`], tracking container depth.
pub struct Encoder<'s> {
    sink: &'s mut ByteSink,
    config: &'s CodecConfig,
    depth: usize,
}

impl<'s> Encoder<'s> {
    /// Create an encoder writing into `sink`.
    pub fn new(sink: &'s mut ByteSink, config: &'s CodecConfig) -> Self {
        Self {
            sink,
            config,
            depth: 0,
        }
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    // ═══════════════════════════════════════════════════════════════════
    // Depth Guard
    // ═══════════════════════════════════════════════════════════════════

    fn enter(&mut self) -> Result<(), EncodeError> {
        if self.depth >= self.config.max_depth {
            return Err(EncodeError::RecursionLimitExceeded {
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
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════

    /// Encode one value.
    ///
    /// Every arm is a single call so the frame that recurses through
    /// containers stays small.
    pub fn encode(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Nil => self.put_u8(NIL),
            Value::Bool(false) => self.put_u8(FALSE),
            Value::Bool(true) => self.put_u8(TRUE),
            Value::Int(n) => self.write_int(*n),
            Value::UInt(n) => self.write_uint(*n),
            Value::Float(n) => self.write_float(*n),
            Value::Bytes(b) => self.write_bin(b),
            Value::Str(s) => self.write_str(s),
            Value::Array(items) => self.write_array(items),
            Value::Map(pairs) => self.write_map(pairs),

            Value::Complex { re, im } => self.write_complex(*re, *im),
            Value::ByteArray(b) => self.write_byte_array(b),
            Value::List(items) => self.write_sequence(ExtType::List, items),
            Value::Set(items) => self.write_sequence(ExtType::Set, items),
            Value::FrozenSet(items) => self.write_sequence(ExtType::FrozenSet, items),
            Value::Class(class) => self.write_class(class),
            Value::Singleton(singleton) => self.write_singleton(singleton.name()),
            Value::Object(object) => self.write_object(object),
            Value::Timestamp(ts) => self.write_timestamp(ts),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Core Writers
    // ═══════════════════════════════════════════════════════════════════

    fn put_u8(&mut self, tag: u8) -> Result<(), EncodeError> {
        self.sink.put_u8(tag);
        Ok(())
    }

    fn write_int(&mut self, value: i64) -> Result<(), EncodeError> {
        let width = int_width(value);
        match width.tag() {
            // fixints are their own tag byte, negative ones included
            None => self.sink.put_u8(value as u8),
            Some(tag) => {
                let bytes = value.to_be_bytes();
                self.sink.put_tagged(tag, &bytes[8 - width.size()..]);
            }
        }
        Ok(())
    }

    fn write_uint(&mut self, value: u64) -> Result<(), EncodeError> {
        match i64::try_from(value) {
            Ok(value) => self.write_int(value),
            Err(_) => {
                self.sink.put_tagged(UINT64, &value.to_be_bytes());
                Ok(())
            }
        }
    }

    fn write_float(&mut self, value: f64) -> Result<(), EncodeError> {
        self.sink.put_tagged(FLOAT64, &value.to_be_bytes());
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        let header = str_len_width(s.len())?;
        self.sink.put_header(header, s.len());
        self.sink.put_slice(s.as_bytes());
        Ok(())
    }

    fn write_bin(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let header = bin_len_width(bytes.len())?;
        self.sink.put_header(header, bytes.len());
        self.sink.put_slice(bytes);
        Ok(())
    }

    fn write_array(&mut self, items: &[Value]) -> Result<(), EncodeError> {
        self.enter()?;
        let header = array_len_width(items.len())?;
        self.sink.put_header(header, items.len());
        for item in items {
            self.encode(item)?;
        }
        self.exit();
        Ok(())
    }

    fn write_map(&mut self, pairs: &[(Value, Value)]) -> Result<(), EncodeError> {
        self.enter()?;
        let header = map_len_width(pairs.len())?;
        self.sink.put_header(header, pairs.len());
        for (key, value) in pairs {
            self.encode(key)?;
            self.encode(value)?;
        }
        self.exit();
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extensions
    // ═══════════════════════════════════════════════════════════════════

    #[inline(never)]
    fn write_complex(&mut self, re: f64, im: f64) -> Result<(), EncodeError> {
        self.write_extension(ExtType::Complex, |e| {
            e.sink.put_slice(&re.to_be_bytes());
            e.sink.put_slice(&im.to_be_bytes());
            Ok(())
        })
    }

    #[inline(never)]
    fn write_byte_array(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.write_extension(ExtType::ByteArray, |e| {
            e.sink.put_slice(bytes);
            Ok(())
        })
    }

    /// List, set and frozen set payloads are a plain array.
    #[inline(never)]
    fn write_sequence(&mut self, ext: ExtType, items: &[Value]) -> Result<(), EncodeError> {
        let mut scratch = ByteSink::with_min_alloc(self.config.min_alloc);
        self.nested(&mut scratch).write_array(items)?;
        self.frame_extension(ext, &scratch)
    }

    #[inline(never)]
    fn write_class(&mut self, class: &Class) -> Result<(), EncodeError> {
        self.write_extension(ExtType::Class, |e| {
            e.write_str(class.module())?;
            e.write_str(class.qualname())
        })
    }

    #[inline(never)]
    fn write_singleton(&mut self, name: &str) -> Result<(), EncodeError> {
        self.write_extension(ExtType::Singleton, |e| e.write_str(name))
    }

    #[inline(never)]
    fn write_object(&mut self, object: &Object) -> Result<(), EncodeError> {
        let outcome = object
            .reduce()
            .map_err(|source| EncodeError::NotSerializable {
                type_name: object.type_name().to_string(),
                source,
            })?;
        match outcome {
            ReductionOutcome::Singleton(name) => self.write_singleton(&name),
            ReductionOutcome::Object(reduction) => {
                let descriptor = reduction.to_value();
                self.write_extension(ExtType::Object, |e| e.encode(&descriptor))
            }
        }
    }

    #[inline(never)]
    fn write_timestamp(&mut self, ts: &Timestamp) -> Result<(), EncodeError> {
        self.write_extension(ExtType::Timestamp, |e| {
            ts.write_payload(e.sink);
            Ok(())
        })
    }

    /// Encoder over a scratch sink at the current depth, so nesting through
    /// extensions counts against the same limit.
    fn nested<'t>(&self, sink: &'t mut ByteSink) -> Encoder<'t>
    where
        's: 't,
    {
        Encoder {
            sink,
            config: self.config,
            depth: self.depth,
        }
    }

    /// Write `payload` into a scratch sink, then frame it.
    fn write_extension<F>(&mut self, ext: ExtType, payload: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Encoder<'_>) -> Result<(), EncodeError>,
    {
        let mut scratch = ByteSink::with_min_alloc(self.config.min_alloc);
        payload(&mut self.nested(&mut scratch))?;
        self.frame_extension(ext, &scratch)
    }

    fn frame_extension(&mut self, ext: ExtType, payload: &ByteSink) -> Result<(), EncodeError> {
        let len = payload.len();
        let header = ext_len_width(len)?;
        trace!(ext = ext.name(), len, "framing extension");
        self.sink.put_header(header, len);
        self.sink.put_u8(ext.as_u8());
        self.sink.put_slice(payload.as_slice());
        Ok(())
    }
}

/// Encode `value` into `sink`.
pub fn encode_value(
    sink: &mut ByteSink,
    value: &Value,
    config: &CodecConfig,
) -> Result<(), EncodeError> {
    Encoder::new(sink, config).encode(value)
}

/// Pack a value with the default configuration.
pub fn pack(value: &Value) -> Result<Vec<u8>, EncodeError> {
    pack_with(value, &CodecConfig::default())
}

/// Pack a value with an explicit configuration.
pub fn pack_with(value: &Value, config: &CodecConfig) -> Result<Vec<u8>, EncodeError> {
    let mut sink = ByteSink::with_min_alloc(config.min_alloc);
    encode_value(&mut sink, value, config)?;
    Ok(sink.into_vec())
}

/// Registry key of a class: its module and qualified name as two strings.
pub(crate) fn class_key(module: &str, qualname: &str) -> Result<Vec<u8>, EncodeError> {
    let config = CodecConfig::default();
    let mut sink = ByteSink::new();
    let mut encoder = Encoder::new(&mut sink, &config);
    encoder.write_str(module)?;
    encoder.write_str(qualname)?;
    Ok(sink.into_vec())
}

/// Registry key of a singleton: its name as one string.
pub(crate) fn singleton_key(name: &str) -> Result<Vec<u8>, EncodeError> {
    let config = CodecConfig::default();
    let mut sink = ByteSink::new();
    Encoder::new(&mut sink, &config).write_str(name)?;
    Ok(sink.into_vec())
}
