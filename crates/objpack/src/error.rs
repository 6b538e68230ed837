//! Error types for objpack encoding, decoding and reconstruction

use thiserror::Error;

use crate::value::Value;

/// Main error type for objpack operations
#[derive(Error, Debug)]
pub enum Error {
    /// Encoding failed
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Decoding failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Registration failed
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// Invalid timestamp
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// Result type alias for objpack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while packing a value.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// A length does not fit the 32-bit wire limit
    #[error("{what} too big to convert: {len} exceeds the 32-bit length limit")]
    ValueTooLarge {
        /// What was being encoded (`str`, `bytes`, `array`, `extension`, ...)
        what: &'static str,
        /// The offending length
        len: u64,
    },

    /// Container nesting exceeded the configured maximum depth
    #[error("maximum recursion depth exceeded while packing (max: {max})")]
    RecursionLimitExceeded {
        /// Configured maximum depth
        max: usize,
    },

    /// A host object could not describe itself
    #[error("cannot pack '{type_name}' objects: {source}")]
    NotSerializable {
        /// Host type name
        type_name: String,
        /// Why the object's reduction failed
        #[source]
        source: anyhow::Error,
    },
}

/// Errors raised while unpacking a byte stream.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A read would cross the end of the buffer
    #[error("ran out of input: needed {needed} byte(s) at offset {offset}")]
    UnexpectedEndOfInput {
        /// Offset where the read started
        offset: usize,
        /// Bytes the read required
        needed: usize,
    },

    /// The tag byte is the invalid sentinel or is not allowed here
    #[error("invalid {context} type: '0x{tag:02x}'")]
    InvalidTypeTag {
        /// What was being decoded
        context: &'static str,
        /// The offending byte
        tag: u8,
    },

    /// An extension payload has the wrong length for its sub-type
    #[error("invalid {what} size: {size}")]
    InvalidSize {
        /// Extension kind
        what: &'static str,
        /// Declared payload length
        size: usize,
    },

    /// Unrecognized extension sub-type discriminant
    #[error("unknown extension type: '0x{tag:02x}'")]
    UnknownExtensionType {
        /// The offending discriminant
        tag: u8,
    },

    /// A class or singleton reference is not in the registry
    #[error("cannot unpack {kind} '{name}': not registered")]
    UnresolvedReference {
        /// `class` or `singleton`
        kind: &'static str,
        /// Human-readable identification of the missing key
        name: String,
    },

    /// A str payload is not valid UTF-8
    #[error("invalid utf-8 in str at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the string payload
        offset: usize,
    },

    /// A timestamp payload carried nanoseconds out of range
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] TimestampError),

    /// Container nesting exceeded the configured maximum depth
    #[error("maximum recursion depth exceeded while unpacking (max: {max})")]
    RecursionLimitExceeded {
        /// Configured maximum depth
        max: usize,
    },

    /// An instance could not be rebuilt from its reduction descriptor
    #[error("cannot reconstruct object: {0}")]
    Reconstruct(#[from] ReconstructError),
}

/// Errors raised while replaying a reduction descriptor.
#[derive(Error, Debug)]
pub enum ReconstructError {
    /// The descriptor does not have the expected shape
    #[error("malformed reduction: {0}")]
    Malformed(String),

    /// The constructor or state setter is not callable
    #[error("reduction item must be callable, not {found}")]
    NotCallable {
        /// Type name of what was found instead
        found: String,
    },

    /// The constructor raised
    #[error("constructor '{name}' failed: {source}")]
    ConstructorFailed {
        /// Constructor display name
        name: String,
        /// Callee error
        #[source]
        source: anyhow::Error,
    },

    /// Restoring state raised
    #[error("setting state failed: {source}")]
    StateFailed {
        /// Callee error
        #[source]
        source: anyhow::Error,
    },

    /// A state mapping key is not a string
    #[error("expected state key to be str, not '{found}'")]
    InvalidStateKey {
        /// Type name of the key
        found: String,
    },

    /// The object cannot receive state
    #[error("cannot set state on '{type_name}' objects")]
    NotRestorable {
        /// Host type name
        type_name: String,
    },

    /// The object cannot be extended
    #[error("cannot extend '{type_name}' objects")]
    NotExtendable {
        /// Host type name
        type_name: String,
    },

    /// The object cannot be updated
    #[error("cannot update '{type_name}' objects")]
    NotUpdatable {
        /// Host type name
        type_name: String,
    },

    /// An extend or update capability raised
    #[error("{operation} failed: {source}")]
    HostFailed {
        /// `extend` or `update`
        operation: &'static str,
        /// Callee error
        #[source]
        source: anyhow::Error,
    },
}

/// Errors raised by registry registration.
#[derive(Error, Debug)]
pub enum RegisterError {
    /// Only classes, singletons and singleton-reducing objects can be registered
    #[error("cannot register '{found}' values")]
    NotRegistrable {
        /// Type name of the rejected value
        found: String,
    },

    /// The canonical key could not be encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The object's reduction failed
    #[error("cannot register '{type_name}' objects: {source}")]
    Reduce {
        /// Host type name
        type_name: String,
        /// Callee error
        #[source]
        source: anyhow::Error,
    },
}

/// Errors raised when building a [`Timestamp`](crate::Timestamp).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Nanoseconds must be below one second
    #[error("argument 'nanoseconds' greater than maximum: {nanoseconds}")]
    NanosecondsOutOfRange {
        /// The rejected value
        nanoseconds: u32,
    },

    /// The seconds value does not fit a signed 64-bit integer
    #[error("timestamp out of range")]
    OutOfRange,
}

/// Get a human-readable type name for a value, used in error messages.
pub fn type_name(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Int(_) | Value::UInt(_) => "int".to_string(),
        Value::Float(_) => "float".to_string(),
        Value::Bytes(_) => "bytes".to_string(),
        Value::Str(_) => "str".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Map(_) => "map".to_string(),
        Value::Complex { .. } => "complex".to_string(),
        Value::ByteArray(_) => "bytearray".to_string(),
        Value::List(_) => "list".to_string(),
        Value::Set(_) => "set".to_string(),
        Value::FrozenSet(_) => "frozenset".to_string(),
        Value::Class(_) => "class".to_string(),
        Value::Singleton(s) => s.name().to_string(),
        Value::Object(o) => o.type_name().to_string(),
        Value::Timestamp(_) => "Timestamp".to_string(),
    }
}
