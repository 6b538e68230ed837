//! # objpack
//!
//! A MessagePack codec for rich object graphs.
//!
//! Besides the MessagePack core (nil, booleans, integers, floats, strings,
//! bytes, arrays and maps), objpack carries a set of extension types for
//! values the core format cannot express: complex numbers, mutable byte
//! buffers, lists, sets and frozen sets, timestamps, references to
//! registered classes and singletons, and arbitrary host objects described
//! by a reduction.
//!
//! ## Architecture
//!
//! - **Wire**: tag constants, minimal-width selection and the output sink
//! - **Encoder / Decoder**: recursive tree walks with a shared depth limit
//! - **Registry**: canonical keys for classes and singletons
//! - **Reduction**: descriptors that rebuild host objects on decode
//!
//! ## Example
//!
//! ```
//! use objpack::{pack, unpack, Value};
//!
//! let value = Value::list(vec![Value::Int(1), Value::string("two")]);
//! let bytes = pack(&value).unwrap();
//! let (decoded, consumed) = unpack(&bytes).unwrap();
//! assert_eq!(decoded, value);
//! assert_eq!(consumed, bytes.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod reduce;
pub mod registry;
pub mod timestamp;
pub mod value;
pub mod wire;

// Re-export main types
pub use config::CodecConfig;
pub use decode::{decode_value, unpack, unpack_with, Decoder};
pub use encode::{encode_value, pack, pack_with, Encoder};
pub use error::{
    DecodeError, EncodeError, Error, ReconstructError, RegisterError, Result, TimestampError,
};
pub use reduce::{reconstruct, Reduction};
pub use registry::Registry;
pub use timestamp::Timestamp;
pub use value::{
    Attributes, Class, ExtendItems, HashableValue, InPlaceAdd, Instance, Object, Reducible,
    ReductionOutcome, RestoreState, SetItem, Singleton, UpdateItems, Value,
};

/// objpack version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Register a class or singleton in the process-wide registry.
pub fn register(value: &Value) -> std::result::Result<(), RegisterError> {
    Registry::global().register(value)
}
