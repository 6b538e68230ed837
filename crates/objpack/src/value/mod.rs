//! Value representation for packed and unpacked data

mod callable;
mod display;
mod hashable;
mod impls;
mod object;

pub use callable::{
    ClassConstructor, ClassConstructorFn, Factory, FactoryFn, StateSetter, StateSetterFn,
};
pub use callable::{Class, Singleton};
pub(crate) use callable::display_name;
pub(crate) use hashable::dedup;
pub use hashable::HashableValue;
pub use object::{
    AsAny, Attributes, ExtendItems, InPlaceAdd, Instance, Object, Reducible, ReductionOutcome,
    RestoreState, SetItem, UpdateItems,
};

use std::sync::Arc;

use crate::timestamp::Timestamp;

/// The universal value the codec operates on.
///
/// Values are organized into two tiers:
/// - Tier 1: the MessagePack core (nil, booleans, numbers, strings, bytes,
///   arrays and maps)
/// - Tier 2: extension values carried behind an ext/fixext header
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: MessagePack Core
    // ═══════════════════════════════════════════════════════════════════
    /// `nil`
    Nil,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// Signed 64-bit integer (default integer type)
    Int(i64),

    /// Unsigned 64-bit integer, for magnitudes above `i64::MAX`
    UInt(u64),

    /// 64-bit floating point
    Float(f64),

    /// Immutable byte string
    Bytes(Arc<Vec<u8>>),

    /// UTF-8 string
    Str(Arc<String>),

    /// Fixed-size heterogeneous sequence (a host tuple)
    Array(Arc<Vec<Value>>),

    /// Key/value pairs in host order
    Map(Arc<Vec<(Value, Value)>>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Extensions
    // ═══════════════════════════════════════════════════════════════════
    /// Complex number
    Complex {
        /// Real part
        re: f64,
        /// Imaginary part
        im: f64,
    },

    /// Mutable byte buffer
    ByteArray(Arc<Vec<u8>>),

    /// Ordered, mutable sequence
    List(Arc<Vec<Value>>),

    /// Unordered collection without duplicates
    Set(Arc<Vec<Value>>),

    /// Immutable unordered collection without duplicates
    FrozenSet(Arc<Vec<Value>>),

    /// Class reference, resolved through the registry on decode
    Class(Arc<Class>),

    /// Singleton reference, resolved through the registry on decode
    Singleton(Arc<Singleton>),

    /// Host object described by a reduction
    Object(Object),

    /// Seconds plus nanoseconds since the epoch
    Timestamp(Timestamp),
}
