//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Arc::new(s.into()))
    }

    /// Create a byte string value
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Arc::new(b.into()))
    }

    /// Create a mutable byte buffer value
    pub fn byte_array(b: impl Into<Vec<u8>>) -> Self {
        Value::ByteArray(Arc::new(b.into()))
    }

    /// Create an array (tuple) value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    /// Create a map value from pairs in order
    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Value::Map(Arc::new(pairs))
    }

    /// Create a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    /// Create a set value, dropping duplicates
    pub fn set(items: Vec<Value>) -> Self {
        Value::Set(Arc::new(dedup(items)))
    }

    /// Create a frozen set value, dropping duplicates
    pub fn frozen_set(items: Vec<Value>) -> Self {
        Value::FrozenSet(Arc::new(dedup(items)))
    }

    /// Create a complex value
    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex { re, im }
    }

    /// Create a class reference value
    pub fn class(class: Class) -> Self {
        Value::Class(Arc::new(class))
    }

    /// Create a singleton reference value
    pub fn singleton(singleton: Singleton) -> Self {
        Value::Singleton(Arc::new(singleton))
    }

    /// Wrap a host object
    pub fn object<T: Reducible>(object: T) -> Self {
        Value::Object(Object::new(object))
    }

    /// The `NotImplemented` sentinel
    pub fn not_implemented() -> Self {
        Value::Singleton(Singleton::not_implemented())
    }

    /// The `Ellipsis` sentinel
    pub fn ellipsis() -> Self {
        Value::Singleton(Singleton::ellipsis())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════
    /// Check if value is nil
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Check if value is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Int(_) | Value::UInt(_))
    }

    /// Check if value is carried behind an extension header
    pub fn is_extension(&self) -> bool {
        !matches!(
            self,
            Value::Nil
                | Value::Bool(_)
                | Value::Int(_)
                | Value::UInt(_)
                | Value::Float(_)
                | Value::Bytes(_)
                | Value::Str(_)
                | Value::Array(_)
                | Value::Map(_)
        )
    }

    /// Check if value can stand in a reduction's constructor position
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Class(c) => c.is_constructible(),
            Value::Singleton(s) => s.is_factory(),
            _ => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════
    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as i64 (unsigned values that fit)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Extract as u64 (non-negative signed values)
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(n) => u64::try_from(*n).ok(),
            Value::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract bytes or byte array contents
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::ByteArray(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Extract the items of an array, list, set or frozen set
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) | Value::List(v) | Value::Set(v) | Value::FrozenSet(v) => {
                Some(v.as_slice())
            }
            _ => None,
        }
    }

    /// Extract map pairs
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(m) => Some(m.as_slice()),
            _ => None,
        }
    }

    /// Extract the host object
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Extract the timestamp
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

/// Unordered comparison; both sides are assumed duplicate-free.
fn set_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,

            // Integers compare by numeric value across signedness
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Int(a), Value::UInt(b)) | (Value::UInt(b), Value::Int(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            }

            (Value::Float(a), Value::Float(b)) => a == b,

            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,

            (Value::Complex { re: ar, im: ai }, Value::Complex { re: br, im: bi }) => {
                ar == br && ai == bi
            }
            (Value::ByteArray(a), Value::ByteArray(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => set_eq(a, b),
            (Value::FrozenSet(a), Value::FrozenSet(b)) => set_eq(a, b),

            // Registered values: identity, then canonical name
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b) || a.same_name(b),
            (Value::Singleton(a), Value::Singleton(b)) => {
                Arc::ptr_eq(a, b) || a.name() == b.name()
            }
            (Value::Object(a), Value::Object(b)) => a == b,

            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,

            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::UInt(n),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}
