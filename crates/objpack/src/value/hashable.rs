//! Hashable view of a Value, for set membership

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use super::Value;

/// A borrowed Value that implements Hash and Eq.
///
/// Hashing agrees with `Value`'s equality: integers hash by numeric value
/// across signedness, `0.0` and `-0.0` hash alike, sets hash independently
/// of order, and references hash by name. Objects all land in one bucket
/// and are told apart by equality.
#[derive(Debug, Clone, Copy)]
pub struct HashableValue<'v>(pub &'v Value);

impl Hash for HashableValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(self.0, state);
    }
}

impl PartialEq for HashableValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        // Delegate to Value's PartialEq
        self.0 == other.0
    }
}

impl Eq for HashableValue<'_> {}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Nil => state.write_u8(0),
        Value::Bool(b) => {
            state.write_u8(1);
            b.hash(state);
        }
        Value::Int(n) => {
            state.write_u8(2);
            (*n as i128).hash(state);
        }
        Value::UInt(n) => {
            state.write_u8(2);
            (*n as i128).hash(state);
        }
        Value::Float(n) => {
            state.write_u8(3);
            hash_float(*n, state);
        }
        Value::Bytes(b) => {
            state.write_u8(4);
            b.hash(state);
        }
        Value::Str(s) => {
            state.write_u8(5);
            s.hash(state);
        }
        Value::Array(items) => {
            state.write_u8(6);
            hash_ordered(items, state);
        }
        Value::Map(pairs) => {
            state.write_u8(7);
            state.write_usize(pairs.len());
            for (key, value) in pairs.iter() {
                hash_value(key, state);
                hash_value(value, state);
            }
        }
        Value::Complex { re, im } => {
            state.write_u8(8);
            hash_float(*re, state);
            hash_float(*im, state);
        }
        Value::ByteArray(b) => {
            state.write_u8(9);
            b.hash(state);
        }
        Value::List(items) => {
            state.write_u8(10);
            hash_ordered(items, state);
        }
        Value::Set(items) => {
            state.write_u8(11);
            hash_unordered(items, state);
        }
        Value::FrozenSet(items) => {
            state.write_u8(12);
            hash_unordered(items, state);
        }
        Value::Class(class) => {
            state.write_u8(13);
            class.module().hash(state);
            class.qualname().hash(state);
        }
        Value::Singleton(singleton) => {
            state.write_u8(14);
            singleton.name().hash(state);
        }
        Value::Object(_) => state.write_u8(15),
        Value::Timestamp(ts) => {
            state.write_u8(16);
            ts.hash(state);
        }
    }
}

fn hash_float<H: Hasher>(n: f64, state: &mut H) {
    // -0.0 == 0.0
    let n = if n == 0.0 { 0.0 } else { n };
    n.to_bits().hash(state);
}

fn hash_ordered<H: Hasher>(items: &[Value], state: &mut H) {
    state.write_usize(items.len());
    for item in items {
        hash_value(item, state);
    }
}

fn hash_unordered<H: Hasher>(items: &[Value], state: &mut H) {
    let combined = items
        .iter()
        .map(|item| {
            let mut hasher = DefaultHasher::new();
            hash_value(item, &mut hasher);
            hasher.finish()
        })
        .fold(0u64, u64::wrapping_add);
    state.write_usize(items.len());
    state.write_u64(combined);
}

/// Drop items equal to an earlier one, keeping first occurrences in order.
pub(crate) fn dedup(items: Vec<Value>) -> Vec<Value> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|item| seen.insert(HashableValue(item)))
            .collect()
    };
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}
