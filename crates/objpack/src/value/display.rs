//! Debug implementation for Value

use std::fmt;

use super::*;

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:?}", item)?;
    }
    Ok(())
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),

            Value::Bytes(b) => write!(f, "b{:?}", b.as_ref()),
            Value::Str(s) => write!(f, "{:?}", s.as_ref()),

            Value::Array(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?; // Single-element tuple needs trailing comma
                }
                write!(f, ")")
            }

            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {:?}", k, v)?;
                }
                write!(f, "}}")
            }

            Value::Complex { re, im } => write!(f, "({:?}{:+?}j)", re, im),
            Value::ByteArray(b) => write!(f, "bytearray({:?})", b.as_ref()),

            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }

            Value::Set(items) => {
                write!(f, "{{")?;
                write_items(f, items)?;
                write!(f, "}}")
            }

            Value::FrozenSet(items) => {
                write!(f, "frozenset({{")?;
                write_items(f, items)?;
                write!(f, "}})")
            }

            Value::Class(c) => write!(f, "{:?}", c),
            Value::Singleton(s) => write!(f, "{:?}", s),
            Value::Object(o) => write!(f, "{:?}", o),
            Value::Timestamp(t) => write!(f, "{}", t),
        }
    }
}
