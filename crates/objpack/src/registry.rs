//! Registry of classes and singletons that decode by reference
//!
//! Classes and singletons are never serialized by value. The encoder writes
//! a canonical key (the class's module and qualified name, or the
//! singleton's name, as MessagePack strings) and the decoder looks that key
//! up here to get back the very same value.

use std::fmt;
use std::sync::OnceLock;

use dashmap::DashMap;
use tracing::debug;

use crate::encode::{class_key, singleton_key};
use crate::error::{type_name, RegisterError};
use crate::value::{ReductionOutcome, Value};

/// Maps canonical keys to registered values.
///
/// Registration is last-write-wins and entries are never removed. Lookups
/// never insert.
pub struct Registry {
    entries: DashMap<Vec<u8>, Value>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding the `NotImplemented` and `Ellipsis`
    /// sentinels.
    pub fn new() -> Self {
        let registry = Self::empty();
        for sentinel in [Value::not_implemented(), Value::ellipsis()] {
            if let Err(err) = registry.register(&sentinel) {
                debug!(error = %err, "failed to register sentinel");
            }
        }
        registry
    }

    /// Create a registry with no entries at all.
    pub fn empty() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide registry used by [`unpack`](crate::unpack) and
    /// [`register`](crate::register).
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register a class, a singleton, or an object that reduces to a
    /// singleton name.
    pub fn register(&self, value: &Value) -> Result<(), RegisterError> {
        let (kind, key) = match value {
            Value::Class(class) => ("class", class_key(class.module(), class.qualname())?),
            Value::Singleton(singleton) => ("singleton", singleton_key(singleton.name())?),
            Value::Object(object) => {
                let outcome = object.reduce().map_err(|source| RegisterError::Reduce {
                    type_name: object.type_name().to_string(),
                    source,
                })?;
                match outcome {
                    ReductionOutcome::Singleton(name) => ("singleton", singleton_key(&name)?),
                    ReductionOutcome::Object(_) => {
                        return Err(RegisterError::NotRegistrable {
                            found: object.type_name().to_string(),
                        })
                    }
                }
            }
            other => {
                return Err(RegisterError::NotRegistrable {
                    found: type_name(other),
                })
            }
        };

        debug!(kind, value = ?value, "registering");
        self.entries.insert(key, value.clone());
        Ok(())
    }

    /// Register several values in order, stopping at the first failure.
    pub fn register_all<'v>(
        &self,
        values: impl IntoIterator<Item = &'v Value>,
    ) -> Result<(), RegisterError> {
        values.into_iter().try_for_each(|value| self.register(value))
    }

    /// Look up a canonical key.
    pub fn resolve(&self, key: &[u8]) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
