//! Reduction descriptors and the interpreter that replays them
//!
//! A reduction describes how to rebuild an object: call `constructor` with
//! `args`, then optionally restore `state`, append `extend_items` and merge
//! `update_items`. On the wire it is an array of two to six elements.

use tracing::debug;

use crate::error::{type_name, ReconstructError};
use crate::value::{Object, Reducible, Value};

/// How to rebuild an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// A constructible class or a factory singleton
    pub constructor: Value,
    /// Constructor arguments
    pub args: Vec<Value>,
    /// State restored after construction
    pub state: Option<Value>,
    /// Items appended after state is restored
    pub extend_items: Option<Value>,
    /// Key/value pairs merged last
    pub update_items: Option<Value>,
    /// Singleton used to apply `state` instead of the object itself
    pub state_setter: Option<Value>,
}

impl Reduction {
    /// Create a reduction with only a constructor and its arguments.
    pub fn new(constructor: Value, args: Vec<Value>) -> Self {
        Self {
            constructor,
            args,
            state: None,
            extend_items: None,
            update_items: None,
            state_setter: None,
        }
    }

    /// Set the state (builder pattern)
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Set the items to extend with (builder pattern)
    pub fn with_extend_items(mut self, items: Value) -> Self {
        self.extend_items = Some(items);
        self
    }

    /// Set the items to update with (builder pattern)
    pub fn with_update_items(mut self, items: Value) -> Self {
        self.update_items = Some(items);
        self
    }

    /// Set the state setter (builder pattern)
    pub fn with_state_setter(mut self, setter: Value) -> Self {
        self.state_setter = Some(setter);
        self
    }

    /// Wire form: trailing absent fields are dropped, inner ones become nil.
    pub fn to_value(&self) -> Value {
        let optional = [
            self.state.as_ref(),
            self.extend_items.as_ref(),
            self.update_items.as_ref(),
            self.state_setter.as_ref(),
        ];
        let present = optional
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);

        let mut items = Vec::with_capacity(2 + present);
        items.push(self.constructor.clone());
        items.push(Value::array(self.args.clone()));
        items.extend(
            optional[..present]
                .iter()
                .map(|&field| field.cloned().unwrap_or(Value::Nil)),
        );
        Value::array(items)
    }

    /// Parse the wire form; nil fields are absent.
    pub fn from_value(value: &Value) -> Result<Self, ReconstructError> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(ReconstructError::Malformed(format!(
                    "expected a reduction array, not '{}'",
                    type_name(other)
                )))
            }
        };
        if !(2..=6).contains(&items.len()) {
            return Err(ReconstructError::Malformed(format!(
                "expected 2 to 6 reduction items, got {}",
                items.len()
            )));
        }
        let args = match &items[1] {
            Value::Array(args) => args.as_ref().clone(),
            other => {
                return Err(ReconstructError::Malformed(format!(
                    "reduction arguments must be an array, not '{}'",
                    type_name(other)
                )))
            }
        };
        let field = |i: usize| items.get(i).filter(|v| !v.is_nil()).cloned();

        Ok(Self {
            constructor: items[0].clone(),
            args,
            state: field(2),
            extend_items: field(3),
            update_items: field(4),
            state_setter: field(5),
        })
    }
}

/// Rebuild an object by replaying `reduction`.
///
/// The partially built object is dropped on any failure.
pub fn reconstruct(reduction: Reduction) -> Result<Object, ReconstructError> {
    replay(reduction)
        .map(Object::from)
        .inspect_err(|err| debug!(error = %err, "reconstruction failed"))
}

fn replay(reduction: Reduction) -> Result<Box<dyn Reducible>, ReconstructError> {
    let Reduction {
        constructor,
        args,
        state,
        extend_items,
        update_items,
        state_setter,
    } = reduction;

    let mut object = match &constructor {
        Value::Class(class) => class.construct(&args)?,
        Value::Singleton(singleton) => singleton.construct(&args)?,
        other => {
            return Err(ReconstructError::NotCallable {
                found: type_name(other),
            })
        }
    };

    if let Some(state) = state {
        set_state(object.as_mut(), state, state_setter)?;
    }
    if let Some(items) = extend_items {
        extend(object.as_mut(), items)?;
    }
    if let Some(items) = update_items {
        update(object.as_mut(), items)?;
    }
    Ok(object)
}

fn set_state(
    object: &mut dyn Reducible,
    state: Value,
    setter: Option<Value>,
) -> Result<(), ReconstructError> {
    match setter {
        Some(Value::Singleton(singleton)) => {
            let setter =
                singleton
                    .state_setter()
                    .ok_or_else(|| ReconstructError::NotCallable {
                        found: format!("'{}'", singleton.name()),
                    })?;
            return setter(object, state)
                .map_err(|source| ReconstructError::StateFailed { source });
        }
        Some(other) => {
            return Err(ReconstructError::NotCallable {
                found: type_name(&other),
            })
        }
        None => {}
    }

    let object_type = object.type_name().to_string();
    if let Some(restorer) = object.state_restorer() {
        return restorer
            .restore_state(state)
            .map_err(|source| ReconstructError::StateFailed { source });
    }

    let Value::Map(pairs) = state else {
        return Err(ReconstructError::NotRestorable {
            type_name: object_type,
        });
    };
    let attributes = object
        .attributes_mut()
        .ok_or(ReconstructError::NotRestorable {
            type_name: object_type,
        })?;
    for (key, value) in pairs.iter() {
        let Value::Str(name) = key else {
            return Err(ReconstructError::InvalidStateKey {
                found: type_name(key),
            });
        };
        attributes.insert(name.as_str().to_string(), value.clone());
    }
    Ok(())
}

fn extend(object: &mut dyn Reducible, items: Value) -> Result<(), ReconstructError> {
    let host_failed = |source| ReconstructError::HostFailed {
        operation: "extend",
        source,
    };
    let object_type = object.type_name().to_string();

    if let Some(extender) = object.extender() {
        return extender.extend_items(items).map_err(host_failed);
    }
    match object.in_place_add() {
        Some(target) => target.add_in_place(items).map_err(host_failed),
        None => Err(ReconstructError::NotExtendable {
            type_name: object_type,
        }),
    }
}

fn update(object: &mut dyn Reducible, items: Value) -> Result<(), ReconstructError> {
    let host_failed = |source| ReconstructError::HostFailed {
        operation: "update",
        source,
    };
    let object_type = object.type_name().to_string();

    if let Some(updater) = object.updater() {
        return updater.update_items(items).map_err(host_failed);
    }
    let setter = object
        .item_setter()
        .ok_or(ReconstructError::NotUpdatable {
            type_name: object_type,
        })?;
    for (key, value) in update_pairs(&items)? {
        setter.set_item(key, value).map_err(host_failed)?;
    }
    Ok(())
}

/// Pairs from a map, or from a sequence of two-element sequences.
fn update_pairs(items: &Value) -> Result<Vec<(Value, Value)>, ReconstructError> {
    match items {
        Value::Map(pairs) => Ok(pairs.as_ref().clone()),
        Value::Array(seq) | Value::List(seq) => seq
            .iter()
            .map(|item| match item {
                Value::Array(pair) | Value::List(pair) if pair.len() == 2 => {
                    Ok((pair[0].clone(), pair[1].clone()))
                }
                other => Err(ReconstructError::Malformed(format!(
                    "update item must be a sequence of len 2, not '{}'",
                    type_name(other)
                ))),
            })
            .collect(),
        other => Err(ReconstructError::Malformed(format!(
            "update items must be a map or a sequence of pairs, not '{}'",
            type_name(other)
        ))),
    }
}
