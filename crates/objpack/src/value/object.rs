//! Host objects: the reduction capability and the generic instance type

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Class, Value};
use crate::reduce::Reduction;

/// Attribute store of an object, in insertion order.
pub type Attributes = IndexMap<String, Value>;

/// What an object reports when asked how to serialize itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ReductionOutcome {
    /// The object is a named singleton and packs as a reference to it
    Singleton(String),

    /// The object packs as a full reduction descriptor
    Object(Reduction),
}

/// Upcast helper so host objects can be downcast to their concrete type.
pub trait AsAny: Any {
    /// View as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// View as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A host value the codec can pack through its reduction.
///
/// The codec never inspects host objects directly. It calls
/// [`reduce`](Reducible::reduce) when packing and probes the capability
/// methods once each when rebuilding an object. Every probe defaults to
/// `None`; the reduction interpreter documents the fallback it uses.
pub trait Reducible: AsAny + fmt::Debug + Send + Sync {
    /// Type name used in error messages.
    fn type_name(&self) -> &str;

    /// Describe how to rebuild this object.
    fn reduce(&self) -> anyhow::Result<ReductionOutcome>;

    /// Native "restore state" operation.
    fn state_restorer(&mut self) -> Option<&mut dyn RestoreState> {
        None
    }

    /// Attribute store that a mapping state merges into.
    fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        None
    }

    /// Native "extend" operation.
    fn extender(&mut self) -> Option<&mut dyn ExtendItems> {
        None
    }

    /// In-place concatenation, the fallback for extend.
    fn in_place_add(&mut self) -> Option<&mut dyn InPlaceAdd> {
        None
    }

    /// Native "update" operation.
    fn updater(&mut self) -> Option<&mut dyn UpdateItems> {
        None
    }

    /// Item assignment, the fallback for update.
    fn item_setter(&mut self) -> Option<&mut dyn SetItem> {
        None
    }
}

/// Apply a reduction's `state`.
pub trait RestoreState {
    /// Restore from `state`.
    fn restore_state(&mut self, state: Value) -> anyhow::Result<()>;
}

/// Append a reduction's `extend_items`.
pub trait ExtendItems {
    /// Append every item of `items`.
    fn extend_items(&mut self, items: Value) -> anyhow::Result<()>;
}

/// In-place concatenation (`self += items`).
pub trait InPlaceAdd {
    /// Concatenate `items` onto `self`.
    fn add_in_place(&mut self, items: Value) -> anyhow::Result<()>;
}

/// Merge a reduction's `update_items`.
pub trait UpdateItems {
    /// Merge `items` into `self`.
    fn update_items(&mut self, items: Value) -> anyhow::Result<()>;
}

/// Single item assignment (`self[key] = value`).
pub trait SetItem {
    /// Assign `value` at `key`.
    fn set_item(&mut self, key: Value, value: Value) -> anyhow::Result<()>;
}

/// A shared host object.
#[derive(Clone)]
pub struct Object(Arc<dyn Reducible>);

impl Object {
    /// Wrap a host object.
    pub fn new<T: Reducible>(object: T) -> Self {
        Object(Arc::new(object))
    }

    /// Type name reported by the object
    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    /// Ask the object for its reduction.
    pub fn reduce(&self) -> anyhow::Result<ReductionOutcome> {
        self.0.reduce()
    }

    /// Borrow the host object.
    pub fn get(&self) -> &dyn Reducible {
        self.0.as_ref()
    }

    /// Downcast to a concrete host type.
    pub fn downcast_ref<T: Reducible>(&self) -> Option<&T> {
        self.0.as_ref().as_any().downcast_ref::<T>()
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Box<dyn Reducible>> for Object {
    fn from(object: Box<dyn Reducible>) -> Self {
        Object(Arc::from(object))
    }
}

impl PartialEq for Object {
    /// Identity first, then equal reductions.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.reduce(), other.reduce()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.as_ref(), f)
    }
}

/// A generic object: a class, its constructor arguments and attributes.
///
/// Reduces to `(class, args, attributes)` and accepts mapping state by
/// merging into its attributes.
#[derive(Debug, Clone)]
pub struct Instance {
    class: Arc<Class>,
    args: Vec<Value>,
    attributes: Attributes,
}

impl Instance {
    /// Create an instance of `class` built from `args`.
    pub fn new(class: Arc<Class>, args: Vec<Value>) -> Self {
        Self {
            class,
            args,
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute (builder pattern)
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// The instance's class
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Constructor arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Get an attribute by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All attributes
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl Reducible for Instance {
    fn type_name(&self) -> &str {
        self.class.qualname()
    }

    fn reduce(&self) -> anyhow::Result<ReductionOutcome> {
        let mut reduction = Reduction::new(Value::Class(self.class.clone()), self.args.clone());
        if !self.attributes.is_empty() {
            let state = self
                .attributes
                .iter()
                .map(|(name, value)| (Value::string(name.as_str()), value.clone()))
                .collect();
            reduction = reduction.with_state(Value::map(state));
        }
        Ok(ReductionOutcome::Object(reduction))
    }

    fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        Some(&mut self.attributes)
    }
}
