//! Callable value types: classes and singletons

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::object::{Instance, Reducible};
use super::Value;
use crate::error::ReconstructError;

/// Signature of a class constructor: receives its own class and the
/// reduction arguments.
pub type ClassConstructorFn =
    dyn Fn(&Arc<Class>, &[Value]) -> anyhow::Result<Box<dyn Reducible>> + Send + Sync;

/// Shared class constructor.
pub type ClassConstructor = Arc<ClassConstructorFn>;

/// Signature of a singleton factory: a named callable building an object
/// from the reduction arguments.
pub type FactoryFn = dyn Fn(&[Value]) -> anyhow::Result<Box<dyn Reducible>> + Send + Sync;

/// Shared singleton factory.
pub type Factory = Arc<FactoryFn>;

/// Signature of a state setter: applies `state` to a freshly built object.
pub type StateSetterFn = dyn Fn(&mut dyn Reducible, Value) -> anyhow::Result<()> + Send + Sync;

/// Shared state setter.
pub type StateSetter = Arc<StateSetterFn>;

/// A class-like value identified by `(module, qualname)`.
///
/// Classes always pack as a class reference. A class with a constructor
/// can also rebuild objects during reconstruction.
#[derive(Clone)]
pub struct Class {
    module: String,
    qualname: String,
    constructor: Option<ClassConstructor>,
}

impl Class {
    /// Create a class with no constructor (reference only).
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
            constructor: None,
        }
    }

    /// Create a class whose constructor builds a generic [`Instance`].
    pub fn generic(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self::new(module, qualname).with_constructor(|class, args| {
            Ok(Box::new(Instance::new(class.clone(), args.to_vec())) as Box<dyn Reducible>)
        })
    }

    /// Attach a constructor (builder pattern).
    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&Arc<Class>, &[Value]) -> anyhow::Result<Box<dyn Reducible>> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    /// Module the class lives in
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Qualified name inside the module
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// `module.qualname`, or just `qualname` for builtins.
    pub fn display_name(&self) -> String {
        display_name(&self.module, &self.qualname)
    }

    /// Whether the class can be called during reconstruction.
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Call the constructor with `args`.
    pub fn construct(
        self: &Arc<Self>,
        args: &[Value],
    ) -> Result<Box<dyn Reducible>, ReconstructError> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| ReconstructError::NotCallable {
                found: format!("<class '{}'> without constructor", self.display_name()),
            })?;
        constructor(self, args).map_err(|source| ReconstructError::ConstructorFailed {
            name: self.display_name(),
            source,
        })
    }

    /// Same `(module, qualname)` as `other`.
    pub fn same_name(&self, other: &Class) -> bool {
        self.module == other.module && self.qualname == other.qualname
    }
}

/// `module.qualname`, dropping the module for builtins.
pub(crate) fn display_name(module: &str, qualname: &str) -> String {
    if module == "builtins" {
        qualname.to_string()
    } else {
        format!("{}.{}", module, qualname)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.display_name())
    }
}

/// A named, process-unique value.
///
/// A singleton packs as its name. It may also act as a callable in a
/// reduction: as a factory (constructor position) or as a state setter.
#[derive(Clone)]
pub struct Singleton {
    name: String,
    factory: Option<Factory>,
    state_setter: Option<StateSetter>,
}

impl Singleton {
    /// Create a plain named singleton.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factory: None,
            state_setter: None,
        }
    }

    /// The shared `NotImplemented` sentinel.
    pub fn not_implemented() -> Arc<Singleton> {
        static NOT_IMPLEMENTED: OnceLock<Arc<Singleton>> = OnceLock::new();
        NOT_IMPLEMENTED
            .get_or_init(|| Arc::new(Singleton::new("NotImplemented")))
            .clone()
    }

    /// The shared `Ellipsis` sentinel.
    pub fn ellipsis() -> Arc<Singleton> {
        static ELLIPSIS: OnceLock<Arc<Singleton>> = OnceLock::new();
        ELLIPSIS
            .get_or_init(|| Arc::new(Singleton::new("Ellipsis")))
            .clone()
    }

    /// Make the singleton callable as a constructor (builder pattern).
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Box<dyn Reducible>> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Make the singleton usable as a reduction's state setter.
    pub fn with_state_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut dyn Reducible, Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.state_setter = Some(Arc::new(setter));
        self
    }

    /// The self-reported name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the singleton can stand in constructor position.
    pub fn is_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Call the factory with `args`.
    pub fn construct(&self, args: &[Value]) -> Result<Box<dyn Reducible>, ReconstructError> {
        let factory = self
            .factory
            .as_ref()
            .ok_or_else(|| ReconstructError::NotCallable {
                found: format!("'{}'", self.name),
            })?;
        factory(args).map_err(|source| ReconstructError::ConstructorFailed {
            name: self.name.clone(),
            source,
        })
    }

    /// The state setter, if this singleton is one.
    pub fn state_setter(&self) -> Option<&StateSetter> {
        self.state_setter.as_ref()
    }
}

impl fmt::Debug for Singleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
