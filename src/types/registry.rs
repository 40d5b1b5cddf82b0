use super::base::{PatternType, TypeFactory};
use super::constraint::ConstraintArgs;
use super::error::{ConstraintError, TypeSystemError};
use super::integer::IntegerTypeFactory;
use super::string::StringTypeFactory;
use hashbrown::HashMap as FastHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure to build a type instance for a group.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeBuildError {
    #[error(transparent)]
    TypeSystem(#[from] TypeSystemError),
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}

/// Name and alias lookup of type factories.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    factories: FastHashMap<Box<str>, Arc<dyn TypeFactory>>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with `int`/`integer` and `str`/`string`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert_factory(Arc::new(IntegerTypeFactory));
        registry.insert_factory(Arc::new(StringTypeFactory));
        registry
    }

    fn insert_factory(&mut self, factory: Arc<dyn TypeFactory>) {
        for name in factory.names() {
            self.factories.insert((*name).into(), Arc::clone(&factory));
        }
    }

    /// Registers a factory under all of its names; later registrations shadow earlier ones.
    pub fn register(&mut self, factory: Arc<dyn TypeFactory>) -> Result<(), TypeSystemError> {
        if factory.names().is_empty() {
            return Err(TypeSystemError::UnnamedFactory);
        }
        tracing::event!(
            tracing::Level::DEBUG,
            operation = "register_type",
            names = ?factory.names()
        );
        self.insert_factory(factory);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Sorted list of every registered name, aliases included.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|k| k.as_ref()).collect();
        names.sort_unstable();
        names
    }

    pub fn factory(&self, name: &str) -> Result<&Arc<dyn TypeFactory>, TypeSystemError> {
        self.factories
            .get(name)
            .ok_or_else(|| TypeSystemError::UnknownType {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn create(
        &self,
        name: &str,
        args: &ConstraintArgs,
    ) -> Result<Arc<dyn PatternType>, TypeBuildError> {
        let factory = self.factory(name)?;
        Ok(factory.create(args)?)
    }
}
