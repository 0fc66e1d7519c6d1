//! # Registries
//!
//! Name-to-generator lookup tables. A generator turns an untyped argument bag
//! ([`Args`]) into a typed object, checking and defaulting the keys it
//! understands on its own.
//!
//! ## Organization
//!
//! - [`Registry`]: one generic table per product type
//! - [`Registries`]: the component, transform, collider and prefab tables a
//!   game owns, built explicitly so tests can use independent sets
//! - [`transforms`] / [`colliders`]: the built-in generators
//!
//! Registering a name twice is an error; tables never silently overwrite.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ecs::{Body, Component, Transform};
use crate::foundation::value::Args;

pub mod colliders;
pub mod prefab;
pub mod transforms;

pub use prefab::{ComponentEntry, GeneratorSpec, Prefab, PrefabError, PrefabRegistry};

/// A generator rejected its arguments
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct GeneratorError(pub String);

impl GeneratorError {
    /// Error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Registry errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is taken
    #[error("{registry} '{name}' is already registered")]
    AlreadyRegistered {
        /// Registry label
        registry: &'static str,
        /// Offending name
        name: String,
    },

    /// Nothing is registered under the name
    #[error("no {registry} named '{name}'")]
    Unknown {
        /// Registry label
        registry: &'static str,
        /// Missing name
        name: String,
    },

    /// The generator failed
    #[error("{registry} '{name}' failed: {source}")]
    Generator {
        /// Registry label
        registry: &'static str,
        /// Generator name
        name: String,
        /// Generator error
        #[source]
        source: GeneratorError,
    },
}

/// Shared generator function
pub type Generator<T> = Arc<dyn Fn(&Args) -> Result<T, GeneratorError> + Send + Sync>;

/// Name-to-generator table for one product type
pub struct Registry<T> {
    label: &'static str,
    generators: BTreeMap<String, Generator<T>>,
}

impl<T> Registry<T> {
    /// Empty registry; `label` names it in errors
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            generators: BTreeMap::new(),
        }
    }

    /// Label used in errors and logs
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Register a generator under a new name
    pub fn register<F>(&mut self, name: impl Into<String>, generator: F) -> Result<(), RegistryError>
    where
        F: Fn(&Args) -> Result<T, GeneratorError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.generators.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered {
                registry: self.label,
                name,
            });
        }
        log::debug!("Registered {} '{name}'", self.label);
        self.generators.insert(name, Arc::new(generator));
        Ok(())
    }

    /// Remove a generator; returns whether it existed
    pub fn unregister(&mut self, name: &str) -> bool {
        self.generators.remove(name).is_some()
    }

    /// Look up a generator
    pub fn get(&self, name: &str) -> Option<Generator<T>> {
        self.generators.get(name).cloned()
    }

    /// Whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Run the named generator on `args`
    pub fn generate(&self, name: &str, args: &Args) -> Result<T, RegistryError> {
        let generator = self.generators.get(name).ok_or_else(|| RegistryError::Unknown {
            registry: self.label,
            name: name.to_string(),
        })?;
        generator(args).map_err(|source| RegistryError::Generator {
            registry: self.label,
            name: name.to_string(),
            source,
        })
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    /// Number of registered generators
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("label", &self.label)
            .field("names", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Component generators
pub type ComponentRegistry = Registry<Box<dyn Component>>;
/// Transform generators
pub type TransformRegistry = Registry<Transform>;
/// Collider generators
pub type ColliderRegistry = Registry<Body>;

/// Every lookup table a game needs to build entities
#[derive(Debug)]
pub struct Registries {
    /// Component generators
    pub components: ComponentRegistry,
    /// Transform generators
    pub transforms: TransformRegistry,
    /// Collider generators
    pub colliders: ColliderRegistry,
    /// Loaded prefabs
    pub prefabs: PrefabRegistry,
}

impl Default for Registries {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Registries {
    /// Empty tables
    pub fn new() -> Self {
        Self {
            components: Registry::new("component"),
            transforms: Registry::new("transform"),
            colliders: Registry::new("collider"),
            prefabs: PrefabRegistry::new(),
        }
    }

    /// Tables pre-filled with the built-in transform and collider generators
    pub fn with_builtins() -> Self {
        let mut registries = Self::new();
        transforms::register_builtins(&mut registries.transforms);
        colliders::register_builtins(&mut registries.colliders);
        registries
    }

    /// Register a component generator
    pub fn register_component<F>(&mut self, name: impl Into<String>, generator: F) -> Result<(), RegistryError>
    where
        F: Fn(&Args) -> Result<Box<dyn Component>, GeneratorError> + Send + Sync + 'static,
    {
        self.components.register(name, generator)
    }

    /// Build a transform; an empty kind yields an empty transform
    pub fn instantiate_transform(&self, spec: &GeneratorSpec) -> Result<Transform, RegistryError> {
        if spec.kind.is_empty() {
            return Ok(Transform::default());
        }
        self.transforms.generate(&spec.kind, &spec.arguments)
    }
}
