//! Prefabs
//!
//! A prefab is a named, immutable entity template decoded from a JSON or RON
//! document:
//!
//! ```json
//! {
//!   "Name": "ball",
//!   "Components": [{ "Name": "ball", "Arguments": { "Speed": 40 } }],
//!   "Transformer": { "Kind": "CircleShape", "Arguments": { "Radius": 1 } },
//!   "Collider": { "Kind": "CircleShape", "Arguments": { "Radius": 1 } }
//! }
//! ```
//!
//! Lookups hand out copies, so overriding arguments for one instance never
//! touches the stored template.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{DataFormat, DecodeError};
use crate::foundation::value::Args;

/// One component of a prefab
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComponentEntry {
    /// Component generator name
    #[serde(alias = "Kind")]
    pub name: String,
    /// Generator arguments
    #[serde(default)]
    pub arguments: Args,
}

/// Generator kind plus arguments (transforms and colliders)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeneratorSpec {
    /// Generator name; empty means "none"
    #[serde(default)]
    pub kind: String,
    /// Generator arguments
    #[serde(default)]
    pub arguments: Args,
}

impl GeneratorSpec {
    /// Generator `kind` with no arguments
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            arguments: Args::new(),
        }
    }

    /// Copy with `overrides` layered over the arguments
    pub fn overridden(&self, overrides: &Args) -> Self {
        let mut copy = self.clone();
        for (key, value) in overrides {
            copy.arguments.insert(key.clone(), value.clone());
        }
        copy
    }
}

/// Named entity template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Prefab {
    /// Registry key
    #[serde(default)]
    pub name: String,
    /// Components in attach order
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
    /// Transform generator
    #[serde(default, rename = "Transformer", alias = "Transform")]
    pub transform: GeneratorSpec,
    /// Collider generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collider: Option<GeneratorSpec>,
}

impl Prefab {
    /// Prefab with a name and nothing else
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: append a component
    pub fn with_component(mut self, name: impl Into<String>, arguments: Args) -> Self {
        self.components.push(ComponentEntry {
            name: name.into(),
            arguments,
        });
        self
    }

    /// Builder pattern: set the transform
    pub fn with_transform(mut self, transform: GeneratorSpec) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: set the collider
    pub fn with_collider(mut self, collider: GeneratorSpec) -> Self {
        self.collider = Some(collider);
        self
    }
}

/// Prefab loading errors
#[derive(thiserror::Error, Debug)]
pub enum PrefabError {
    /// The file could not be read
    #[error("cannot read prefab {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// The document is malformed
    #[error("cannot decode prefab: {0}")]
    Decode(#[from] DecodeError),

    /// The document has no `Name`
    #[error("prefab has no name")]
    MissingName,

    /// A prefab with this name exists
    #[error("prefab '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Prefabs by name
#[derive(Debug, Default)]
pub struct PrefabRegistry {
    prefabs: BTreeMap<String, Prefab>,
}

impl PrefabRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a prefab under its name
    pub fn register(&mut self, prefab: Prefab) -> Result<(), PrefabError> {
        if prefab.name.is_empty() {
            return Err(PrefabError::MissingName);
        }
        if self.prefabs.contains_key(&prefab.name) {
            return Err(PrefabError::AlreadyRegistered(prefab.name));
        }
        log::debug!("Registered prefab '{}'", prefab.name);
        self.prefabs.insert(prefab.name.clone(), prefab);
        Ok(())
    }

    /// Decode and store a prefab document; returns the prefab name
    pub fn register_from_str(&mut self, text: &str, format: DataFormat) -> Result<String, PrefabError> {
        let prefab: Prefab = format.decode(text)?;
        let name = prefab.name.clone();
        self.register(prefab)?;
        Ok(name)
    }

    /// Read, decode and store a prefab file; the format follows the extension
    pub fn register_from_file(&mut self, path: impl AsRef<Path>) -> Result<String, PrefabError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PrefabError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.register_from_str(&text, DataFormat::from_path(path))
    }

    /// Copy of the named prefab
    pub fn get(&self, name: &str) -> Option<Prefab> {
        self.prefabs.get(name).cloned()
    }

    /// Whether a prefab is registered
    pub fn contains(&self, name: &str) -> bool {
        self.prefabs.contains_key(name)
    }

    /// Remove a prefab; returns it if it existed
    pub fn unregister(&mut self, name: &str) -> Option<Prefab> {
        self.prefabs.remove(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prefabs.keys().map(String::as_str)
    }

    /// Number of prefabs
    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    /// Whether no prefab is registered
    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}
