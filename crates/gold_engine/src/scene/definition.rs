//! Scene definitions
//!
//! The decoded form of a scene document: a scene name plus ordered entity
//! records. Records may name a parent that appears later in the list.
//!
//! ```json
//! {
//!   "Name": "main",
//!   "Entities": [
//!     { "Name": "ball", "Prefab": "ball", "Position": { "X": 50, "Y": 37.5 } },
//!     { "Name": "score", "Parent": "ball", "Prefab": "label", "ZIndex": 10 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::foundation::math::{deserialize_vector, zero_vector, Vec2};
use crate::foundation::value::Args;

/// One entity placement in a scene document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityRecord {
    /// Entity name, unique within the scene
    #[serde(default)]
    pub name: String,
    /// Parent entity name; empty or unknown means the root
    #[serde(default)]
    pub parent: String,
    /// Prefab to instantiate
    #[serde(default)]
    pub prefab: String,
    /// Overrides layered over a copy of the prefab's transform arguments
    #[serde(default)]
    pub transform_arguments: Args,
    /// Initial position in game units
    #[serde(default = "zero_vector", deserialize_with = "deserialize_vector")]
    pub position: Vec2,
    /// Initial scale; the zero vector keeps the prefab's scale
    #[serde(default = "zero_vector", deserialize_with = "deserialize_vector")]
    pub scale: Vec2,
    /// Initial rotation in degrees
    #[serde(default)]
    pub rotation: f32,
    /// Draw-order key
    #[serde(default)]
    pub z_index: i32,
}

impl EntityRecord {
    /// Record for `name` built from `prefab`
    pub fn new(name: impl Into<String>, prefab: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefab: prefab.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: set the parent name
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    /// Builder pattern: set the position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: set the scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }
}

/// A decoded scene document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SceneDefinition {
    /// Scene name; must not be empty
    #[serde(default)]
    pub name: String,
    /// Entity records in document order
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl SceneDefinition {
    /// Definition with a name and no entities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    /// Builder pattern: append a record
    pub fn with_entity(mut self, record: EntityRecord) -> Self {
        self.entities.push(record);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataFormat;

    #[test]
    fn test_missing_fields_default() {
        let definition: SceneDefinition = DataFormat::Json
            .decode(r#"{"Name": "s", "Entities": [{"Name": "e1", "Prefab": "P", "Position": {"X": 1, "Y": 1}}]}"#)
            .unwrap();
        let record = &definition.entities[0];
        assert_eq!(record.position, Vec2::new(1.0, 1.0));
        assert_eq!(record.scale, Vec2::zeros());
        assert!(record.parent.is_empty());
        assert_eq!(record.z_index, 0);
    }

    #[test]
    fn test_decodes_ron() {
        let definition: SceneDefinition = DataFormat::Ron
            .decode(r#"(Name: "s", Entities: [(Name: "e", Prefab: "P", Scale: [2, 2], ZIndex: 3)])"#)
            .unwrap();
        assert_eq!(definition.entities[0].scale, Vec2::new(2.0, 2.0));
        assert_eq!(definition.entities[0].z_index, 3);
    }
}
