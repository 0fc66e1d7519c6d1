//! Scene assembly
//!
//! Turns a scene document into a live [`Scene`]:
//!
//! 1. expand the template ([`TemplateContext`])
//! 2. decode the result into a [`SceneDefinition`]
//! 3. validate names and prefab references
//! 4. instantiate every record from a copy of its prefab
//! 5. link parents (a second pass, so parents may appear after their children)
//! 6. apply position, scale, rotation and z-index
//!
//! Any failure aborts the whole load and no scene is produced.

use std::collections::HashSet;

use super::definition::{EntityRecord, SceneDefinition};
use super::scene_graph::{NodeKey, Scene, ROOT_NAME};
use super::template::TemplateContext;
use crate::config::{DataFormat, DecodeError};
use crate::ecs::Entity;
use crate::foundation::math::Vec2;
use crate::registry::{Registries, RegistryError};

/// Scene loading errors
#[derive(thiserror::Error, Debug)]
pub enum AssemblyError {
    /// Template expansion failed
    #[error("cannot expand scene template '{name}': {source}")]
    Template {
        /// Template name
        name: String,
        /// Template error
        #[source]
        source: minijinja::Error,
    },

    /// The expanded document is malformed
    #[error("cannot decode scene: {0}")]
    Decode(#[from] DecodeError),

    /// The definition has no name
    #[error("scene has no name")]
    MissingSceneName,

    /// A record has no name
    #[error("entity record {index} has no name")]
    EmptyEntityName {
        /// Record position in the definition
        index: usize,
    },

    /// A record uses the root's name
    #[error("entity record {index} uses the reserved name 'ROOT'")]
    ReservedName {
        /// Record position in the definition
        index: usize,
    },

    /// Two records share a name
    #[error("entity name '{0}' appears more than once")]
    DuplicateEntityName(String),

    /// A record names no prefab
    #[error("entity '{entity}' has no prefab")]
    MissingPrefab {
        /// Entity name
        entity: String,
    },

    /// A record names a prefab that is not registered
    #[error("entity '{entity}' uses unknown prefab '{prefab}'")]
    UnknownPrefab {
        /// Entity name
        entity: String,
        /// Prefab name
        prefab: String,
    },

    /// Parent names form a loop
    #[error("entity '{entity}' is its own ancestor")]
    ParentCycle {
        /// Entity name
        entity: String,
    },

    /// A component, transform or collider generator failed
    #[error("cannot instantiate entity '{entity}': {source}")]
    Instantiate {
        /// Entity name
        entity: String,
        /// Registry error
        #[source]
        source: RegistryError,
    },
}

/// Builds scenes from documents using a set of registries
#[derive(Debug, Clone, Copy)]
pub struct SceneAssembler<'a> {
    registries: &'a Registries,
}

impl<'a> SceneAssembler<'a> {
    /// Assembler resolving prefabs and generators through `registries`
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    /// Expand a scene template
    pub fn expand(&self, name: &str, source: &str, context: &TemplateContext) -> Result<String, AssemblyError> {
        context.render(name, source).map_err(|source| AssemblyError::Template {
            name: name.to_string(),
            source,
        })
    }

    /// Decode an expanded document
    pub fn decode(&self, text: &str, format: DataFormat) -> Result<SceneDefinition, AssemblyError> {
        Ok(format.decode(text)?)
    }

    /// Expand and decode a scene template
    pub fn parse(
        &self,
        name: &str,
        source: &str,
        format: DataFormat,
        context: &TemplateContext,
    ) -> Result<SceneDefinition, AssemblyError> {
        let text = self.expand(name, source, context)?;
        self.decode(&text, format)
    }

    /// Expand, decode and assemble a scene template
    pub fn load(
        &self,
        name: &str,
        source: &str,
        format: DataFormat,
        context: &TemplateContext,
    ) -> Result<Scene, AssemblyError> {
        let definition = self.parse(name, source, format, context)?;
        self.assemble(&definition)
    }

    /// Build a scene from a definition
    pub fn assemble(&self, definition: &SceneDefinition) -> Result<Scene, AssemblyError> {
        validate(definition)?;

        let entities = definition
            .entities
            .iter()
            .map(|record| self.instantiate(record))
            .collect::<Result<Vec<_>, _>>()?;

        let mut scene = Scene::new(definition.name.clone());
        let keys: Vec<NodeKey> = entities.into_iter().map(|entity| scene.insert_node(entity)).collect();

        for (record, &key) in definition.entities.iter().zip(&keys) {
            let parent = match record.parent.as_str() {
                "" => scene.root_key(),
                name => scene.key_of(name).unwrap_or_else(|| {
                    log::debug!("Entity '{}' names unknown parent '{name}', using the root", record.name);
                    scene.root_key()
                }),
            };
            if scene.is_ancestor(key, parent) {
                return Err(AssemblyError::ParentCycle {
                    entity: record.name.clone(),
                });
            }
            scene.link(key, parent);
        }

        for (record, &key) in definition.entities.iter().zip(&keys) {
            place(&mut scene, key, record);
        }

        log::debug!(
            "Assembled scene '{}' with {} entities",
            scene.name(),
            scene.len()
        );
        Ok(scene)
    }

    fn instantiate(&self, record: &EntityRecord) -> Result<Entity, AssemblyError> {
        let mut prefab = self
            .registries
            .prefabs
            .get(&record.prefab)
            .ok_or_else(|| AssemblyError::UnknownPrefab {
                entity: record.name.clone(),
                prefab: record.prefab.clone(),
            })?;
        prefab.transform = prefab.transform.overridden(&record.transform_arguments);

        let mut entity = Entity::from_prefab(&prefab, self.registries).map_err(|source| {
            AssemblyError::Instantiate {
                entity: record.name.clone(),
                source,
            }
        })?;
        entity.set_name(record.name.clone());
        Ok(entity)
    }
}

fn validate(definition: &SceneDefinition) -> Result<(), AssemblyError> {
    if definition.name.is_empty() {
        return Err(AssemblyError::MissingSceneName);
    }
    let mut seen = HashSet::new();
    for (index, record) in definition.entities.iter().enumerate() {
        if record.name.is_empty() {
            return Err(AssemblyError::EmptyEntityName { index });
        }
        if record.name == ROOT_NAME {
            return Err(AssemblyError::ReservedName { index });
        }
        if !seen.insert(record.name.as_str()) {
            return Err(AssemblyError::DuplicateEntityName(record.name.clone()));
        }
        if record.prefab.is_empty() {
            return Err(AssemblyError::MissingPrefab {
                entity: record.name.clone(),
            });
        }
    }
    Ok(())
}

fn place(scene: &mut Scene, key: NodeKey, record: &EntityRecord) {
    scene.set_node_z_index(key, record.z_index);
    let Some(entity) = scene.node_entity_mut(key) else {
        return;
    };
    let transform = entity.transform_mut();
    transform.set_position(record.position);
    if record.scale != Vec2::zeros() {
        transform.set_scale(record.scale);
    }
    transform.set_rotation(record.rotation);
    if let Some(body) = entity.core_mut().body.as_mut() {
        body.position = record.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, NoopComponent};
    use crate::foundation::math::Viewport;
    use crate::foundation::value::{Args, Value};
    use crate::registry::{GeneratorError, GeneratorSpec, Prefab};

    fn registries() -> Registries {
        let mut registries = Registries::with_builtins();
        registries
            .register_component("noop", |_: &Args| -> Result<Box<dyn Component>, GeneratorError> {
                Ok(Box::new(NoopComponent::default()))
            })
            .unwrap();
        registries.prefabs.register(Prefab::new("P").with_component("noop", Args::new())).unwrap();
        registries
    }

    #[test]
    fn test_assembles_single_entity_under_root() {
        let registries = registries();
        let definition = SceneDefinition::new("S")
            .with_entity(EntityRecord::new("e1", "P").with_position(Vec2::new(1.0, 1.0)));
        let scene = SceneAssembler::new(&registries).assemble(&definition).unwrap();

        assert_eq!(scene.name(), "S");
        assert_eq!(scene.len(), 1);
        let entity = scene.entity_by_name("e1").unwrap();
        assert_eq!(entity.core().parent(), Some(scene.root_id()));
        assert_eq!(entity.transform().position, Vec2::new(1.0, 1.0));
        assert_eq!(entity.component_count(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let registries = registries();
        let assembler = SceneAssembler::new(&registries);

        let unnamed = SceneDefinition::new("").with_entity(EntityRecord::new("e", "P"));
        assert!(matches!(assembler.assemble(&unnamed), Err(AssemblyError::MissingSceneName)));

        let empty = SceneDefinition::new("S").with_entity(EntityRecord::new("", "P"));
        assert!(matches!(
            assembler.assemble(&empty),
            Err(AssemblyError::EmptyEntityName { index: 0 })
        ));

        let no_prefab = SceneDefinition::new("S").with_entity(EntityRecord::new("e", ""));
        assert!(matches!(assembler.assemble(&no_prefab), Err(AssemblyError::MissingPrefab { .. })));

        let unknown = SceneDefinition::new("S").with_entity(EntityRecord::new("e", "Q"));
        assert!(matches!(
            assembler.assemble(&unknown),
            Err(AssemblyError::UnknownPrefab { prefab, .. }) if prefab == "Q"
        ));
    }

    #[test]
    fn test_unknown_component_fails_instantiation() {
        let mut registries = registries();
        registries
            .prefabs
            .register(Prefab::new("broken").with_component("missing", Args::new()))
            .unwrap();
        let definition = SceneDefinition::new("S").with_entity(EntityRecord::new("e", "broken"));
        let err = SceneAssembler::new(&registries).assemble(&definition).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::Instantiate {
                source: RegistryError::Unknown { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_transform_overrides_apply_to_a_copy() {
        let mut registries = registries();
        let mut args = Args::new();
        args.insert("Radius".into(), Value::Number(1.0));
        registries
            .prefabs
            .register(Prefab::new("ball").with_transform(GeneratorSpec {
                kind: "CircleShape".into(),
                arguments: args,
            }))
            .unwrap();

        let mut record = EntityRecord::new("big", "ball");
        record.transform_arguments.insert("Radius".into(), Value::Number(4.0));
        let definition = SceneDefinition::new("S")
            .with_entity(record)
            .with_entity(EntityRecord::new("small", "ball"));
        let scene = SceneAssembler::new(&registries).assemble(&definition).unwrap();

        let radius = |name: &str| match scene.entity_by_name(name).unwrap().transform().visual {
            crate::ecs::Visual::Circle { radius, .. } => radius,
            _ => panic!("expected a circle"),
        };
        assert_eq!(radius("big"), 4.0);
        assert_eq!(radius("small"), 1.0);
        assert_eq!(
            registries.prefabs.get("ball").unwrap().transform.arguments["Radius"],
            Value::Number(1.0)
        );
    }

    #[test]
    fn test_parent_cycle_is_rejected() {
        let registries = registries();
        let definition = SceneDefinition::new("S")
            .with_entity(EntityRecord::new("a", "P").with_parent("b"))
            .with_entity(EntityRecord::new("b", "P").with_parent("a"));
        assert!(matches!(
            SceneAssembler::new(&registries).assemble(&definition),
            Err(AssemblyError::ParentCycle { .. })
        ));
    }

    #[test]
    fn test_load_expands_and_decodes() {
        let registries = registries();
        let source = r#"{
            "Name": "S",
            "Entities": [
                { "Name": "centre", "Prefab": "P",
                  "Position": { "X": {{ divide(game_width(), 2) }}, "Y": {{ divide(game_height(), 2) }} } }
            ]
        }"#;
        let context = TemplateContext::new(Viewport::new(800, 600));
        let scene = SceneAssembler::new(&registries)
            .load("main.json", source, DataFormat::Json, &context)
            .unwrap();
        let position = scene.entity_by_name("centre").unwrap().transform().position;
        assert_eq!(position, Vec2::new(50.0, 37.5));
    }

    #[test]
    fn test_load_reports_template_and_decode_errors() {
        let registries = registries();
        let assembler = SceneAssembler::new(&registries);
        let context = TemplateContext::default();
        assert!(matches!(
            assembler.load("bad", "{{ nowhere }}", DataFormat::Json, &context),
            Err(AssemblyError::Template { .. })
        ));
        assert!(matches!(
            assembler.load("bad", "{ \"Name\": ", DataFormat::Json, &context),
            Err(AssemblyError::Decode(_))
        ));
    }
}
