//! Scene management
//!
//! Scenes are trees of live entities built from templated documents.
//!
//! ## Architecture
//!
//! ```text
//! scene template ──expand──▶ document ──decode──▶ SceneDefinition
//!                                                      │
//!                        Registries (prefabs, generators)
//!                                                      ▼
//!                                   SceneAssembler ──▶ Scene (node tree)
//! ```
//!
//! The assembled [`Scene`] owns its entities, drives their lifecycle in
//! pre-order and reports additions and removals on the message bus.

pub mod assembly;
pub mod definition;
pub mod scene_graph;
pub mod template;

#[cfg(test)]
mod tests;

pub use assembly::{AssemblyError, SceneAssembler};
pub use definition::{EntityRecord, SceneDefinition};
pub use scene_graph::{
    EntityAdded, EntityRemoved, NodeKey, Scene, SceneError, SceneMailbox, SharedScene, ROOT_NAME,
};
pub use template::TemplateContext;
