//! Entities and components
//!
//! Entities own an ordered list of [`Component`]s and are driven through a
//! fixed lifecycle (`start`, `awake`, `update`, `sleep`, `stop`) by the scene
//! they live in.

pub mod body;
pub mod component;
pub mod entity;
pub mod transform;

pub use body::{Body, ColliderShape};
pub use component::{Component, ComponentBase, NoopComponent};
pub use entity::{Entity, EntityCore, EntityId, Lifecycle, LifecycleFlags};
pub use transform::{ShapeStyle, Transform, Visual};
