//! # Physics Backend Abstraction

use std::time::Duration;

use crate::ecs::{Body, EntityId};
use crate::foundation::math::Vec2;

/// # Physics Backend Trait
///
/// Implemented by a rigid-body simulation. Bodies are keyed by the entity
/// that owns them; adding a body for a known entity replaces it.
pub trait PhysicsBackend: Send {
    /// Set the gravity vector
    fn set_gravity(&mut self, gravity: Vec2);

    /// Add or replace the body of an entity
    fn add_body(&mut self, entity: EntityId, body: &Body);

    /// Remove the body of an entity; unknown entities are ignored
    fn remove_body(&mut self, entity: EntityId);

    /// Advance the simulation
    fn step(&mut self, dt: Duration);

    /// Number of simulated bodies
    fn body_count(&self) -> usize;
}
