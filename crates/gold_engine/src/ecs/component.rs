//! Component trait
//!
//! Components add behaviour to an entity through five lifecycle calls. Every
//! call has a no-op default, so a component overrides only what it needs.
//! Each call receives the owning entity's [`EntityCore`], which is how a
//! component moves its transform or installs key handlers.
//!
//! `start` and `awake` may be invoked more than once over a component's life
//! (after a sleep, or when a scene is restarted), so implementations must
//! tolerate repeated calls.

use std::time::Duration;

use super::entity::{EntityCore, EntityId};

/// Ownership record embedded in every component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentBase {
    owner: Option<EntityId>,
}

impl ComponentBase {
    /// Unowned base
    pub fn new() -> Self {
        Self::default()
    }
}

/// Behaviour attached to an entity
pub trait Component: Send + 'static {
    /// Embedded ownership record
    fn base(&self) -> &ComponentBase;

    /// Embedded ownership record, mutably
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Record the owning entity; called once when the component is attached
    fn set_owner(&mut self, owner: EntityId) {
        self.base_mut().owner = Some(owner);
    }

    /// Owning entity
    fn owner(&self) -> Option<EntityId> {
        self.base().owner
    }

    /// Entity became active
    fn awake(&mut self, _entity: &mut EntityCore) {}

    /// Entity started
    fn start(&mut self, _entity: &mut EntityCore) {}

    /// Per-frame update; `dt` is the time since the previous update
    fn update(&mut self, _entity: &mut EntityCore, _dt: Duration) {}

    /// Entity went to sleep
    fn sleep(&mut self, _entity: &mut EntityCore) {}

    /// Entity stopped for good
    fn stop(&mut self, _entity: &mut EntityCore) {}
}

/// Component whose lifecycle calls all do nothing
#[derive(Debug, Default)]
pub struct NoopComponent {
    base: ComponentBase,
}

impl Component for NoopComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}
