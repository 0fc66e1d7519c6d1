//! # Physics
//!
//! [`PhysicsEngine`] keeps a [`PhysicsBackend`] in step with the current scene.
//! It never walks the scene per frame; instead it listens to the scene's
//! `SceneAddedEntity` and `SceneRemovedEntity` messages.
//!
//! ## Scene changes
//!
//! On `SceneChanged` the engine drops every body of the previous scene,
//! unsubscribes from it, subscribes to the new scene and registers the bodies
//! the new scene already holds. Subscribing happens before the scan, so an
//! entity added in between is registered twice at worst, which the backend
//! treats as a replacement.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backend::PhysicsBackend;
use crate::core::PhysicsConfig;
use crate::ecs::{Body, EntityId};
use crate::events::{Address, Mailbox, MailboxSlot, Message, MessageKind};
use crate::foundation::sync;
use crate::scene::{EntityAdded, EntityRemoved, SharedScene};

#[derive(Default)]
struct Tracking {
    scene: Option<Address>,
    bodies: BTreeSet<EntityId>,
}

/// Bus participant owning the physics backend
pub struct PhysicsEngine {
    slot: MailboxSlot,
    debug: bool,
    backend: Mutex<Box<dyn PhysicsBackend>>,
    tracking: Mutex<Tracking>,
}

impl PhysicsEngine {
    /// Wrap a backend and apply the configured gravity
    pub fn new(mut backend: Box<dyn PhysicsBackend>, config: &PhysicsConfig) -> Self {
        backend.set_gravity(config.gravity);
        Self {
            slot: MailboxSlot::new(),
            debug: config.debug,
            backend: Mutex::new(backend),
            tracking: Mutex::new(Tracking::default()),
        }
    }

    /// Advance the simulation
    pub fn step(&self, dt: Duration) {
        sync::lock(&self.backend).step(dt);
    }

    /// Number of simulated bodies
    pub fn body_count(&self) -> usize {
        sync::lock(&self.backend).body_count()
    }

    /// Address of the scene whose bodies are simulated
    pub fn scene_address(&self) -> Option<Address> {
        sync::lock(&self.tracking).scene
    }

    fn add_body(&self, entity: EntityId, body: &Body) {
        if self.debug {
            log::debug!("Physics adding {} body for {entity}", body.shape.kind());
        }
        sync::lock(&self.backend).add_body(entity, body);
        sync::lock(&self.tracking).bodies.insert(entity);
    }

    fn remove_body(&self, entity: EntityId) {
        if !sync::lock(&self.tracking).bodies.remove(&entity) {
            return;
        }
        if self.debug {
            log::debug!("Physics removing body of {entity}");
        }
        sync::lock(&self.backend).remove_body(entity);
    }

    fn change_scene(&self, scene: &SharedScene) {
        let Some((office, me)) = self.slot.binding() else {
            log::warn!("Physics engine received a scene change while off the bus");
            return;
        };

        let (address, bodies) = {
            let scene = sync::lock(scene);
            let bodies: Vec<(EntityId, Body)> = scene
                .entities()
                .into_iter()
                .filter_map(|entity| entity.body().map(|body| (entity.id(), body.clone())))
                .collect();
            (scene.address(), bodies)
        };

        let (previous, stale) = {
            let mut tracking = sync::lock(&self.tracking);
            let stale = std::mem::take(&mut tracking.bodies);
            (std::mem::replace(&mut tracking.scene, address), stale)
        };
        if let Some(previous) = previous {
            office.unsubscribe(previous, me, &MessageKind::SCENE_ADDED_ENTITY);
            office.unsubscribe(previous, me, &MessageKind::SCENE_REMOVED_ENTITY);
        }
        {
            let mut backend = sync::lock(&self.backend);
            for entity in stale {
                backend.remove_body(entity);
            }
        }

        match address {
            Some(address) => {
                office.subscribe(address, me, MessageKind::SCENE_ADDED_ENTITY);
                office.subscribe(address, me, MessageKind::SCENE_REMOVED_ENTITY);
            }
            None => log::debug!("Physics following a scene that is not on the bus"),
        }
        for (entity, body) in &bodies {
            self.add_body(*entity, body);
        }
        log::debug!("Physics now simulates {} bodies", bodies.len());
    }
}

impl Mailbox for PhysicsEngine {
    fn mailbox(&self) -> &MailboxSlot {
        &self.slot
    }

    fn receive(&self, message: &Message) {
        if message.is(&MessageKind::SCENE_CHANGED) {
            if let Some(scene) = message.payload::<SharedScene>() {
                self.change_scene(scene);
            }
        } else if message.is(&MessageKind::SCENE_ADDED_ENTITY) {
            if let Some(EntityAdded { id, body: Some(body), .. }) = message.payload::<EntityAdded>() {
                self.add_body(*id, body);
            }
        } else if message.is(&MessageKind::SCENE_REMOVED_ENTITY) {
            if let Some(removed) = message.payload::<EntityRemoved>() {
                self.remove_body(removed.id);
            }
        }
    }
}

impl std::fmt::Debug for PhysicsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsEngine")
            .field("address", &self.address())
            .field("scene", &self.scene_address())
            .finish_non_exhaustive()
    }
}
