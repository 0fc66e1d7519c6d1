//! Entities
//!
//! An [`Entity`] is an [`EntityCore`] (identity, transform, body, keyboard,
//! hierarchy links, lifecycle flags) plus its ordered components and any child
//! entities it owns before joining a scene.
//!
//! ## Lifecycle
//!
//! ```text
//! Dormant --start--> Started --awake--> Awake <--sleep/awake--> Asleep
//!                        any state --stop--> Stopped (terminal)
//! ```
//!
//! Every call runs the components in attach order, then recurses into owned
//! children. `update` only reaches components while the entity is awake.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bitflags::bitflags;

use super::body::Body;
use super::component::Component;
use super::transform::Transform;
use crate::input::KeyboardSet;
use crate::registry::{Prefab, Registries, RegistryError};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique entity identifier
///
/// Ids are handed out in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

bitflags! {
    /// Raw lifecycle flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LifecycleFlags: u8 {
        /// `start` ran and `stop` has not
        const STARTED = 1 << 0;
        /// Receiving updates
        const AWAKE = 1 << 1;
        /// Put to sleep after being awake
        const ASLEEP = 1 << 2;
        /// Terminal
        const STOPPED = 1 << 3;
    }
}

/// Lifecycle state derived from [`LifecycleFlags`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, never started
    Dormant,
    /// Started, not yet awake
    Started,
    /// Receiving updates
    Awake,
    /// Started but not receiving updates
    Asleep,
    /// Terminal
    Stopped,
}

impl From<LifecycleFlags> for Lifecycle {
    fn from(flags: LifecycleFlags) -> Self {
        if flags.contains(LifecycleFlags::STOPPED) {
            Self::Stopped
        } else if flags.contains(LifecycleFlags::AWAKE) {
            Self::Awake
        } else if flags.contains(LifecycleFlags::ASLEEP) {
            Self::Asleep
        } else if flags.contains(LifecycleFlags::STARTED) {
            Self::Started
        } else {
            Self::Dormant
        }
    }
}

/// Entity state that components can touch
#[derive(Debug)]
pub struct EntityCore {
    id: EntityId,
    name: String,
    /// Position and visual
    pub transform: Transform,
    /// Physics body, if the entity collides
    pub body: Option<Body>,
    keyboard: KeyboardSet,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    flags: LifecycleFlags,
}

impl EntityCore {
    fn new(name: String) -> Self {
        Self {
            id: EntityId::next(),
            name,
            transform: Transform::default(),
            body: None,
            keyboard: KeyboardSet::new(),
            parent: None,
            children: Vec::new(),
            flags: LifecycleFlags::empty(),
        }
    }

    /// Unique id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Name, unique within a scene
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key handlers installed by components
    pub fn keyboard(&self) -> &KeyboardSet {
        &self.keyboard
    }

    /// Parent id, if linked
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child ids in link order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Raw lifecycle flags
    pub fn flags(&self) -> LifecycleFlags {
        self.flags
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.flags.into()
    }

    /// Whether `start` ran and `stop` has not
    pub fn is_started(&self) -> bool {
        self.flags.contains(LifecycleFlags::STARTED)
    }

    /// Whether the entity receives updates
    pub fn is_awake(&self) -> bool {
        self.flags.contains(LifecycleFlags::AWAKE)
    }

    /// Whether the entity was stopped
    pub fn is_stopped(&self) -> bool {
        self.flags.contains(LifecycleFlags::STOPPED)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: EntityId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn forget_child(&mut self, child: EntityId) {
        self.children.retain(|&c| c != child);
    }
}

/// A node of behaviour: core state, components and owned children
pub struct Entity {
    core: EntityCore,
    components: Vec<Box<dyn Component>>,
    pending: Vec<Entity>,
}

impl Entity {
    /// Entity with an empty transform and no components
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(name.into()),
            components: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Build an entity from a prefab: transform, collider, then components in order
    pub fn from_prefab(prefab: &Prefab, registries: &Registries) -> Result<Self, RegistryError> {
        let mut entity = Self::new(prefab.name.clone());
        entity.core.transform = registries.instantiate_transform(&prefab.transform)?;
        if let Some(collider) = &prefab.collider {
            entity.core.body = Some(registries.colliders.generate(&collider.kind, &collider.arguments)?);
        }
        for entry in &prefab.components {
            let component = registries.components.generate(&entry.name, &entry.arguments)?;
            entity.add_component(component);
        }
        Ok(entity)
    }

    /// Builder pattern: replace the transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.core.transform = transform;
        self
    }

    /// Builder pattern: attach a component
    pub fn with_component(mut self, component: impl Component) -> Self {
        self.add_component(Box::new(component) as Box<dyn Component>);
        self
    }

    /// Unique id
    pub fn id(&self) -> EntityId {
        self.core.id
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Rename; only meaningful before the entity joins a scene
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.core.name = name.into();
    }

    /// Core state
    pub fn core(&self) -> &EntityCore {
        &self.core
    }

    /// Core state, mutably
    pub fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    /// Transform
    pub fn transform(&self) -> &Transform {
        &self.core.transform
    }

    /// Transform, mutably
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.core.transform
    }

    /// Physics body
    pub fn body(&self) -> Option<&Body> {
        self.core.body.as_ref()
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.core.lifecycle()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Append a component and make this entity its owner; `None` is ignored
    pub fn add_component(&mut self, component: impl Into<Option<Box<dyn Component>>>) {
        let Some(mut component) = component.into() else {
            return;
        };
        component.set_owner(self.core.id);
        self.components.push(component);
    }

    /// Take ownership of a child entity
    pub fn add_child(&mut self, mut child: Entity) {
        child.core.parent = Some(self.core.id);
        self.core.push_child(child.core.id);
        self.pending.push(child);
    }

    /// Give up a child entity, clearing its parent link
    pub fn remove_child(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.pending.iter().position(|c| c.core.id == id)?;
        let mut child = self.pending.remove(index);
        child.core.parent = None;
        self.core.forget_child(id);
        Some(child)
    }

    /// Owned children not yet handed to a scene
    pub fn pending_children(&self) -> &[Entity] {
        &self.pending
    }

    pub(crate) fn take_pending_children(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending)
    }

    /// Start: runs `start` on every component, then on owned children
    pub fn start(&mut self) {
        if self.refuse_after_stop("start") {
            return;
        }
        self.core.flags.insert(LifecycleFlags::STARTED);
        for component in &mut self.components {
            component.start(&mut self.core);
        }
        for child in &mut self.pending {
            child.start();
        }
    }

    /// Awake: enables updates; ignored before the first `start`
    pub fn awake(&mut self) {
        if self.refuse_after_stop("awake") {
            return;
        }
        if !self.core.is_started() {
            log::warn!("Ignoring awake on {} '{}' before start", self.core.id, self.core.name);
            return;
        }
        self.core.flags.remove(LifecycleFlags::ASLEEP);
        self.core.flags.insert(LifecycleFlags::AWAKE);
        for component in &mut self.components {
            component.awake(&mut self.core);
        }
        for child in &mut self.pending {
            child.awake();
        }
    }

    /// Update every component in attach order while awake
    pub fn update(&mut self, dt: Duration) {
        if !self.core.is_awake() {
            return;
        }
        for component in &mut self.components {
            component.update(&mut self.core, dt);
        }
        for child in &mut self.pending {
            child.update(dt);
        }
    }

    /// Sleep: disables updates until the next `awake`
    pub fn sleep(&mut self) {
        if self.refuse_after_stop("sleep") {
            return;
        }
        if self.core.is_awake() {
            self.core.flags.insert(LifecycleFlags::ASLEEP);
        }
        self.core.flags.remove(LifecycleFlags::AWAKE);
        for component in &mut self.components {
            component.sleep(&mut self.core);
        }
        for child in &mut self.pending {
            child.sleep();
        }
    }

    /// Stop for good; later lifecycle calls are ignored
    pub fn stop(&mut self) {
        if self.refuse_after_stop("stop") {
            return;
        }
        self.core.flags = LifecycleFlags::STOPPED;
        for component in &mut self.components {
            component.stop(&mut self.core);
        }
        self.core.keyboard.clear();
        for child in &mut self.pending {
            child.stop();
        }
    }

    fn refuse_after_stop(&self, call: &str) -> bool {
        if self.core.is_stopped() {
            log::warn!("Ignoring {call} on stopped {} '{}'", self.core.id, self.core.name);
            return true;
        }
        false
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("core", &self.core)
            .field("components", &self.components.len())
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::ecs::component::{ComponentBase, NoopComponent};
    use crate::foundation::math::Vec2;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Probe {
        base: ComponentBase,
        tag: &'static str,
        log: Log,
    }

    impl Probe {
        fn new(tag: &'static str, log: &Log) -> Self {
            Self {
                base: ComponentBase::new(),
                tag,
                log: Arc::clone(log),
            }
        }

        fn record(&self, call: &str) {
            self.log.lock().unwrap().push(format!("{}.{call}", self.tag));
        }
    }

    impl Component for Probe {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }

        fn awake(&mut self, _entity: &mut EntityCore) {
            self.record("awake");
        }

        fn start(&mut self, _entity: &mut EntityCore) {
            self.record("start");
        }

        fn update(&mut self, entity: &mut EntityCore, dt: Duration) {
            entity.transform.move_by(Vec2::new(dt.as_secs_f32(), 0.0));
            self.record("update");
        }

        fn sleep(&mut self, _entity: &mut EntityCore) {
            self.record("sleep");
        }

        fn stop(&mut self, _entity: &mut EntityCore) {
            self.record("stop");
        }
    }

    fn drain(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let ids: Vec<EntityId> = (0..16).map(|i| Entity::new(format!("e{i}")).id()).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_update_runs_components_in_attach_order() {
        let log = Log::default();
        let mut entity = Entity::new("paddle")
            .with_component(Probe::new("c1", &log))
            .with_component(Probe::new("c2", &log))
            .with_component(Probe::new("c3", &log));
        entity.start();
        entity.awake();
        drain(&log);

        entity.update(Duration::from_millis(500));
        assert_eq!(drain(&log), vec!["c1.update", "c2.update", "c3.update"]);
        assert_eq!(entity.transform().position, Vec2::new(1.5, 0.0));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let log = Log::default();
        let mut entity = Entity::new("ball").with_component(Probe::new("c", &log));
        assert_eq!(entity.lifecycle(), Lifecycle::Dormant);

        entity.update(Duration::from_millis(16));
        entity.awake();
        assert_eq!(entity.lifecycle(), Lifecycle::Dormant);
        assert!(drain(&log).is_empty());

        entity.start();
        assert_eq!(entity.lifecycle(), Lifecycle::Started);
        entity.awake();
        assert_eq!(entity.lifecycle(), Lifecycle::Awake);
        entity.sleep();
        assert_eq!(entity.lifecycle(), Lifecycle::Asleep);
        entity.update(Duration::from_millis(16));
        entity.awake();
        entity.stop();
        assert_eq!(entity.lifecycle(), Lifecycle::Stopped);
        assert!(!entity.core().is_started());

        entity.start();
        entity.awake();
        entity.update(Duration::from_millis(16));
        assert_eq!(
            drain(&log),
            vec!["c.start", "c.awake", "c.sleep", "c.awake", "c.stop"]
        );
    }

    #[test]
    fn test_start_twice_reinvokes_components() {
        let log = Log::default();
        let mut entity = Entity::new("e").with_component(Probe::new("c", &log));
        entity.start();
        entity.start();
        assert_eq!(drain(&log), vec!["c.start", "c.start"]);
    }

    #[test]
    fn test_add_component_sets_owner_and_ignores_none() {
        let mut entity = Entity::new("e");
        entity.add_component(None::<Box<dyn Component>>);
        assert_eq!(entity.component_count(), 0);

        let mut component: Box<dyn Component> = Box::new(NoopComponent::default());
        assert_eq!(component.owner(), None);
        component.set_owner(entity.id());
        entity.add_component(component);
        assert_eq!(entity.component_count(), 1);
    }

    #[test]
    fn test_stop_drops_key_handlers() {
        let mut entity = Entity::new("paddle");
        let installed = entity.core().keyboard().clone();
        entity.start();
        entity.awake();
        installed.add_handler(Arc::new(crate::input::KeyHandler::new()));
        assert_eq!(entity.core().keyboard().len(), 1);

        entity.stop();
        assert!(entity.core().keyboard().is_empty());
        assert!(installed.is_empty());
    }

    #[test]
    fn test_children_follow_parent_lifecycle() {
        let log = Log::default();
        let child = Entity::new("child").with_component(Probe::new("child", &log));
        let child_id = child.id();
        let mut parent = Entity::new("parent").with_component(Probe::new("parent", &log));
        parent.add_child(child);
        assert_eq!(parent.core().children(), &[child_id]);
        assert_eq!(parent.pending_children()[0].core().parent(), Some(parent.id()));

        parent.start();
        assert_eq!(drain(&log), vec!["parent.start", "child.start"]);

        let child = parent.remove_child(child_id).unwrap();
        assert_eq!(child.core().parent(), None);
        assert!(parent.core().children().is_empty());
        assert!(parent.remove_child(child_id).is_none());
    }
}
