//! Scene graph
//!
//! A [`Scene`] owns its entities in a node arena. The node tree, not the flat
//! lookup tables, decides traversal order and parentage: every entity hangs
//! below a synthetic `ROOT` node, and the parent link stored on each
//! [`EntityCore`](crate::ecs::EntityCore) always mirrors the tree.
//!
//! Tree-wide lifecycle calls (`start`, `awake`, `update`, `sleep`, `stop`)
//! visit nodes in pre-order, children in the order they were linked. Draw
//! order is separate: nodes sort by z-index, ties keep insertion order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::ecs::{Body, Entity, EntityId};
use crate::events::{Address, Mailbox, MailboxSlot, Message, MessageKind};

/// Reserved name of the synthetic root node
pub const ROOT_NAME: &str = "ROOT";

new_key_type! {
    /// Arena key of a scene node
    pub struct NodeKey;
}

/// Scene shared between the orchestrator, window and physics participants
pub type SharedScene = Arc<Mutex<Scene>>;

/// Payload of `SceneAddedEntity`
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAdded {
    /// Scene name
    pub scene: String,
    /// Entity id
    pub id: EntityId,
    /// Entity name
    pub name: String,
    /// Entity body at the time it was added
    pub body: Option<Body>,
}

/// Payload of `SceneRemovedEntity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRemoved {
    /// Scene name
    pub scene: String,
    /// Entity id
    pub id: EntityId,
    /// Entity name
    pub name: String,
    /// Id of the entity's keyboard set
    pub keyboard: u64,
}

/// Scene graph errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// `ROOT` is reserved
    #[error("entity name '{0}' is reserved")]
    ReservedName(String),

    /// Another entity in the scene has the name
    #[error("entity name '{0}' is already used in this scene")]
    DuplicateName(String),

    /// No entity with the id lives in the scene
    #[error("no entity {0} in this scene")]
    UnknownEntity(EntityId),

    /// Re-parenting would create a cycle
    #[error("cannot parent {child} under its own descendant {parent}")]
    Cycle {
        /// Entity being moved
        child: EntityId,
        /// Requested parent
        parent: EntityId,
    },
}

/// The scene's bus participant
///
/// Scenes post `SceneAddedEntity` and `SceneRemovedEntity` from this address.
#[derive(Debug)]
pub struct SceneMailbox {
    slot: MailboxSlot,
    scene: String,
}

impl SceneMailbox {
    /// Name of the scene this mailbox speaks for
    pub fn scene_name(&self) -> &str {
        &self.scene
    }
}

impl Mailbox for SceneMailbox {
    fn mailbox(&self) -> &MailboxSlot {
        &self.slot
    }

    fn receive(&self, message: &Message) {
        log::trace!("Scene '{}' received {}", self.scene, message.kind());
    }
}

type SceneHook = Box<dyn FnMut(&mut Scene) + Send>;
type SceneUpdateHook = Box<dyn FnMut(&mut Scene, Duration) + Send>;

#[derive(Default)]
struct SceneHooks {
    start: Option<SceneHook>,
    awake: Option<SceneHook>,
    update: Option<SceneUpdateHook>,
}

struct Node {
    entity: Entity,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    z_index: i32,
    order: u64,
}

/// A tree of live entities
pub struct Scene {
    name: String,
    nodes: SlotMap<NodeKey, Node>,
    root: NodeKey,
    by_name: HashMap<String, NodeKey>,
    by_id: HashMap<EntityId, NodeKey>,
    next_order: u64,
    started: bool,
    mailbox: Arc<SceneMailbox>,
    hooks: SceneHooks,
}

impl Scene {
    /// Empty scene holding only the root node
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            entity: Entity::new(ROOT_NAME),
            parent: None,
            children: Vec::new(),
            z_index: 0,
            order: 0,
        });
        let mut by_name = HashMap::new();
        by_name.insert(ROOT_NAME.to_string(), root);
        Self {
            mailbox: Arc::new(SceneMailbox {
                slot: MailboxSlot::new(),
                scene: name.clone(),
            }),
            name,
            nodes,
            root,
            by_name,
            by_id: HashMap::new(),
            next_order: 1,
            started: false,
            hooks: SceneHooks::default(),
        }
    }

    /// Wrap the scene for sharing
    pub fn share(self) -> SharedScene {
        Arc::new(Mutex::new(self))
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bus participant of this scene
    pub fn mailbox(&self) -> Arc<SceneMailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Bus address, once the scene's mailbox is registered
    pub fn address(&self) -> Option<Address> {
        self.mailbox.address()
    }

    /// Id of the synthetic root entity
    pub fn root_id(&self) -> EntityId {
        self.nodes[self.root].entity.id()
    }

    /// Number of entities, root excluded
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the scene holds no entity
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Whether the scene holds the entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Whether `start` ran and `stop` has not
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Add an entity and every child it owns
    ///
    /// The entity always links under the root; its owned children come from
    /// its pending list and link under it. Returns `Ok(false)` without changes when
    /// an entity with the same id is already present. Names are checked for the
    /// whole subtree before anything is inserted.
    pub fn add_entity(&mut self, entity: Entity) -> Result<bool, SceneError> {
        if self.by_id.contains_key(&entity.id()) {
            return Ok(false);
        }
        let mut names = Vec::new();
        collect_names(&entity, &mut names);
        for (index, name) in names.iter().enumerate() {
            if *name == ROOT_NAME {
                return Err(SceneError::ReservedName(name.to_string()));
            }
            if self.by_name.contains_key(*name) || names[..index].contains(name) {
                return Err(SceneError::DuplicateName(name.to_string()));
            }
        }

        self.insert_tree(entity, self.root);
        Ok(true)
    }

    fn insert_tree(&mut self, mut entity: Entity, parent: NodeKey) {
        let children = entity.take_pending_children();
        let key = self.insert_node(entity);
        self.link(key, parent);
        self.announce_added(key);
        for child in children {
            self.insert_tree(child, key);
        }
    }

    fn announce_added(&self, key: NodeKey) {
        let entity = &self.nodes[key].entity;
        self.mailbox.post(Message::with_payload(
            MessageKind::SCENE_ADDED_ENTITY,
            EntityAdded {
                scene: self.name.clone(),
                id: entity.id(),
                name: entity.name().to_string(),
                body: entity.body().cloned(),
            },
        ));
    }

    /// Insert an unlinked node and index it; used by assembly before linking
    pub(crate) fn insert_node(&mut self, entity: Entity) -> NodeKey {
        let id = entity.id();
        let name = entity.name().to_string();
        let order = self.next_order;
        self.next_order += 1;
        let key = self.nodes.insert(Node {
            entity,
            parent: None,
            children: Vec::new(),
            z_index: 0,
            order,
        });
        self.by_name.insert(name, key);
        self.by_id.insert(id, key);
        key
    }

    /// Link `child` under `parent` in the tree and on the entity pair
    pub(crate) fn link(&mut self, child: NodeKey, parent: NodeKey) {
        let (Some(child_id), Some(parent_id)) = (self.entity_id(child), self.entity_id(parent)) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
            node.entity.core_mut().push_child(child_id);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.entity.core_mut().set_parent(Some(parent_id));
        }
    }

    fn unlink(&mut self, child: NodeKey) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        let child_id = self.nodes[child].entity.id();
        self.nodes[child].entity.core_mut().set_parent(None);
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != child);
            node.entity.core_mut().forget_child(child_id);
        }
    }

    pub(crate) fn root_key(&self) -> NodeKey {
        self.root
    }

    pub(crate) fn key_of(&self, name: &str) -> Option<NodeKey> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn node_entity_mut(&mut self, key: NodeKey) -> Option<&mut Entity> {
        self.nodes.get_mut(key).map(|node| &mut node.entity)
    }

    pub(crate) fn set_node_z_index(&mut self, key: NodeKey, z_index: i32) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.z_index = z_index;
        }
    }

    /// Whether `ancestor` is `node` or lies on its path to the root
    pub(crate) fn is_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut cursor = Some(node);
        while let Some(key) = cursor {
            if key == ancestor {
                return true;
            }
            cursor = self.nodes.get(key).and_then(|node| node.parent);
        }
        false
    }

    fn entity_id(&self, key: NodeKey) -> Option<EntityId> {
        self.nodes.get(key).map(|node| node.entity.id())
    }

    /// Remove an entity and its whole subtree
    ///
    /// Every removed entity is stopped, then `SceneRemovedEntity` is posted for
    /// it. Returns the number of entities removed; unknown ids remove nothing.
    pub fn remove_entity(&mut self, id: EntityId) -> usize {
        let Some(&key) = self.by_id.get(&id) else {
            return 0;
        };
        self.unlink(key);
        let doomed = self.preorder(key);
        for &node_key in &doomed {
            let Some(mut node) = self.nodes.remove(node_key) else {
                continue;
            };
            if !node.entity.core().is_stopped() {
                node.entity.stop();
            }
            self.by_id.remove(&node.entity.id());
            self.by_name.remove(node.entity.name());
            self.mailbox.post(Message::with_payload(
                MessageKind::SCENE_REMOVED_ENTITY,
                EntityRemoved {
                    scene: self.name.clone(),
                    id: node.entity.id(),
                    name: node.entity.name().to_string(),
                    keyboard: node.entity.core().keyboard().id(),
                },
            ));
        }
        doomed.len()
    }

    /// Move an entity under `parent`, or under the root for `None`
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), SceneError> {
        let child_key = *self.by_id.get(&child).ok_or(SceneError::UnknownEntity(child))?;
        let parent_key = match parent {
            Some(id) => *self.by_id.get(&id).ok_or(SceneError::UnknownEntity(id))?,
            None => self.root,
        };

        if self.is_ancestor(child_key, parent_key) {
            return Err(SceneError::Cycle {
                child,
                parent: self.nodes[parent_key].entity.id(),
            });
        }

        self.unlink(child_key);
        self.link(child_key, parent_key);
        Ok(())
    }

    /// Entity by name
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.by_name.get(name).and_then(|&key| self.nodes.get(key)).map(|node| &node.entity)
    }

    /// Entity by name, mutably
    pub fn entity_by_name_mut(&mut self, name: &str) -> Option<&mut Entity> {
        let key = *self.by_name.get(name)?;
        self.node_entity_mut(key)
    }

    /// Entity by id
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.by_id.get(&id).and_then(|&key| self.nodes.get(key)).map(|node| &node.entity)
    }

    /// Entity by id, mutably
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let key = *self.by_id.get(&id)?;
        self.node_entity_mut(key)
    }

    /// Parent in the node tree
    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        let key = self.by_id.get(&id)?;
        let parent = self.nodes.get(*key)?.parent?;
        self.entity_id(parent)
    }

    /// Children in the node tree, in link order
    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        let key = if id == self.root_id() {
            Some(self.root)
        } else {
            self.by_id.get(&id).copied()
        };
        key.and_then(|key| self.nodes.get(key))
            .map(|node| node.children.iter().filter_map(|&c| self.entity_id(c)).collect())
            .unwrap_or_default()
    }

    /// Every entity in pre-order, root excluded
    pub fn entities(&self) -> Vec<&Entity> {
        self.preorder(self.root)
            .into_iter()
            .filter(|&key| key != self.root)
            .filter_map(|key| self.nodes.get(key))
            .map(|node| &node.entity)
            .collect()
    }

    /// Set the draw-order key of a named entity; returns whether it exists
    pub fn set_z_index(&mut self, name: &str, z_index: i32) -> bool {
        match self.by_name.get(name).copied() {
            Some(key) => {
                self.set_node_z_index(key, z_index);
                true
            }
            None => false,
        }
    }

    /// Draw-order key of a named entity
    pub fn z_index(&self, name: &str) -> Option<i32> {
        let key = self.by_name.get(name)?;
        self.nodes.get(*key).map(|node| node.z_index)
    }

    /// Entities sorted by z-index; ties keep insertion order
    pub fn draw_order(&self) -> Vec<&Entity> {
        let mut nodes: Vec<&Node> = self
            .nodes
            .iter()
            .filter(|(key, _)| *key != self.root)
            .map(|(_, node)| node)
            .collect();
        nodes.sort_by_key(|node| (node.z_index, node.order));
        nodes.into_iter().map(|node| &node.entity).collect()
    }

    /// Run `hook` at the start of [`Scene::start`]
    pub fn on_start(&mut self, hook: impl FnMut(&mut Scene) + Send + 'static) {
        self.hooks.start = Some(Box::new(hook));
    }

    /// Run `hook` at the start of [`Scene::awake`]
    pub fn on_awake(&mut self, hook: impl FnMut(&mut Scene) + Send + 'static) {
        self.hooks.awake = Some(Box::new(hook));
    }

    /// Run `hook` at the start of every [`Scene::update`]
    pub fn on_update(&mut self, hook: impl FnMut(&mut Scene, Duration) + Send + 'static) {
        self.hooks.update = Some(Box::new(hook));
    }

    /// Start every entity
    pub fn start(&mut self) {
        if let Some(mut hook) = self.hooks.start.take() {
            hook(self);
            self.hooks.start.get_or_insert(hook);
        }
        self.started = true;
        self.traverse(Entity::start);
    }

    /// Wake every entity
    pub fn awake(&mut self) {
        if let Some(mut hook) = self.hooks.awake.take() {
            hook(self);
            self.hooks.awake.get_or_insert(hook);
        }
        self.traverse(Entity::awake);
    }

    /// Update every awake entity
    pub fn update(&mut self, dt: Duration) {
        if let Some(mut hook) = self.hooks.update.take() {
            hook(self, dt);
            self.hooks.update.get_or_insert(hook);
        }
        self.traverse(|entity| entity.update(dt));
    }

    /// Put every entity to sleep
    pub fn sleep(&mut self) {
        self.traverse(Entity::sleep);
    }

    /// Stop every entity
    pub fn stop(&mut self) {
        self.started = false;
        self.traverse(Entity::stop);
    }

    fn traverse(&mut self, mut visit: impl FnMut(&mut Entity)) {
        for key in self.preorder(self.root) {
            if let Some(node) = self.nodes.get_mut(key) {
                visit(&mut node.entity);
            }
        }
    }

    /// Keys of the subtree under `start`, pre-order, children in link order
    fn preorder(&self, start: NodeKey) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            order.push(key);
            stack.extend(node.children.iter().rev());
        }
        order
    }
}

fn collect_names<'a>(entity: &'a Entity, names: &mut Vec<&'a str>) {
    names.push(entity.name());
    for child in entity.pending_children() {
        collect_names(child, names);
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("entities", &self.len())
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::ecs::{Component, ComponentBase, EntityCore};
    use crate::events::PostOffice;

    type Log = Arc<StdMutex<Vec<String>>>;

    struct Tracer {
        base: ComponentBase,
        log: Log,
    }

    impl Component for Tracer {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }

        fn update(&mut self, entity: &mut EntityCore, _dt: Duration) {
            self.log.lock().unwrap().push(entity.name().to_string());
        }

        fn stop(&mut self, entity: &mut EntityCore) {
            self.log.lock().unwrap().push(format!("stop {}", entity.name()));
        }
    }

    fn traced(name: &str, log: &Log) -> Entity {
        Entity::new(name).with_component(Tracer {
            base: ComponentBase::new(),
            log: Arc::clone(log),
        })
    }

    fn drain(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    #[test]
    fn test_top_level_entities_hang_under_root() {
        let mut scene = Scene::new("s");
        let entity = Entity::new("e1");
        let id = entity.id();
        assert!(scene.add_entity(entity).unwrap());

        assert_eq!(scene.parent_of(id), Some(scene.root_id()));
        assert_eq!(scene.entity(id).unwrap().core().parent(), Some(scene.root_id()));
        assert_eq!(scene.children_of(scene.root_id()), vec![id]);
        assert_eq!(scene.entity_by_name("e1").unwrap().id(), id);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_rejects_reserved_and_duplicate_names() {
        let mut scene = Scene::new("s");
        scene.add_entity(Entity::new("a")).unwrap();
        assert_eq!(
            scene.add_entity(Entity::new(ROOT_NAME)),
            Err(SceneError::ReservedName(ROOT_NAME.into()))
        );
        assert_eq!(
            scene.add_entity(Entity::new("a")),
            Err(SceneError::DuplicateName("a".into()))
        );

        let mut parent = Entity::new("p");
        parent.add_child(Entity::new("a"));
        assert!(scene.add_entity(parent).is_err());
        assert!(scene.entity_by_name("p").is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_update_visits_tree_in_preorder() {
        let log = Log::default();
        let mut a = traced("a", &log);
        let mut b = traced("b", &log);
        b.add_child(traced("c", &log));
        a.add_child(b);
        a.add_child(traced("d", &log));

        let mut scene = Scene::new("s");
        scene.add_entity(a).unwrap();
        scene.add_entity(traced("e", &log)).unwrap();
        scene.start();
        scene.awake();
        scene.update(Duration::from_millis(16));

        assert_eq!(drain(&log), vec!["a", "b", "c", "d", "e"]);
        let names: Vec<&str> = scene.entities().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_children_keep_their_parent() {
        let mut parent = Entity::new("parent");
        let child = Entity::new("child");
        let child_id = child.id();
        let parent_id = parent.id();
        parent.add_child(child);

        let mut scene = Scene::new("s");
        scene.add_entity(parent).unwrap();
        assert_eq!(scene.parent_of(child_id), Some(parent_id));
        assert_eq!(scene.entity(child_id).unwrap().core().parent(), Some(parent_id));
        assert_eq!(scene.entity(parent_id).unwrap().core().children(), &[child_id]);
    }

    #[test]
    fn test_draw_order_is_stable_by_z_index() {
        let mut scene = Scene::new("s");
        for name in ["a", "b", "c", "d"] {
            scene.add_entity(Entity::new(name)).unwrap();
        }
        assert!(scene.set_z_index("a", 2));
        assert!(scene.set_z_index("c", -1));
        assert!(!scene.set_z_index("missing", 5));

        let names: Vec<&str> = scene.draw_order().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["c", "b", "d", "a"]);
        assert_eq!(scene.z_index("a"), Some(2));
    }

    #[test]
    fn test_set_parent_refuses_cycles() {
        let mut scene = Scene::new("s");
        let a = Entity::new("a");
        let b = Entity::new("b");
        let (a_id, b_id) = (a.id(), b.id());
        scene.add_entity(a).unwrap();
        scene.add_entity(b).unwrap();

        scene.set_parent(b_id, Some(a_id)).unwrap();
        assert_eq!(scene.parent_of(b_id), Some(a_id));
        assert!(scene.children_of(scene.root_id()) == vec![a_id]);
        assert_eq!(
            scene.set_parent(a_id, Some(b_id)),
            Err(SceneError::Cycle { child: a_id, parent: b_id })
        );

        scene.set_parent(b_id, None).unwrap();
        assert_eq!(scene.entity(b_id).unwrap().core().parent(), Some(scene.root_id()));
        assert!(scene.entity(a_id).unwrap().core().children().is_empty());
    }

    #[test]
    fn test_remove_entity_stops_subtree() {
        let log = Log::default();
        let mut a = traced("a", &log);
        a.add_child(traced("b", &log));
        let a_id = a.id();
        let mut scene = Scene::new("s");
        scene.add_entity(a).unwrap();
        scene.add_entity(traced("c", &log)).unwrap();

        assert_eq!(scene.remove_entity(a_id), 2);
        assert_eq!(drain(&log), vec!["stop a", "stop b"]);
        assert!(scene.entity_by_name("b").is_none());
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.remove_entity(a_id), 0);

        // Names are free again.
        scene.add_entity(Entity::new("a")).unwrap();
    }

    #[test]
    fn test_hooks_run_before_traversal() {
        let log = Log::default();
        let mut scene = Scene::new("s");
        scene.add_entity(traced("a", &log)).unwrap();
        let hook_log = Arc::clone(&log);
        scene.on_update(move |scene, _dt| {
            hook_log.lock().unwrap().push(format!("hook {}", scene.len()));
        });
        let started = Arc::new(StdMutex::new(false));
        let flag = Arc::clone(&started);
        scene.on_start(move |_| *flag.lock().unwrap() = true);

        scene.start();
        scene.awake();
        scene.update(Duration::ZERO);
        scene.update(Duration::ZERO);
        assert!(*started.lock().unwrap());
        assert!(scene.is_started());
        assert_eq!(drain(&log), vec!["hook 1", "a", "hook 1", "a"]);
    }

    #[derive(Default)]
    struct Watcher {
        slot: MailboxSlot,
        added: StdMutex<Vec<String>>,
        removed: StdMutex<Vec<String>>,
    }

    impl Mailbox for Watcher {
        fn mailbox(&self) -> &MailboxSlot {
            &self.slot
        }

        fn receive(&self, message: &Message) {
            if let Some(added) = message.payload::<EntityAdded>() {
                self.added.lock().unwrap().push(added.name.clone());
            }
            if let Some(removed) = message.payload::<EntityRemoved>() {
                self.removed.lock().unwrap().push(removed.name.clone());
            }
        }
    }

    #[test]
    fn test_posts_added_and_removed_messages() {
        let office = PostOffice::new();
        let mut scene = Scene::new("s");
        let scene_address = office.add(scene.mailbox());
        let watcher = Arc::new(Watcher::default());
        let watcher_address = office.add(watcher.clone());
        office.subscribe(scene_address, watcher_address, MessageKind::SCENE_ADDED_ENTITY);
        office.subscribe(scene_address, watcher_address, MessageKind::SCENE_REMOVED_ENTITY);

        let mut parent = Entity::new("parent");
        parent.add_child(Entity::new("child"));
        let parent_id = parent.id();
        scene.add_entity(parent).unwrap();
        scene.remove_entity(parent_id);

        assert_eq!(*watcher.added.lock().unwrap(), vec!["parent", "child"]);
        assert_eq!(*watcher.removed.lock().unwrap(), vec!["parent", "child"]);
    }
}
