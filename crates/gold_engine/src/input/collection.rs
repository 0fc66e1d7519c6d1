//! Input collection participant

use std::sync::RwLock;

use super::{KeyCode, KeyboardSet};
use crate::events::{Mailbox, MailboxSlot, Message, MessageKind};
use crate::foundation::sync;
use crate::scene::EntityRemoved;

/// Routes key messages to every installed [`KeyboardSet`]
///
/// A `SceneRemovedEntity` message uninstalls the removed entity's set.
#[derive(Debug, Default)]
pub struct InputCollection {
    slot: MailboxSlot,
    sets: RwLock<Vec<KeyboardSet>>,
}

impl InputCollection {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a keyboard set; installing the same set twice has no effect
    pub fn install(&self, set: KeyboardSet) {
        let mut sets = sync::write(&self.sets);
        if !sets.iter().any(|s| s.id() == set.id()) {
            log::debug!("Installed keyboard set {}", set.id());
            sets.push(set);
        }
    }

    /// Remove a keyboard set by id
    pub fn uninstall(&self, set_id: u64) {
        sync::write(&self.sets).retain(|s| s.id() != set_id);
    }

    /// Number of installed sets
    pub fn len(&self) -> usize {
        sync::read(&self.sets).len()
    }

    /// Whether no set is installed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sets(&self) -> Vec<KeyboardSet> {
        sync::read(&self.sets).clone()
    }
}

impl Mailbox for InputCollection {
    fn mailbox(&self) -> &MailboxSlot {
        &self.slot
    }

    fn receive(&self, message: &Message) {
        if message.is(&MessageKind::SCENE_REMOVED_ENTITY) {
            if let Some(removed) = message.payload::<EntityRemoved>() {
                log::debug!("Uninstalling keyboard set of removed entity '{}'", removed.name);
                self.uninstall(removed.keyboard);
            }
            return;
        }
        let Some(&key) = message.payload::<KeyCode>() else {
            return;
        };
        if message.is(&MessageKind::KEY_PRESSED) {
            for set in self.sets() {
                set.key_pressed(key);
            }
        } else if message.is(&MessageKind::KEY_RELEASED) {
            for set in self.sets() {
                set.key_released(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::ecs::{Component, ComponentBase, Entity, EntityCore};
    use crate::events::PostOffice;
    use crate::input::KeyHandler;
    use crate::scene::Scene;

    #[test]
    fn test_routes_key_messages_to_installed_sets() {
        let presses = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(KeyHandler::new());
        let counter = Arc::clone(&presses);
        handler.on_pressed(KeyCode::Space, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let set = KeyboardSet::new();
        set.add_handler(handler);

        let collection = InputCollection::new();
        collection.install(set.clone());
        collection.install(set.clone());
        assert_eq!(collection.len(), 1);

        collection.receive(&Message::with_payload(MessageKind::KEY_PRESSED, KeyCode::Space));
        collection.receive(&Message::with_payload(MessageKind::KEY_RELEASED, KeyCode::Space));
        collection.receive(&Message::new(MessageKind::KEY_PRESSED));
        assert_eq!(presses.load(Ordering::SeqCst), 1);

        collection.uninstall(set.id());
        collection.receive(&Message::with_payload(MessageKind::KEY_PRESSED, KeyCode::Space));
        assert_eq!(presses.load(Ordering::SeqCst), 1);
    }

    struct Steering {
        base: ComponentBase,
        presses: Arc<AtomicUsize>,
    }

    impl Component for Steering {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }

        fn awake(&mut self, entity: &mut EntityCore) {
            let handler = Arc::new(KeyHandler::new());
            let counter = Arc::clone(&self.presses);
            handler.on_pressed(KeyCode::Up, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            entity.keyboard().add_handler(handler);
        }
    }

    #[test]
    fn test_removed_entity_stops_receiving_keys() {
        let presses = Arc::new(AtomicUsize::new(0));
        let paddle = Entity::new("paddle").with_component(Steering {
            base: ComponentBase::new(),
            presses: Arc::clone(&presses),
        });
        let paddle_id = paddle.id();
        let mut scene = Scene::new("main");
        scene.add_entity(paddle).unwrap();

        let office = PostOffice::new();
        let collection = Arc::new(InputCollection::new());
        let scene_address = office.add(scene.mailbox());
        let input_address = office.add(collection.clone());
        office.subscribe(scene_address, input_address, MessageKind::SCENE_REMOVED_ENTITY);

        scene.start();
        scene.awake();
        let set = scene.entity(paddle_id).unwrap().core().keyboard().clone();
        assert_eq!(set.len(), 1);
        collection.install(set);
        collection.receive(&Message::with_payload(MessageKind::KEY_PRESSED, KeyCode::Up));
        assert_eq!(presses.load(Ordering::SeqCst), 1);

        assert_eq!(scene.remove_entity(paddle_id), 1);
        assert_eq!(collection.len(), 0);
        collection.receive(&Message::with_payload(MessageKind::KEY_PRESSED, KeyCode::Up));
        assert_eq!(presses.load(Ordering::SeqCst), 1);
    }
}
