//! Key handlers and keyboard sets

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::KeyCode;
use crate::foundation::sync;

/// Command run when a key changes state
pub type KeyCommand = Arc<dyn Fn() + Send + Sync>;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SET_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default, Clone)]
struct KeyCommands {
    pressed: Option<KeyCommand>,
    released: Option<KeyCommand>,
}

/// Maps keys to pressed/released commands
pub struct KeyHandler {
    id: u64,
    commands: RwLock<HashMap<KeyCode, KeyCommands>>,
}

impl Default for KeyHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHandler {
    /// Handler with no commands and a fresh id
    pub fn new() -> Self {
        Self {
            id: NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed),
            commands: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide unique handler id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run `command` whenever `key` goes down, replacing any previous one
    pub fn on_pressed(&self, key: KeyCode, command: impl Fn() + Send + Sync + 'static) {
        sync::write(&self.commands).entry(key).or_default().pressed = Some(Arc::new(command));
    }

    /// Run `command` whenever `key` goes up, replacing any previous one
    pub fn on_released(&self, key: KeyCode, command: impl Fn() + Send + Sync + 'static) {
        sync::write(&self.commands).entry(key).or_default().released = Some(Arc::new(command));
    }

    /// Run the pressed command for `key`; returns whether one ran
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        let command = sync::read(&self.commands).get(&key).and_then(|c| c.pressed.clone());
        command.map(|command| command()).is_some()
    }

    /// Run the released command for `key`; returns whether one ran
    pub fn key_released(&self, key: KeyCode) -> bool {
        let command = sync::read(&self.commands).get(&key).and_then(|c| c.released.clone());
        command.map(|command| command()).is_some()
    }
}

impl std::fmt::Debug for KeyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<KeyCode> = sync::read(&self.commands).keys().copied().collect();
        keys.sort();
        f.debug_struct("KeyHandler").field("id", &self.id).field("keys", &keys).finish()
    }
}

/// Shared set of key handlers owned by an entity
///
/// Clones share the same handlers, so the copy installed in an
/// [`super::InputCollection`] sees handlers added later by components.
#[derive(Clone)]
pub struct KeyboardSet {
    id: u64,
    handlers: Arc<RwLock<Vec<Arc<KeyHandler>>>>,
}

impl Default for KeyboardSet {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardSet {
    /// Empty set with a fresh id
    pub fn new() -> Self {
        Self {
            id: NEXT_SET_ID.fetch_add(1, Ordering::Relaxed),
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Process-wide unique set id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Add a handler; adding the same handler twice has no effect
    pub fn add_handler(&self, handler: Arc<KeyHandler>) {
        let mut handlers = sync::write(&self.handlers);
        if !handlers.iter().any(|h| h.id() == handler.id()) {
            handlers.push(handler);
        }
    }

    /// Remove a handler by id
    pub fn remove_handler(&self, handler_id: u64) {
        sync::write(&self.handlers).retain(|h| h.id() != handler_id);
    }

    /// Remove every handler
    pub fn clear(&self) {
        sync::write(&self.handlers).clear();
    }

    /// Number of installed handlers
    pub fn len(&self) -> usize {
        sync::read(&self.handlers).len()
    }

    /// Whether no handler is installed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forward a key press to every handler
    pub fn key_pressed(&self, key: KeyCode) {
        for handler in self.snapshot() {
            handler.key_pressed(key);
        }
    }

    /// Forward a key release to every handler
    pub fn key_released(&self, key: KeyCode) {
        for handler in self.snapshot() {
            handler.key_released(key);
        }
    }

    fn snapshot(&self) -> Vec<Arc<KeyHandler>> {
        sync::read(&self.handlers).clone()
    }
}

impl std::fmt::Debug for KeyboardSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardSet")
            .field("id", &self.id)
            .field("handlers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicI32;

    use super::*;

    #[test]
    fn test_handler_runs_matching_command() {
        let direction = Arc::new(AtomicI32::new(0));
        let handler = KeyHandler::new();
        let up = Arc::clone(&direction);
        handler.on_pressed(KeyCode::Up, move || up.store(-1, Ordering::SeqCst));
        let stop = Arc::clone(&direction);
        handler.on_released(KeyCode::Up, move || stop.store(0, Ordering::SeqCst));

        assert!(handler.key_pressed(KeyCode::Up));
        assert_eq!(direction.load(Ordering::SeqCst), -1);
        assert!(!handler.key_pressed(KeyCode::Down));
        assert!(handler.key_released(KeyCode::Up));
        assert_eq!(direction.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_clones_share_handlers() {
        let set = KeyboardSet::new();
        let installed = set.clone();
        let handler = Arc::new(KeyHandler::new());
        set.add_handler(Arc::clone(&handler));
        set.add_handler(Arc::clone(&handler));
        assert_eq!(installed.len(), 1);
        assert_eq!(installed.id(), set.id());

        set.remove_handler(handler.id());
        assert!(installed.is_empty());
    }
}
