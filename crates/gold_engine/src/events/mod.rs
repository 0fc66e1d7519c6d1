//! # Message Bus
//!
//! Subsystems (window, physics, scenes, input) talk to each other through a
//! [`PostOffice`] instead of holding references to one another.
//!
//! ## Key ideas
//!
//! - Every participant implements [`Mailbox`] and gets an [`Address`] when it is
//!   added to a post office.
//! - A receiver subscribes to `(sender, kind)`; a post from the sender with that
//!   kind reaches every such receiver. Subscriptions are one-way.
//! - [`PostOffice::broadcast`] reaches every participant regardless of
//!   subscriptions, and is used for global events like scene changes.
//! - Operations on unknown addresses are silent no-ops.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub mod courier;
pub mod mailbox;
pub mod post_office;

pub use courier::DeliveryMode;
pub use mailbox::{Mailbox, MailboxSlot};
pub use post_office::PostOffice;

/// Bus-assigned participant identifier
///
/// Addresses increase monotonically and are never reused by the post office
/// that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Message kind tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKind(Cow<'static, str>);

impl MessageKind {
    /// A scene finished loading; payload is the [`crate::scene::SharedScene`]
    pub const SCENE_LOADED: Self = Self::from_static("SceneLoaded");
    /// The current scene changed; payload is the new [`crate::scene::SharedScene`]
    pub const SCENE_CHANGED: Self = Self::from_static("SceneChanged");
    /// An entity joined a scene; payload is [`crate::scene::EntityAdded`]
    pub const SCENE_ADDED_ENTITY: Self = Self::from_static("SceneAddedEntity");
    /// An entity left a scene; payload is [`crate::scene::EntityRemoved`]
    pub const SCENE_REMOVED_ENTITY: Self = Self::from_static("SceneRemovedEntity");
    /// A key went down; payload is [`crate::input::KeyCode`]
    pub const KEY_PRESSED: Self = Self::from_static("KeyPressed");
    /// A key went up; payload is [`crate::input::KeyCode`]
    pub const KEY_RELEASED: Self = Self::from_static("KeyReleased");

    /// Kind from a static string
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Kind from an owned string
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Kind name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for MessageKind {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

/// Shared, untyped message payload
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Immutable `(kind, payload)` pair
///
/// Cloning a message shares its payload; receivers only ever see it by reference.
#[derive(Clone)]
pub struct Message {
    kind: MessageKind,
    payload: Option<Payload>,
}

impl Message {
    /// Message without a payload
    pub fn new(kind: MessageKind) -> Self {
        Self { kind, payload: None }
    }

    /// Message carrying `value`
    pub fn with_payload<T: Any + Send + Sync>(kind: MessageKind, value: T) -> Self {
        Self {
            kind,
            payload: Some(Arc::new(value)),
        }
    }

    /// Message kind
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Check the kind
    pub fn is(&self, kind: &MessageKind) -> bool {
        &self.kind == kind
    }

    /// Borrow the payload as `T`, or `None` when absent or of another type
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }

    /// Whether a payload is attached
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("kind", &self.kind)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}
