//! Mailbox capability
//!
//! A participant embeds a [`MailboxSlot`] and implements [`Mailbox::mailbox`];
//! posting, address lookup and detaching come for free.
//!
//! ```rust
//! use gold_engine::events::{Mailbox, MailboxSlot, Message};
//!
//! #[derive(Default)]
//! struct Scoreboard {
//!     slot: MailboxSlot,
//! }
//!
//! impl Mailbox for Scoreboard {
//!     fn mailbox(&self) -> &MailboxSlot {
//!         &self.slot
//!     }
//!
//!     fn receive(&self, message: &Message) {
//!         log::info!("scoreboard got {}", message.kind());
//!     }
//! }
//! ```

use std::sync::{RwLock, Weak};

use super::post_office::{OfficeShared, PostOffice};
use super::{Address, Message};
use crate::foundation::sync;

/// A participant on the message bus
///
/// `receive` may run on a courier worker thread, concurrently with the
/// participant's other methods, so implementors serialize their own state.
pub trait Mailbox: Send + Sync + 'static {
    /// The binding slot embedded in the participant
    fn mailbox(&self) -> &MailboxSlot;

    /// Handle a delivered message
    fn receive(&self, _message: &Message) {}

    /// Dispatch `message` to everyone subscribed to this participant for its kind
    ///
    /// Posting from a participant that is not on a bus is a no-op.
    fn post(&self, message: Message) {
        self.mailbox().post(message);
    }

    /// Address on the current bus
    fn address(&self) -> Option<Address> {
        self.mailbox().address()
    }

    /// The bus this participant is on
    fn post_office(&self) -> Option<PostOffice> {
        self.mailbox().post_office()
    }

    /// Leave the bus, dropping every subscription to and from this participant
    fn detach(&self) {
        if let Some((office, address)) = self.mailbox().binding() {
            office.remove(address);
        }
    }
}

struct Binding {
    office: Weak<OfficeShared>,
    address: Address,
}

/// Per-participant link to a post office
///
/// The slot holds a weak reference, so a participant never keeps its bus alive.
#[derive(Default)]
pub struct MailboxSlot {
    binding: RwLock<Option<Binding>>,
}

impl MailboxSlot {
    /// Unbound slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Current address, if bound to a live bus
    pub fn address(&self) -> Option<Address> {
        self.binding().map(|(_, address)| address)
    }

    /// Current bus, if still alive
    pub fn post_office(&self) -> Option<PostOffice> {
        self.binding().map(|(office, _)| office)
    }

    /// Whether the slot is bound to a live bus
    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }

    /// Dispatch from this slot's address
    pub fn post(&self, message: Message) {
        match self.binding() {
            Some((office, address)) => office.dispatch(address, &message),
            None => log::trace!("Dropping {} posted by an unbound mailbox", message.kind()),
        }
    }

    pub(crate) fn binding(&self) -> Option<(PostOffice, Address)> {
        let guard = sync::read(&self.binding);
        let binding = guard.as_ref()?;
        let office = PostOffice::from_shared(binding.office.upgrade()?);
        Some((office, binding.address))
    }

    pub(crate) fn bind(&self, office: &PostOffice, address: Address) {
        *sync::write(&self.binding) = Some(Binding {
            office: office.downgrade(),
            address,
        });
    }

    /// Clear the binding if it still points at `office`/`address`
    pub(crate) fn unbind(&self, office: &PostOffice, address: Address) {
        let mut guard = sync::write(&self.binding);
        let matches = guard
            .as_ref()
            .is_some_and(|b| b.address == address && office.is_shared(&b.office));
        if matches {
            *guard = None;
        }
    }
}

impl std::fmt::Debug for MailboxSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxSlot")
            .field("address", &self.address())
            .finish()
    }
}
