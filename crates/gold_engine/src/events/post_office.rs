//! Post office
//!
//! The routing table of the message bus. All tables sit behind one
//! reader/writer lock: dispatch and lookups share it, registration and
//! subscription changes take it exclusively. Receivers are resolved under the
//! read lock and the lock is released before any `receive` runs, so a receiver
//! may subscribe, post or detach from inside `receive`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use super::courier::{Courier, DeliveryMode};
use super::{Address, Mailbox, Message, MessageKind};
use crate::foundation::sync;

#[derive(Default)]
struct Tables {
    participants: BTreeMap<Address, Arc<dyn Mailbox>>,
    /// sender -> kind -> receivers
    penpals: HashMap<Address, HashMap<MessageKind, BTreeSet<Address>>>,
}

pub(crate) struct OfficeShared {
    tables: RwLock<Tables>,
    next_address: AtomicU64,
    courier: Courier,
}

/// Handle to a message bus
///
/// Cloning the handle shares the bus.
#[derive(Clone)]
pub struct PostOffice {
    shared: Arc<OfficeShared>,
}

impl Default for PostOffice {
    fn default() -> Self {
        Self::new()
    }
}

impl PostOffice {
    /// Bus with inline delivery
    pub fn new() -> Self {
        Self::with_delivery(DeliveryMode::Inline)
    }

    /// Bus with the given delivery mode
    pub fn with_delivery(mode: DeliveryMode) -> Self {
        Self {
            shared: Arc::new(OfficeShared {
                tables: RwLock::new(Tables::default()),
                next_address: AtomicU64::new(1),
                courier: Courier::new(mode),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<OfficeShared>) -> Self {
        Self { shared }
    }

    pub(crate) fn downgrade(&self) -> Weak<OfficeShared> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn is_shared(&self, other: &Weak<OfficeShared>) -> bool {
        std::ptr::eq(Arc::as_ptr(&self.shared), other.as_ptr())
    }

    /// Delivery mode in effect
    pub fn delivery(&self) -> DeliveryMode {
        self.shared.courier.mode()
    }

    /// Whether two handles point at the same bus
    pub fn same_office(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Register a participant and return its fresh address
    ///
    /// A participant already on another bus is removed from it first, severing
    /// its old subscriptions. Adding a participant that is already on this bus
    /// returns its current address. The membership check, the insert and the
    /// binding happen under one write lock, so concurrent adds of the same
    /// participant agree on a single address.
    pub fn add(&self, participant: Arc<dyn Mailbox>) -> Address {
        loop {
            if let Some((office, address)) = participant.mailbox().binding() {
                if !self.same_office(&office) {
                    office.remove(address);
                }
            }

            let mut tables = sync::write(&self.shared.tables);
            if let Some((office, address)) = participant.mailbox().binding() {
                if !self.same_office(&office) {
                    // Joined another bus since the removal above; leave it first.
                    drop(tables);
                    continue;
                }
                if tables.participants.contains_key(&address) {
                    return address;
                }
            }

            let address = Address::new(self.shared.next_address.fetch_add(1, Ordering::Relaxed));
            tables.participants.insert(address, Arc::clone(&participant));
            tables.penpals.insert(address, HashMap::new());
            participant.mailbox().bind(self, address);
            drop(tables);
            log::debug!("Post office registered participant {address}");
            return address;
        }
    }

    /// Remove a participant and every subscription to or from it
    ///
    /// Unknown addresses are ignored.
    pub fn remove(&self, address: Address) {
        let participant = {
            let mut tables = sync::write(&self.shared.tables);
            let Some(participant) = tables.participants.remove(&address) else {
                log::trace!("Ignoring removal of unknown participant {address}");
                return;
            };
            tables.penpals.remove(&address);
            for kinds in tables.penpals.values_mut() {
                for receivers in kinds.values_mut() {
                    receivers.remove(&address);
                }
                kinds.retain(|_, receivers| !receivers.is_empty());
            }
            participant
        };
        participant.mailbox().unbind(self, address);
        log::debug!("Post office removed participant {address}");
    }

    /// Subscribe `receiver` to `sender`'s messages of `kind`
    ///
    /// Returns whether the subscription exists afterwards; `false` means one of
    /// the addresses is unknown. Subscribing twice has no further effect.
    pub fn subscribe(&self, sender: Address, receiver: Address, kind: MessageKind) -> bool {
        let mut tables = sync::write(&self.shared.tables);
        if !tables.participants.contains_key(&receiver) {
            log::debug!("Ignoring subscription of unknown receiver {receiver} to {sender}");
            return false;
        }
        let Some(kinds) = tables.penpals.get_mut(&sender) else {
            log::debug!("Ignoring subscription of {receiver} to unknown sender {sender}");
            return false;
        };
        kinds.entry(kind).or_default().insert(receiver);
        true
    }

    /// Remove a subscription if present
    pub fn unsubscribe(&self, sender: Address, receiver: Address, kind: &MessageKind) {
        let mut tables = sync::write(&self.shared.tables);
        if let Some(kinds) = tables.penpals.get_mut(&sender) {
            if let Some(receivers) = kinds.get_mut(kind) {
                receivers.remove(&receiver);
                if receivers.is_empty() {
                    kinds.remove(kind);
                }
            }
        }
    }

    /// Check a subscription
    pub fn is_subscribed(&self, sender: Address, receiver: Address, kind: &MessageKind) -> bool {
        let tables = sync::read(&self.shared.tables);
        tables
            .penpals
            .get(&sender)
            .and_then(|kinds| kinds.get(kind))
            .is_some_and(|receivers| receivers.contains(&receiver))
    }

    /// Receivers currently subscribed to `(sender, kind)`, in address order
    pub fn listeners(&self, sender: Address, kind: &MessageKind) -> Vec<Address> {
        let tables = sync::read(&self.shared.tables);
        tables
            .penpals
            .get(&sender)
            .and_then(|kinds| kinds.get(kind))
            .map(|receivers| receivers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Deliver `message` to every receiver subscribed to `(sender, message.kind())`
    pub fn dispatch(&self, sender: Address, message: &Message) {
        let receivers: Vec<Arc<dyn Mailbox>> = {
            let tables = sync::read(&self.shared.tables);
            let Some(addresses) = tables
                .penpals
                .get(&sender)
                .and_then(|kinds| kinds.get(message.kind()))
            else {
                log::trace!("No listeners for {} from {sender}", message.kind());
                return;
            };
            addresses
                .iter()
                .filter_map(|address| tables.participants.get(address).cloned())
                .collect()
        };
        log::trace!(
            "Dispatching {} from {sender} to {} receiver(s)",
            message.kind(),
            receivers.len()
        );
        self.shared.courier.deliver(receivers, message);
    }

    /// Deliver `message` to every registered participant
    pub fn broadcast(&self, message: &Message) {
        let receivers: Vec<Arc<dyn Mailbox>> = {
            let tables = sync::read(&self.shared.tables);
            tables.participants.values().cloned().collect()
        };
        log::trace!("Broadcasting {} to {} participant(s)", message.kind(), receivers.len());
        self.shared.courier.deliver(receivers, message);
    }

    /// Whether `address` is registered
    pub fn contains(&self, address: Address) -> bool {
        sync::read(&self.shared.tables).participants.contains_key(&address)
    }

    /// Number of registered participants
    pub fn len(&self) -> usize {
        sync::read(&self.shared.tables).participants.len()
    }

    /// Whether no participant is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PostOffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostOffice")
            .field("participants", &self.len())
            .field("delivery", &self.delivery())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Barrier, Mutex};
    use std::time::Duration;

    use crossbeam_channel::Sender;

    use super::*;
    use crate::events::MailboxSlot;

    const PING: MessageKind = MessageKind::from_static("Ping");
    const PONG: MessageKind = MessageKind::from_static("Pong");

    #[derive(Default)]
    struct Recorder {
        slot: MailboxSlot,
        seen: Mutex<Vec<MessageKind>>,
    }

    impl Recorder {
        fn seen(&self) -> Vec<MessageKind> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Mailbox for Recorder {
        fn mailbox(&self) -> &MailboxSlot {
            &self.slot
        }

        fn receive(&self, message: &Message) {
            self.seen.lock().unwrap().push(message.kind().clone());
        }
    }

    fn recorder() -> Arc<Recorder> {
        Arc::new(Recorder::default())
    }

    #[test]
    fn test_addresses_are_unique_and_increasing() {
        let office = PostOffice::new();
        let a = office.add(recorder());
        let b = office.add(recorder());
        assert!(b > a);
        assert_eq!(office.len(), 2);
    }

    #[test]
    fn test_dispatch_is_scoped_to_kind() {
        let office = PostOffice::new();
        let sender = recorder();
        let receiver = recorder();
        let a = office.add(sender.clone());
        let b = office.add(receiver.clone());

        assert!(office.subscribe(a, b, PING));
        sender.post(Message::new(PING));
        sender.post(Message::new(PONG));

        assert_eq!(receiver.seen(), vec![PING]);
        assert!(sender.seen().is_empty());
    }

    #[test]
    fn test_subscriptions_are_one_way() {
        let office = PostOffice::new();
        let first = recorder();
        let second = recorder();
        let a = office.add(first.clone());
        let b = office.add(second.clone());
        office.subscribe(a, b, PING);

        second.post(Message::new(PING));
        assert!(first.seen().is_empty());
        assert!(!office.is_subscribed(b, a, &PING));
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let office = PostOffice::new();
        let a = office.add(recorder());
        let receiver = recorder();
        let b = office.add(receiver.clone());

        office.subscribe(a, b, PING);
        office.subscribe(a, b, PING);
        assert_eq!(office.listeners(a, &PING), vec![b]);

        office.dispatch(a, &Message::new(PING));
        assert_eq!(receiver.seen().len(), 1);
    }

    #[test]
    fn test_unknown_addresses_are_no_ops() {
        let office = PostOffice::new();
        let a = office.add(recorder());
        let ghost = Address::new(999);

        assert!(!office.subscribe(ghost, a, PING));
        assert!(!office.subscribe(a, ghost, PING));
        office.unsubscribe(a, ghost, &PING);
        office.remove(ghost);
        office.dispatch(ghost, &Message::new(PING));
        assert_eq!(office.len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let office = PostOffice::new();
        let a = office.add(recorder());
        let b = office.add(recorder());
        office.subscribe(a, b, PING);
        office.unsubscribe(a, b, &PING);
        office.unsubscribe(a, b, &PING);
        assert!(!office.is_subscribed(a, b, &PING));
        assert!(office.listeners(a, &PING).is_empty());
    }

    #[test]
    fn test_remove_purges_both_directions() {
        let office = PostOffice::new();
        let first = recorder();
        let second = recorder();
        let a = office.add(first.clone());
        let b = office.add(second.clone());
        office.subscribe(a, b, PING);
        office.subscribe(b, a, PING);

        second.detach();
        assert!(!office.contains(b));
        assert!(second.address().is_none());
        assert!(office.listeners(a, &PING).is_empty());
        assert!(!office.is_subscribed(b, a, &PING));

        // Posting from a detached participant goes nowhere.
        second.post(Message::new(PING));
        assert!(first.seen().is_empty());
    }

    #[test]
    fn test_broadcast_reaches_registered_participants_once() {
        let office = PostOffice::new();
        let kept = recorder();
        let dropped = recorder();
        office.add(kept.clone());
        let gone = office.add(dropped.clone());
        office.remove(gone);

        office.broadcast(&Message::new(MessageKind::SCENE_LOADED));
        assert_eq!(kept.seen(), vec![MessageKind::SCENE_LOADED]);
        assert!(dropped.seen().is_empty());
    }

    #[test]
    fn test_readding_to_another_bus_severs_old_subscriptions() {
        let first = PostOffice::new();
        let second = PostOffice::new();
        let sender = recorder();
        let mover = recorder();
        let a = first.add(sender.clone());
        let old = first.add(mover.clone());
        first.subscribe(a, old, PING);

        let new = second.add(mover.clone());
        assert!(!first.contains(old));
        assert!(first.listeners(a, &PING).is_empty());
        assert_eq!(mover.address(), Some(new));
        assert!(mover.post_office().unwrap().same_office(&second));
    }

    #[test]
    fn test_readding_to_same_bus_keeps_address() {
        let office = PostOffice::new();
        let participant = recorder();
        let a = office.add(participant.clone());
        assert_eq!(office.add(participant), a);
        assert_eq!(office.len(), 1);
    }

    #[test]
    fn test_concurrent_add_yields_one_address() {
        for _ in 0..200 {
            let office = PostOffice::new();
            let participant = recorder();
            let barrier = Arc::new(Barrier::new(4));
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let office = office.clone();
                    let participant = participant.clone();
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        office.add(participant)
                    })
                })
                .collect();
            let addresses: BTreeSet<Address> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(office.len(), 1);
            assert_eq!(addresses.len(), 1);
            assert_eq!(participant.address(), addresses.into_iter().next());
        }
    }

    struct Relay {
        slot: MailboxSlot,
        to: Sender<MessageKind>,
    }

    impl Mailbox for Relay {
        fn mailbox(&self) -> &MailboxSlot {
            &self.slot
        }

        fn receive(&self, message: &Message) {
            if message.is(&PONG) {
                panic!("relay refuses pongs");
            }
            let _ = self.to.send(message.kind().clone());
        }
    }

    #[test]
    fn test_worker_delivery_survives_panicking_receiver() {
        let office = PostOffice::with_delivery(DeliveryMode::Workers(2));
        assert_eq!(office.delivery(), DeliveryMode::Workers(2));
        let (tx, rx) = crossbeam_channel::unbounded();
        let relay = Arc::new(Relay {
            slot: MailboxSlot::new(),
            to: tx,
        });
        let sender = recorder();
        let a = office.add(sender.clone());
        let b = office.add(relay);
        office.subscribe(a, b, PING);
        office.subscribe(a, b, PONG);

        sender.post(Message::new(PONG));
        sender.post(Message::new(PING));
        let got = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got, PING);
    }

    struct Subscriber {
        slot: MailboxSlot,
        target: Mutex<Option<Address>>,
    }

    impl Mailbox for Subscriber {
        fn mailbox(&self) -> &MailboxSlot {
            &self.slot
        }

        fn receive(&self, message: &Message) {
            let target = *self.target.lock().unwrap();
            if let (Some(target), Some(office), Some(me)) =
                (target, self.post_office(), self.address())
            {
                office.subscribe(target, me, message.kind().clone());
            }
        }
    }

    #[test]
    fn test_receiver_may_subscribe_during_delivery() {
        let office = PostOffice::new();
        let sender = recorder();
        let a = office.add(sender.clone());
        let subscriber = Arc::new(Subscriber {
            slot: MailboxSlot::new(),
            target: Mutex::new(Some(a)),
        });
        let b = office.add(subscriber);

        office.broadcast(&Message::new(PING));
        assert!(office.is_subscribed(a, b, &PING));
    }
}
