//! Message delivery
//!
//! A [`Courier`] hands a message to the receivers a dispatch resolved. Inline
//! delivery runs every `receive` on the poster's thread before `post` returns.
//! Worker delivery pushes each `(receiver, message)` parcel onto a channel
//! drained by a small pool of threads, so a slow receiver never stalls the
//! poster.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::{Mailbox, Message};

/// How a post office delivers messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Synchronously on the poster's thread
    #[default]
    Inline,
    /// Fire-and-forget on `n` background worker threads
    Workers(usize),
}

impl DeliveryMode {
    /// `Inline` for zero workers, `Workers(n)` otherwise
    pub fn from_workers(workers: usize) -> Self {
        if workers == 0 {
            Self::Inline
        } else {
            Self::Workers(workers)
        }
    }
}

struct Parcel {
    receiver: Arc<dyn Mailbox>,
    message: Message,
}

pub(crate) struct Courier {
    queue: Option<Sender<Parcel>>,
    workers: Vec<JoinHandle<()>>,
}

impl Courier {
    pub(crate) fn new(mode: DeliveryMode) -> Self {
        let count = match mode {
            DeliveryMode::Inline | DeliveryMode::Workers(0) => {
                return Self {
                    queue: None,
                    workers: Vec::new(),
                }
            }
            DeliveryMode::Workers(count) => count,
        };

        let (sender, receiver) = crossbeam_channel::unbounded::<Parcel>();
        let workers: Vec<_> = (0..count)
            .filter_map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("courier-{index}"))
                    .spawn(move || run_worker(&receiver))
                    .map_err(|e| log::error!("Failed to spawn courier worker {index}: {e}"))
                    .ok()
            })
            .collect();

        if workers.is_empty() {
            log::warn!("No courier workers could be started, delivering inline");
            return Self {
                queue: None,
                workers,
            };
        }

        log::debug!("Courier started with {} worker(s)", workers.len());
        Self {
            queue: Some(sender),
            workers,
        }
    }

    pub(crate) fn mode(&self) -> DeliveryMode {
        match self.queue {
            Some(_) => DeliveryMode::Workers(self.workers.len()),
            None => DeliveryMode::Inline,
        }
    }

    pub(crate) fn deliver(&self, receivers: Vec<Arc<dyn Mailbox>>, message: &Message) {
        match &self.queue {
            None => {
                for receiver in receivers {
                    receiver.receive(message);
                }
            }
            Some(queue) => {
                for receiver in receivers {
                    let parcel = Parcel {
                        receiver,
                        message: message.clone(),
                    };
                    if let Err(err) = queue.send(parcel) {
                        // All workers are gone; deliver the parcel here instead of losing it.
                        let parcel = err.into_inner();
                        parcel.receiver.receive(&parcel.message);
                    }
                }
            }
        }
    }
}

fn run_worker(queue: &Receiver<Parcel>) {
    for parcel in queue.iter() {
        let kind = parcel.message.kind().clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            parcel.receiver.receive(&parcel.message);
        }));
        if outcome.is_err() {
            let address = parcel.receiver.address();
            log::error!("Receiver {address:?} panicked while handling {kind}");
        }
    }
}

impl Drop for Courier {
    fn drop(&mut self) {
        self.queue.take();
        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // The last post office handle can be released by a receiver running on a worker.
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                log::error!("Courier worker exited abnormally");
            }
        }
    }
}
