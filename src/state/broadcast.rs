//! Snapshot fan-out to subscribers.
//!
//! Each subscriber owns an unbounded channel receiver. Publishing never runs
//! subscriber code, so it is safe to call while the provider holds its state
//! borrow. Snapshots are shared as `Arc` and cannot be mutated by receivers.

#[cfg(test)]
#[path = "broadcast_test.rs"]
mod broadcast_test;

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use super::auth::AuthSnapshot;

#[derive(Default)]
struct Registry {
    next_id: u64,
    last_published: Option<u64>,
    senders: Vec<(u64, UnboundedSender<Arc<AuthSnapshot>>)>,
}

/// Publisher side, owned by the provider.
#[derive(Default)]
pub(crate) struct SnapshotBroadcast {
    registry: Rc<RefCell<Registry>>,
}

impl SnapshotBroadcast {
    pub(crate) fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = unbounded();
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.senders.push((id, tx));
        AuthSubscription { id, receiver: rx, registry: Rc::downgrade(&self.registry) }
    }

    /// Deliver `snapshot` to every live subscriber.
    ///
    /// A snapshot whose revision is not newer than the last one published is
    /// dropped, so receivers only ever see increasing revisions.
    pub(crate) fn publish(&self, snapshot: &Arc<AuthSnapshot>) {
        let mut registry = self.registry.borrow_mut();
        if registry.last_published.is_some_and(|last| snapshot.revision <= last) {
            log::debug!("auth: skipping publish of stale revision {}", snapshot.revision);
            return;
        }
        registry.last_published = Some(snapshot.revision);
        registry.senders.retain(|(_, tx)| tx.unbounded_send(Arc::clone(snapshot)).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.registry.borrow().senders.len()
    }
}

/// Stream of published snapshots. Dropping it unsubscribes.
pub struct AuthSubscription {
    id: u64,
    receiver: UnboundedReceiver<Arc<AuthSnapshot>>,
    registry: Weak<RefCell<Registry>>,
}

impl AuthSubscription {
    /// Explicit unsubscribe; same as dropping.
    pub fn unsubscribe(self) {}
}

impl Stream for AuthSubscription {
    type Item = Arc<AuthSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // A busy registry is only possible mid-publish; the closed channel is
        // pruned on the next publish instead.
        if let Ok(mut registry) = registry.try_borrow_mut() {
            registry.senders.retain(|(id, _)| *id != self.id);
        }
    }
}
