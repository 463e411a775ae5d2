use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::model::StatusChanged;

type Listener = Rc<dyn Fn(StatusChanged)>;

/// Process-wide publish point for coarse play/stop status
///
/// Delivery is fire-and-forget: every listener registered at publish time is
/// called once, in registration order. Listeners are owned by the
/// [`StatusSubscription`] returned from [`subscribe`](Self::subscribe) and are
/// removed when that guard is dropped.
#[derive(Default)]
pub struct StatusBroadcast {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    last: Cell<Option<StatusChanged>>,
}

impl StatusBroadcast {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn subscribe<F>(self: &Rc<Self>, listener: F) -> StatusSubscription
    where
        F: Fn(StatusChanged) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));

        log::debug!("Status listener {} subscribed", id);

        StatusSubscription {
            channel: Rc::downgrade(self),
            id,
        }
    }

    pub fn publish(&self, status: StatusChanged) {
        self.last.set(Some(status));

        // Listeners may subscribe or unsubscribe while being notified
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        log::debug!(
            "Publishing isPlaying={} to {} listener(s)",
            status.is_playing,
            listeners.len()
        );

        for listener in listeners {
            listener(status);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Most recent status published, if any
    pub fn last(&self) -> Option<StatusChanged> {
        self.last.get()
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
        log::debug!("Status listener {} unsubscribed", id);
    }
}

/// Registration guard; dropping it unsubscribes the listener
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct StatusSubscription {
    channel: Weak<StatusBroadcast>,
    id: u64,
}

impl StatusSubscription {
    /// Unsubscribe now rather than at drop
    pub fn cancel(self) {}
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.unsubscribe(self.id);
        }
    }
}
