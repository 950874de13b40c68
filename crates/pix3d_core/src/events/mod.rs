//! Subscriber lists for session change notifications
//!
//! Key principles:
//! - Registration returns a [`Subscription`] handle used to unsubscribe
//! - Delivery is synchronous, in registration order, to every current listener
//! - No queuing and no coalescing: one notification per change

/// Which notification stream a subscription belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Scene installed, replaced or structurally changed
    Scene,
    /// Selection changed or forced refresh
    Selection,
    /// A node transform was edited in place
    Transform,
}

/// Handle returned by a `subscribe_*` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    /// Stream the listener was registered on
    pub kind: ListenerKind,
    id: u64,
}

impl Subscription {
    /// Listener id within its stream
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Ordered list of boxed listeners of one stream
pub struct Subscribers<L: ?Sized> {
    kind: ListenerKind,
    next_id: u64,
    entries: Vec<(u64, Box<L>)>,
}

impl<L: ?Sized> Subscribers<L> {
    /// Create an empty list for a stream
    pub fn new(kind: ListenerKind) -> Self {
        Self {
            kind,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register a listener at the end of the delivery order
    pub fn subscribe(&mut self, listener: Box<L>) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        Subscription { kind: self.kind, id }
    }

    /// Remove a listener; returns false when the handle is stale or belongs to another stream
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        if subscription.kind != self.kind {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != subscription.id);
        before != self.entries.len()
    }

    /// Deliver to every listener in registration order
    pub fn notify(&mut self, mut deliver: impl FnMut(&mut L)) {
        for (_, listener) in &mut self.entries {
            deliver(listener.as_mut());
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Listener = dyn FnMut(u32);

    #[test]
    fn test_delivery_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers: Subscribers<Listener> = Subscribers::new(ListenerKind::Scene);

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            subscribers.subscribe(Box::new(move |value| log.borrow_mut().push((tag, value))));
        }
        subscribers.notify(|listener| listener(7));

        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7), ("c", 7)]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers: Subscribers<Listener> = Subscribers::new(ListenerKind::Selection);
        let counter = Rc::clone(&count);
        let handle = subscribers.subscribe(Box::new(move |_| *counter.borrow_mut() += 1));

        subscribers.notify(|listener| listener(0));
        assert!(subscribers.unsubscribe(handle));
        subscribers.notify(|listener| listener(0));

        assert_eq!(*count.borrow(), 1);
        assert!(subscribers.is_empty());
        assert!(!subscribers.unsubscribe(handle));
    }

    #[test]
    fn test_handle_from_other_stream_is_rejected() {
        let mut scene: Subscribers<Listener> = Subscribers::new(ListenerKind::Scene);
        let mut transform: Subscribers<Listener> = Subscribers::new(ListenerKind::Transform);
        let handle = scene.subscribe(Box::new(|_| {}));
        transform.subscribe(Box::new(|_| {}));

        assert!(!transform.unsubscribe(handle));
        assert_eq!(transform.len(), 1);
    }
}
