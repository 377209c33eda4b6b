//! # Change Notification
//!
//! Synchronous publish/subscribe channel attached to every mutable entity.
//!
//! A mutating call compares old and new value; only an actual change is
//! published, and the publish completes before the mutating call returns.
//! Delivery iterates a snapshot of the subscriber list, so an observer
//! removing itself (or others) mid-notification cannot corrupt delivery.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::identity::Identity;
use crate::core::scalar::Scalar;

/// What happened to the changed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    /// Not published by the graph itself; external notification sources
    /// use it for events outside the add/modify/delete vocabulary.
    Other,
}

/// Which part of the sender changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Changed {
    Id,
    Caption,
    Description,
    Component,
    Definition,
    /// The whole value container was replaced.
    Values,
    /// A single coordinate was written; carries the new value.
    Value(Scalar),
    Provider,
    Consumers,
    AdaptedOutputs,
    Adaptee,
    ArgumentValue(Scalar),
    ArgumentDefault(Scalar),
    PossibleValues,
    Status,
}

/// Notification delivered to observers of a mutable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub sender: Identity,
    pub changed: Changed,
    pub kind: ChangeKind,
    pub message: Option<String>,
}

impl Notification {
    pub fn added(sender: &Identity, changed: Changed) -> Self {
        Self::with_kind(sender, changed, ChangeKind::Added)
    }

    pub fn modified(sender: &Identity, changed: Changed) -> Self {
        Self::with_kind(sender, changed, ChangeKind::Modified)
    }

    pub fn deleted(sender: &Identity, changed: Changed) -> Self {
        Self::with_kind(sender, changed, ChangeKind::Deleted)
    }

    fn with_kind(sender: &Identity, changed: Changed, kind: ChangeKind) -> Self {
        let message = Some(format!("{sender}: {kind:?} {changed:?}"));
        Self {
            sender: sender.clone(),
            changed,
            kind,
            message,
        }
    }
}

/// Receives notifications from entities it subscribed to.
pub trait Observer {
    fn on_change(&self, event: &Notification);
}

/// Subscriber list plus a single publish operation.
///
/// The notifier is a shared handle: clones publish to the same subscriber
/// list. Entities embed one and keep publishing through it after their own
/// state borrow has been released, so observers may freely call back into
/// the sender.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    observers: Rc<RefCell<Vec<Rc<dyn Observer>>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Rc<dyn Observer>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Removes a subscriber by pointer identity. Returns whether one was
    /// removed.
    pub fn unsubscribe(&self, observer: &Rc<dyn Observer>) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|o| !Rc::ptr_eq(o, observer));
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Delivers the notification to every currently subscribed observer,
    /// iterating over a stable snapshot of the list.
    pub fn publish(&self, event: Notification) {
        tracing::trace!(
            sender = %event.sender,
            kind = ?event.kind,
            changed = ?event.changed,
            "notify"
        );
        let snapshot: Vec<Rc<dyn Observer>> = self.observers.borrow().clone();
        for observer in snapshot {
            observer.on_change(&event);
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        events: RefCell<Vec<Notification>>,
    }

    impl Recorder {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                events: RefCell::new(Vec::new()),
            })
        }
    }

    impl Observer for Recorder {
        fn on_change(&self, event: &Notification) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let notifier = ChangeNotifier::new();
        let a = Recorder::new();
        let b = Recorder::new();
        notifier.subscribe(a.clone());
        notifier.subscribe(b.clone());

        let sender = Identity::new("s", "sender", "");
        notifier.publish(Notification::modified(&sender, Changed::Caption));

        assert_eq!(a.events.borrow().len(), 1);
        assert_eq!(b.events.borrow().len(), 1);
        assert_eq!(a.events.borrow()[0].kind, ChangeKind::Modified);
        assert_eq!(a.events.borrow()[0].changed, Changed::Caption);
    }

    #[test]
    fn test_unsubscribe_by_identity() {
        let notifier = ChangeNotifier::new();
        let a = Recorder::new();
        let b = Recorder::new();
        notifier.subscribe(a.clone());
        notifier.subscribe(b.clone());

        let handle: Rc<dyn Observer> = a.clone();
        assert!(notifier.unsubscribe(&handle));
        assert!(!notifier.unsubscribe(&handle));
        assert_eq!(notifier.observer_count(), 1);

        let sender = Identity::new("s", "sender", "");
        notifier.publish(Notification::added(&sender, Changed::Consumers));
        assert_eq!(a.events.borrow().len(), 0);
        assert_eq!(b.events.borrow().len(), 1);
    }

    struct SelfRemover {
        notifier: ChangeNotifier,
        this: RefCell<Option<Rc<dyn Observer>>>,
        hits: RefCell<usize>,
    }

    impl Observer for SelfRemover {
        fn on_change(&self, _event: &Notification) {
            *self.hits.borrow_mut() += 1;
            if let Some(this) = self.this.borrow_mut().take() {
                self.notifier.unsubscribe(&this);
            }
        }
    }

    #[test]
    fn test_observer_may_remove_itself_during_delivery() {
        let notifier = ChangeNotifier::new();

        let remover = Rc::new(SelfRemover {
            notifier: notifier.clone(),
            this: RefCell::new(None),
            hits: RefCell::new(0),
        });
        *remover.this.borrow_mut() = Some(remover.clone());
        let tail = Recorder::new();

        notifier.subscribe(remover.clone());
        notifier.subscribe(tail.clone());

        let sender = Identity::new("s", "sender", "");
        notifier.publish(Notification::modified(&sender, Changed::Values));

        // the remover got the event, the later subscriber still got it too
        assert_eq!(*remover.hits.borrow(), 1);
        assert_eq!(tail.events.borrow().len(), 1);

        // a second publish no longer reaches the removed observer
        notifier.publish(Notification::modified(&sender, Changed::Values));
        assert_eq!(*remover.hits.borrow(), 1);
        assert_eq!(tail.events.borrow().len(), 2);
    }
}
