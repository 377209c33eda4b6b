//! # Component
//!
//! Owner of exchange items.
//!
//! The graph only needs components as an ownership anchor: every exchange
//! item can name the component it belongs to, and adapted outputs created
//! by the factory adopt their adaptee's component. The lifecycle status is
//! tracked and published but not interpreted here.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::identity::Identity;
use crate::core::notify::{ChangeNotifier, Changed, Notification, Observer};

/// Lifecycle phase of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Created,
    Initializing,
    Initialized,
    Validating,
    Valid,
    Invalid,
    Updating,
    Updated,
    Done,
    Failed,
}

#[derive(Debug)]
struct ComponentState {
    identity: Identity,
    status: ComponentStatus,
    notifier: ChangeNotifier,
}

/// Shared handle to a component.
///
/// Clones refer to the same component; equality is handle identity, since
/// two components with the same id are still two components.
#[derive(Debug, Clone)]
pub struct Component {
    state: Rc<RefCell<ComponentState>>,
}

impl Component {
    pub fn new(id: &str, caption: &str, description: &str) -> Self {
        Self::with_identity(Identity::new(id, caption, description))
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            state: Rc::new(RefCell::new(ComponentState {
                identity,
                status: ComponentStatus::Created,
                notifier: ChangeNotifier::new(),
            })),
        }
    }

    pub fn id(&self) -> String {
        self.state.borrow().identity.id().to_string()
    }

    pub fn caption(&self) -> String {
        self.state.borrow().identity.caption().to_string()
    }

    pub fn description(&self) -> String {
        self.state.borrow().identity.description().to_string()
    }

    pub fn set_caption(&self, caption: &str) {
        let (identity, notifier) = {
            let mut state = self.state.borrow_mut();
            if state.identity.caption() == caption {
                return;
            }
            state.identity.set_caption(caption);
            (state.identity.clone(), state.notifier.clone())
        };
        notifier.publish(Notification::modified(&identity, Changed::Caption));
    }

    pub fn set_description(&self, description: &str) {
        let (identity, notifier) = {
            let mut state = self.state.borrow_mut();
            if state.identity.description() == description {
                return;
            }
            state.identity.set_description(description);
            (state.identity.clone(), state.notifier.clone())
        };
        notifier.publish(Notification::modified(&identity, Changed::Description));
    }

    pub fn status(&self) -> ComponentStatus {
        self.state.borrow().status
    }

    pub fn set_status(&self, status: ComponentStatus) {
        let (identity, notifier) = {
            let mut state = self.state.borrow_mut();
            if state.status == status {
                return;
            }
            state.status = status;
            (state.identity.clone(), state.notifier.clone())
        };
        notifier.publish(Notification::modified(&identity, Changed::Status));
    }

    pub fn subscribe(&self, observer: Rc<dyn Observer>) {
        self.state.borrow().notifier.subscribe(observer);
    }

    pub fn unsubscribe(&self, observer: &Rc<dyn Observer>) -> bool {
        self.state.borrow().notifier.unsubscribe(observer)
    }

    pub(crate) fn same_as(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}
