//! # Exchange Graph
//!
//! Inputs, outputs and adapted outputs, and the links between them.
//!
//! Items are shared handles over interior state. Links are stored once in
//! each direction: an output holds strong references to its consumers and
//! adapted outputs, while inputs and adapted outputs hold weak references
//! back to their provider and adaptee. Dropping an output therefore
//! detaches its dependents instead of leaking a reference cycle.
//!
//! Value propagation is synchronous: replacing an output's values
//! recomputes every attached adapted output, depth first in attachment
//! order, before the call returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::error::{Error, Result};
use crate::core::identity::Identity;
use crate::core::metadata::ValueDefinition;
use crate::core::notify::{ChangeKind, ChangeNotifier, Changed, Notification, Observer};
use crate::core::scalar::Scalar;
use crate::core::values::ValueContainer;
use crate::engine::component::Component;
use crate::ports::{ExchangeItem, Transform};

// ============================================================================
// SHARED ITEM STATE
// ============================================================================

/// Fields every exchange item carries.
#[derive(Debug)]
pub(crate) struct ItemCore {
    identity: Identity,
    component: Option<Component>,
    definition: Option<ValueDefinition>,
    values: Option<ValueContainer>,
    notifier: ChangeNotifier,
}

impl ItemCore {
    fn new(identity: Identity) -> Self {
        Self {
            identity,
            component: None,
            definition: None,
            values: None,
            notifier: ChangeNotifier::new(),
        }
    }
}

/// Access to the shared item fields. The [`ExchangeItem`] surface is
/// implemented once, over this.
pub(crate) trait HasCore {
    fn with_core<R>(&self, f: impl FnOnce(&ItemCore) -> R) -> R;
    fn with_core_mut<R>(&self, f: impl FnOnce(&mut ItemCore) -> R) -> R;
}

fn publish_core<T: HasCore>(item: &T, changed: Changed, kind: ChangeKind) {
    let (identity, notifier) = item.with_core(|c| (c.identity.clone(), c.notifier.clone()));
    let event = match kind {
        ChangeKind::Added => Notification::added(&identity, changed),
        ChangeKind::Deleted => Notification::deleted(&identity, changed),
        _ => Notification::modified(&identity, changed),
    };
    notifier.publish(event);
}

impl<T: HasCore> ExchangeItem for T {
    fn id(&self) -> String {
        self.with_core(|c| c.identity.id().to_string())
    }

    fn caption(&self) -> String {
        self.with_core(|c| c.identity.caption().to_string())
    }

    fn description(&self) -> String {
        self.with_core(|c| c.identity.description().to_string())
    }

    fn set_id(&self, id: &str) {
        let changed = self.with_core_mut(|c| {
            if c.identity.id() == id {
                return false;
            }
            c.identity.set_id(id);
            true
        });
        if changed {
            publish_core(self, Changed::Id, ChangeKind::Modified);
        }
    }

    fn set_caption(&self, caption: &str) {
        let changed = self.with_core_mut(|c| {
            if c.identity.caption() == caption {
                return false;
            }
            c.identity.set_caption(caption);
            true
        });
        if changed {
            publish_core(self, Changed::Caption, ChangeKind::Modified);
        }
    }

    fn set_description(&self, description: &str) {
        let changed = self.with_core_mut(|c| {
            if c.identity.description() == description {
                return false;
            }
            c.identity.set_description(description);
            true
        });
        if changed {
            publish_core(self, Changed::Description, ChangeKind::Modified);
        }
    }

    fn component(&self) -> Option<Component> {
        self.with_core(|c| c.component.clone())
    }

    fn set_component(&self, component: Option<&Component>) {
        let changed = self.with_core_mut(|c| {
            let same = match (&c.component, component) {
                (Some(current), Some(new)) => current.same_as(new),
                (None, None) => true,
                _ => false,
            };
            if same {
                return false;
            }
            c.component = component.cloned();
            true
        });
        if changed {
            publish_core(self, Changed::Component, ChangeKind::Modified);
        }
    }

    fn definition(&self) -> Option<ValueDefinition> {
        self.with_core(|c| c.definition.clone())
    }

    fn set_definition(&self, definition: Option<ValueDefinition>) {
        let changed = self.with_core_mut(|c| {
            if c.definition == definition {
                return false;
            }
            c.definition = definition;
            true
        });
        if changed {
            publish_core(self, Changed::Definition, ChangeKind::Modified);
        }
    }

    fn values(&self) -> Option<ValueContainer> {
        self.with_core(|c| c.values.clone())
    }

    fn subscribe(&self, observer: Rc<dyn Observer>) {
        self.with_core(|c| c.notifier.clone()).subscribe(observer);
    }

    fn unsubscribe(&self, observer: &Rc<dyn Observer>) -> bool {
        self.with_core(|c| c.notifier.clone()).unsubscribe(observer)
    }
}

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug)]
struct InputState {
    core: ItemCore,
    provider: Option<Weak<RefCell<OutputState>>>,
}

/// Consumer side of a link: receives values from at most one provider.
#[derive(Debug, Clone)]
pub struct Input {
    state: Rc<RefCell<InputState>>,
}

impl Input {
    pub fn new(id: &str, caption: &str, description: &str) -> Self {
        Self::with_identity(Identity::new(id, caption, description))
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            state: Rc::new(RefCell::new(InputState {
                core: ItemCore::new(identity),
                provider: None,
            })),
        }
    }

    /// The output currently feeding this input, if it is linked and still
    /// alive.
    pub fn provider(&self) -> Option<Output> {
        self.state
            .borrow()
            .provider
            .as_ref()?
            .upgrade()
            .map(|state| Output { state })
    }

    /// Links or unlinks the provider. Both directions are kept consistent:
    /// linking registers this input as a consumer of the output, and
    /// replaces any previous link.
    pub fn set_provider(&self, provider: Option<&Output>) {
        match provider {
            Some(output) => output.add_consumer(self),
            None => {
                if let Some(current) = self.provider() {
                    current.remove_consumer(self);
                }
            }
        }
    }

    /// Asks the provider for its values.
    pub fn provider_values(&self) -> Option<ValueContainer> {
        self.provider()?.values_for(self)
    }

    pub fn set_values(&self, values: Option<ValueContainer>) {
        let changed = {
            let mut state = self.state.borrow_mut();
            if state.core.values == values {
                false
            } else {
                state.core.values = values;
                true
            }
        };
        if changed {
            publish_core(self, Changed::Values, ChangeKind::Modified);
        }
    }

    fn link_provider(&self, provider: &Rc<RefCell<OutputState>>) {
        self.state.borrow_mut().provider = Some(Rc::downgrade(provider));
        publish_core(self, Changed::Provider, ChangeKind::Modified);
    }

    fn unlink_provider(&self, provider: &Rc<RefCell<OutputState>>) {
        let unlinked = {
            let mut state = self.state.borrow_mut();
            let points_here = state
                .provider
                .as_ref()
                .and_then(Weak::upgrade)
                .is_some_and(|current| Rc::ptr_eq(&current, provider));
            if points_here {
                state.provider = None;
            }
            points_here
        };
        if unlinked {
            publish_core(self, Changed::Provider, ChangeKind::Modified);
        }
    }

    fn same_item(&self, other: &Input) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl HasCore for Input {
    fn with_core<R>(&self, f: impl FnOnce(&ItemCore) -> R) -> R {
        f(&self.state.borrow().core)
    }

    fn with_core_mut<R>(&self, f: impl FnOnce(&mut ItemCore) -> R) -> R {
        f(&mut self.state.borrow_mut().core)
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        self.same_item(other)
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug)]
struct OutputState {
    core: ItemCore,
    consumers: Vec<Input>,
    adapted: Vec<AdaptedOutput>,
    adapter: Option<AdapterLink>,
}

/// Adaptation wiring present only on adapted outputs.
#[derive(Debug)]
struct AdapterLink {
    adaptee: Option<Weak<RefCell<OutputState>>>,
    arguments: crate::core::argument::ArgumentSet,
    transform: Box<dyn Transform>,
}

/// Provider side of a link: feeds any number of consumers and adapted
/// outputs.
#[derive(Debug, Clone)]
pub struct Output {
    state: Rc<RefCell<OutputState>>,
}

impl Output {
    pub fn new(id: &str, caption: &str, description: &str) -> Self {
        Self::with_identity(Identity::new(id, caption, description))
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            state: Rc::new(RefCell::new(OutputState {
                core: ItemCore::new(identity),
                consumers: Vec::new(),
                adapted: Vec::new(),
                adapter: None,
            })),
        }
    }

    /// Replaces the output's values and, when the content differs from
    /// the old container, recomputes every attached adapted output, depth
    /// first. Call [`refresh_adapted_outputs`](Self::refresh_adapted_outputs)
    /// directly to force a cascade without a change.
    pub fn set_values(&self, values: Option<ValueContainer>) -> Result<()> {
        let changed = {
            let mut state = self.state.borrow_mut();
            if state.core.values == values {
                false
            } else {
                state.core.values = values;
                true
            }
        };
        if !changed {
            return Ok(());
        }
        publish_core(self, Changed::Values, ChangeKind::Modified);
        self.refresh_adapted_outputs()
    }

    /// Writes one coordinate of the owned container in place and cascades
    /// like [`set_values`](Self::set_values). An output without a
    /// container yet gets a dynamic one matching the write. Writing the
    /// value already stored at the coordinates does nothing, and a
    /// rejected write leaves the container untouched; neither cascades.
    pub fn set_value(&self, indices: &[usize], value: Scalar) -> Result<()> {
        let written = value.clone();
        let changed = {
            let mut state = self.state.borrow_mut();
            let unchanged = state
                .core
                .values
                .as_ref()
                .is_some_and(|c| matches!(c.get(indices), Ok(Some(current)) if current == value));
            if unchanged {
                false
            } else {
                let container = state
                    .core
                    .values
                    .get_or_insert_with(|| ValueContainer::dynamic(written.kind(), indices.len()));
                container.set(indices, value)?;
                true
            }
        };
        if !changed {
            return Ok(());
        }
        publish_core(self, Changed::Value(written), ChangeKind::Modified);
        self.refresh_adapted_outputs()
    }

    /// The values this output provides for the querying input. The full
    /// container is handed out when the two value definitions match by
    /// content (or both are unset); a query for something else gets
    /// nothing.
    pub fn values_for(&self, query: &Input) -> Option<ValueContainer> {
        let compatible = match (self.definition(), query.definition()) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if compatible {
            self.values()
        } else {
            None
        }
    }

    pub fn consumers(&self) -> Vec<Input> {
        self.state.borrow().consumers.clone()
    }

    pub fn adapted_outputs(&self) -> Vec<AdaptedOutput> {
        self.state.borrow().adapted.clone()
    }

    /// Registers an input as consumer and sets this output as its
    /// provider, replacing any previous provider.
    pub fn add_consumer(&self, input: &Input) {
        if let Some(previous) = input.provider() {
            if Rc::ptr_eq(&previous.state, &self.state) {
                return;
            }
            previous.remove_consumer(input);
        }
        self.state.borrow_mut().consumers.push(input.clone());
        input.link_provider(&self.state);
        publish_core(self, Changed::Consumers, ChangeKind::Added);
    }

    /// Unregisters a consumer and clears its provider link. Returns
    /// whether the input was a consumer.
    pub fn remove_consumer(&self, input: &Input) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.consumers.len();
            state.consumers.retain(|c| !c.same_item(input));
            state.consumers.len() != before
        };
        if removed {
            input.unlink_provider(&self.state);
            publish_core(self, Changed::Consumers, ChangeKind::Deleted);
        }
        removed
    }

    /// Attaches an adapted output by making this output its adaptee.
    pub fn add_adapted_output(&self, adapted: &AdaptedOutput) -> Result<()> {
        adapted.set_adaptee(Some(self))
    }

    /// Detaches an adapted output. Returns whether it was attached here.
    pub fn remove_adapted_output(&self, adapted: &AdaptedOutput) -> bool {
        match adapted.adaptee() {
            Some(current) if Rc::ptr_eq(&current.state, &self.state) => {
                let _ = adapted.set_adaptee(None);
                true
            }
            _ => false,
        }
    }

    /// Recomputes every attached adapted output from this output's current
    /// values. The first failure aborts the cascade.
    pub fn refresh_adapted_outputs(&self) -> Result<()> {
        let adapted = self.adapted_outputs();
        for item in adapted {
            item.refresh()?;
        }
        Ok(())
    }

    /// Applies argument values on every attached adapted output, in
    /// attachment order.
    pub fn initialize_adapted_outputs(&self) -> Result<()> {
        let adapted = self.adapted_outputs();
        for item in adapted {
            item.initialize()?;
        }
        Ok(())
    }

    fn adopt_adapted(&self, adapted: &AdaptedOutput) {
        let added = {
            let mut state = self.state.borrow_mut();
            let present = state.adapted.iter().any(|a| a.same_item(adapted));
            if !present {
                state.adapted.push(adapted.clone());
            }
            !present
        };
        if added {
            publish_core(self, Changed::AdaptedOutputs, ChangeKind::Added);
        }
    }

    fn drop_adapted(&self, adapted: &AdaptedOutput) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.adapted.len();
            state.adapted.retain(|a| !a.same_item(adapted));
            state.adapted.len() != before
        };
        if removed {
            publish_core(self, Changed::AdaptedOutputs, ChangeKind::Deleted);
        }
    }
}

impl HasCore for Output {
    fn with_core<R>(&self, f: impl FnOnce(&ItemCore) -> R) -> R {
        f(&self.state.borrow().core)
    }

    fn with_core_mut<R>(&self, f: impl FnOnce(&mut ItemCore) -> R) -> R {
        f(&mut self.state.borrow_mut().core)
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

// ============================================================================
// ADAPTED OUTPUT
// ============================================================================

/// An output whose values are derived from another output through a
/// [`Transform`].
///
/// Shares the output surface: an adapted output can itself feed consumers
/// and further adapted outputs.
#[derive(Debug, Clone)]
pub struct AdaptedOutput {
    state: Rc<RefCell<OutputState>>,
}

impl AdaptedOutput {
    pub fn new(id: &str, caption: &str, description: &str, transform: Box<dyn Transform>) -> Self {
        Self::with_identity(Identity::new(id, caption, description), transform)
    }

    pub fn with_identity(identity: Identity, transform: Box<dyn Transform>) -> Self {
        let mut core = ItemCore::new(identity);
        core.definition = transform.definition();
        core.values = transform.initial_values();
        let arguments = transform.default_arguments();
        Self {
            state: Rc::new(RefCell::new(OutputState {
                core,
                consumers: Vec::new(),
                adapted: Vec::new(),
                adapter: Some(AdapterLink {
                    adaptee: None,
                    arguments,
                    transform,
                }),
            })),
        }
    }

    /// This item viewed as a plain output, for attaching consumers or
    /// further adapted outputs.
    pub fn as_output(&self) -> Output {
        Output {
            state: self.state.clone(),
        }
    }

    pub fn transform_tag(&self) -> Option<&'static str> {
        self.state
            .borrow()
            .adapter
            .as_ref()
            .map(|link| link.transform.type_tag())
    }

    pub fn arguments(&self) -> crate::core::argument::ArgumentSet {
        self.state
            .borrow()
            .adapter
            .as_ref()
            .map(|link| link.arguments.clone())
            .unwrap_or_default()
    }

    /// Sets one argument value. The running transform keeps its current
    /// configuration until [`initialize`](Self::initialize) applies the
    /// arguments.
    pub fn set_argument_value(&self, id: &str, value: Scalar) -> Result<()> {
        let taken = self.state.borrow_mut().adapter.take();
        let mut link = match taken {
            Some(link) => link,
            None => return Ok(()),
        };
        let applied = link
            .arguments
            .get_mut(id)
            .ok_or_else(|| Error::MissingArgument {
                id: self.id(),
                argument: id.to_string(),
            })
            .and_then(|argument| argument.set_value(value));
        self.state.borrow_mut().adapter = Some(link);
        applied
    }

    /// Applies the current argument values to the transform and cascades
    /// initialization down the attached adapted outputs. This is an
    /// explicit step; linking an adaptee or cascading a refresh never
    /// reconfigures on its own.
    pub fn initialize(&self) -> Result<()> {
        let taken = self.state.borrow_mut().adapter.take();
        let mut link = match taken {
            Some(link) => link,
            None => return Ok(()),
        };
        let configured = link.transform.configure(&link.arguments);
        self.state.borrow_mut().adapter = Some(link);
        configured?;
        self.as_output().initialize_adapted_outputs()
    }

    /// Compatibility filter for wiring this item in front of an input:
    /// the value definitions must match by content (or both be unset),
    /// and when both sides already hold values their scalar kinds must
    /// match. Never mutates anything.
    pub fn can_adapt_to(&self, input: &Input) -> bool {
        let definitions_match = match (self.definition(), input.definition()) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        let kinds_match = match (self.values(), input.values()) {
            (Some(a), Some(b)) => a.kind() == b.kind(),
            _ => true,
        };
        definitions_match && kinds_match
    }

    /// The output this item adapts, if linked and still alive.
    pub fn adaptee(&self) -> Option<Output> {
        self.state
            .borrow()
            .adapter
            .as_ref()?
            .adaptee
            .as_ref()?
            .upgrade()
            .map(|state| Output { state })
    }

    /// Links or unlinks the adaptee, keeping both directions consistent:
    /// the new adaptee adopts this item into its adapted output list, the
    /// previous one drops it, and the item takes over the new adaptee's
    /// component.
    ///
    /// A link that would close a loop through the adaptee chain is
    /// rejected before anything is unlinked, so a failed call leaves the
    /// graph untouched.
    pub fn set_adaptee(&self, adaptee: Option<&Output>) -> Result<()> {
        if let Some(candidate) = adaptee {
            let mut cursor = candidate.state.clone();
            loop {
                if Rc::ptr_eq(&cursor, &self.state) {
                    return Err(Error::AdapteeCycle { id: self.id() });
                }
                let next = cursor
                    .borrow()
                    .adapter
                    .as_ref()
                    .and_then(|link| link.adaptee.as_ref())
                    .and_then(Weak::upgrade);
                match next {
                    Some(state) => cursor = state,
                    None => break,
                }
            }
        }

        let previous = self.adaptee();
        let unchanged = match (&previous, adaptee) {
            (Some(old), Some(new)) => Rc::ptr_eq(&old.state, &new.state),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }

        tracing::debug!(
            item = %self.id(),
            adaptee = ?adaptee.map(|a| a.id()),
            "relinking adaptee"
        );

        if let Some(old) = previous {
            old.drop_adapted(self);
        }
        let component = adaptee.and_then(|a| a.component());
        {
            let mut state = self.state.borrow_mut();
            if let Some(link) = state.adapter.as_mut() {
                link.adaptee = adaptee.map(|a| Rc::downgrade(&a.state));
            }
            if adaptee.is_some() {
                state.core.component = component;
            }
        }
        if let Some(new) = adaptee {
            new.adopt_adapted(self);
        }
        publish_core(self, Changed::Adaptee, ChangeKind::Modified);
        Ok(())
    }

    /// Recomputes this item's values from the adaptee's current values and
    /// cascades into adapted outputs attached further down. Without an
    /// adaptee, or while the adaptee has no values, nothing happens.
    pub fn refresh(&self) -> Result<()> {
        let source = match self.adaptee().and_then(|a| a.values()) {
            Some(values) => values,
            None => return Ok(()),
        };
        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            let link = match state.adapter.as_mut() {
                Some(link) => link,
                None => return Ok(()),
            };
            state.core.values = Some(link.transform.recompute(&source)?);
        }
        publish_core(self, Changed::Values, ChangeKind::Modified);
        self.as_output().refresh_adapted_outputs()
    }

    fn same_item(&self, other: &AdaptedOutput) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl HasCore for AdaptedOutput {
    fn with_core<R>(&self, f: impl FnOnce(&ItemCore) -> R) -> R {
        f(&self.state.borrow().core)
    }

    fn with_core_mut<R>(&self, f: impl FnOnce(&mut ItemCore) -> R) -> R {
        f(&mut self.state.borrow_mut().core)
    }
}

impl PartialEq for AdaptedOutput {
    fn eq(&self, other: &Self) -> bool {
        self.same_item(other)
    }
}
