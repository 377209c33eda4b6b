//! # Ports
//!
//! Trait contracts between the core domain and the exchange graph.
//!
//! [`ExchangeItem`] is the shared surface of every item in the graph:
//! inputs, outputs and adapted outputs all expose it. [`Transform`] is the
//! contract an adaptation algorithm implements; the factory in
//! [`crate::engine`] registers transforms and wires them into the graph
//! without knowing what they compute.

use std::fmt;
use std::rc::Rc;

use crate::core::argument::ArgumentSet;
use crate::core::error::Result;
use crate::core::metadata::ValueDefinition;
use crate::core::notify::Observer;
use crate::core::values::ValueContainer;
use crate::engine::component::Component;

/// Common surface of inputs, outputs and adapted outputs.
///
/// Items are shared handles, so getters return owned clones of the
/// underlying state rather than borrows.
pub trait ExchangeItem {
    fn id(&self) -> String;
    fn caption(&self) -> String;
    fn description(&self) -> String;
    fn set_id(&self, id: &str);
    fn set_caption(&self, caption: &str);
    fn set_description(&self, description: &str);

    /// The component this item belongs to, if any.
    fn component(&self) -> Option<Component>;
    fn set_component(&self, component: Option<&Component>);

    /// Semantic type of the item's values.
    fn definition(&self) -> Option<ValueDefinition>;
    fn set_definition(&self, definition: Option<ValueDefinition>);

    /// Snapshot of the item's current values.
    fn values(&self) -> Option<ValueContainer>;

    fn subscribe(&self, observer: Rc<dyn Observer>);
    fn unsubscribe(&self, observer: &Rc<dyn Observer>) -> bool;
}

/// An adaptation algorithm: recomputes an adapted output's values from its
/// adaptee's values.
///
/// Transforms are registered with the factory as prototypes; [`create`]
/// produces a fresh instance in its default state, replacing any kind of
/// reflective construction.
///
/// [`create`]: Transform::create
pub trait Transform {
    /// Stable tag naming the algorithm. Factory entries with the same tag
    /// describe the same algorithm under different argument values.
    fn type_tag(&self) -> &'static str;

    /// A fresh instance with default arguments applied.
    fn create(&self) -> Box<dyn Transform>;

    /// The argument set a fresh instance expects, with default values.
    fn default_arguments(&self) -> ArgumentSet;

    /// Applies argument values. Fails when a required argument is missing
    /// or carries a value of the wrong kind.
    fn configure(&mut self, arguments: &ArgumentSet) -> Result<()>;

    /// Computes the adapted values from the adaptee's current values.
    fn recompute(&mut self, source: &ValueContainer) -> Result<ValueContainer>;

    /// Value definition for the adapted output, when the transform changes
    /// the semantic type of what flows through it.
    fn definition(&self) -> Option<ValueDefinition> {
        None
    }

    /// Values a freshly created adapted output starts with.
    fn initial_values(&self) -> Option<ValueContainer> {
        None
    }
}

impl fmt::Debug for dyn Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("type_tag", &self.type_tag())
            .finish()
    }
}
