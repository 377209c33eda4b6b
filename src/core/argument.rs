//! # Arguments
//!
//! Named, typed, optionally value-constrained configuration entries.
//!
//! Adapters (and components) expose their tunable parameters as arguments.
//! For registry matching purposes two arguments are the same when id and
//! current value agree; caption, description and the optional/read-only
//! flags are ignored there.

use std::rc::Rc;

use crate::core::error::{Error, Result};
use crate::core::identity::Identity;
use crate::core::notify::{ChangeNotifier, Changed, Notification, Observer};
use crate::core::scalar::{Scalar, ScalarKind};

/// A single configuration value with a default and optional constraints.
#[derive(Debug)]
pub struct Argument {
    identity: Identity,
    value: Scalar,
    default_value: Scalar,
    possible_values: Vec<Scalar>,
    optional: bool,
    read_only: bool,
    notifier: ChangeNotifier,
}

impl Argument {
    /// Creates a required, writable argument; the caption defaults to the
    /// id and the initial value doubles as the default.
    pub fn new(id: &str, value: Scalar) -> Self {
        Self {
            identity: Identity::new(id, id, ""),
            default_value: value.clone(),
            value,
            possible_values: Vec::new(),
            optional: false,
            read_only: false,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Creates an optional, writable argument.
    pub fn optional(id: &str, value: Scalar) -> Self {
        Self {
            optional: true,
            ..Self::new(id, value)
        }
    }

    /// Creates an optional argument whose value can never change.
    pub fn read_only(id: &str, value: Scalar) -> Self {
        Self {
            optional: true,
            read_only: true,
            ..Self::new(id, value)
        }
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn caption(&self) -> &str {
        self.identity.caption()
    }

    pub fn set_caption(&mut self, caption: &str) {
        self.identity.set_caption(caption);
    }

    pub fn description(&self) -> &str {
        self.identity.description()
    }

    pub fn set_description(&mut self, description: &str) {
        self.identity.set_description(description);
    }

    pub fn value(&self) -> &Scalar {
        &self.value
    }

    pub fn kind(&self) -> ScalarKind {
        self.value.kind()
    }

    pub fn default_value(&self) -> &Scalar {
        &self.default_value
    }

    pub fn possible_values(&self) -> &[Scalar] {
        &self.possible_values
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether the value passes the possible-values constraint. An empty
    /// constraint set allows everything.
    pub fn is_allowed(&self, value: &Scalar) -> bool {
        self.possible_values.is_empty() || self.possible_values.contains(value)
    }

    /// Changes the current value. Fails on read-only arguments and on
    /// values outside the declared possible set; an unchanged value
    /// produces no notification.
    pub fn set_value(&mut self, value: Scalar) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnlyArgument {
                id: self.id().to_string(),
            });
        }
        if !self.is_allowed(&value) {
            return Err(Error::DisallowedValue {
                id: self.id().to_string(),
                value,
            });
        }
        if self.value != value {
            self.value = value.clone();
            self.notifier.publish(Notification::modified(
                &self.identity,
                Changed::ArgumentValue(value),
            ));
        }
        Ok(())
    }

    /// Changes the default value, subject to the same constraint set.
    pub fn set_default_value(&mut self, value: Scalar) -> Result<()> {
        if !self.is_allowed(&value) {
            return Err(Error::DisallowedValue {
                id: self.id().to_string(),
                value,
            });
        }
        if self.default_value != value {
            self.default_value = value.clone();
            self.notifier.publish(Notification::added(
                &self.identity,
                Changed::ArgumentDefault(value),
            ));
        }
        Ok(())
    }

    /// Replaces the constraint set. Fails when the current or default
    /// value would fall outside the new set.
    pub fn set_possible_values(&mut self, possible_values: Vec<Scalar>) -> Result<()> {
        if !possible_values.is_empty() {
            if !possible_values.contains(&self.value) {
                return Err(Error::DisallowedValue {
                    id: self.id().to_string(),
                    value: self.value.clone(),
                });
            }
            if !possible_values.contains(&self.default_value) {
                return Err(Error::DisallowedValue {
                    id: self.id().to_string(),
                    value: self.default_value.clone(),
                });
            }
        }
        if self.possible_values != possible_values {
            self.possible_values = possible_values;
            self.notifier
                .publish(Notification::modified(&self.identity, Changed::PossibleValues));
        }
        Ok(())
    }

    /// Registry matching rule: id and current value only.
    pub fn matches(&self, other: &Argument) -> bool {
        self.id() == other.id() && self.value == other.value
    }

    pub fn subscribe(&self, observer: Rc<dyn Observer>) {
        self.notifier.subscribe(observer);
    }

    pub fn unsubscribe(&self, observer: &Rc<dyn Observer>) -> bool {
        self.notifier.unsubscribe(observer)
    }
}

impl Clone for Argument {
    /// Copies the value and constraints; subscribers stay with the
    /// original, the copy starts with an empty list.
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            value: self.value.clone(),
            default_value: self.default_value.clone(),
            possible_values: self.possible_values.clone(),
            optional: self.optional,
            read_only: self.read_only,
            notifier: ChangeNotifier::new(),
        }
    }
}

/// Ordered collection of arguments with unique ids.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSet {
    items: Vec<Argument>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends the argument. Rejects a second argument with the same id.
    pub fn push(&mut self, argument: Argument) -> bool {
        if self.contains_id(argument.id()) {
            return false;
        }
        self.items.push(argument);
        true
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.items.iter().any(|a| a.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Argument> {
        self.items.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Argument> {
        self.items.iter_mut().find(|a| a.id() == id)
    }

    pub fn value_of(&self, id: &str) -> Option<Scalar> {
        self.get(id).map(|a| a.value().clone())
    }

    /// Sets the value of the argument with the given id, if present and
    /// not read-only. Missing ids are ignored.
    pub fn set_value_of(&mut self, id: &str, value: Scalar) -> Result<()> {
        if let Some(argument) = self.get_mut(id) {
            if !argument.is_read_only() {
                argument.set_value(value)?;
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.items.iter()
    }

    /// Registry matching rule over whole sets: same length, and every
    /// argument of `other` has an equal value here under the same id.
    pub fn same_values(&self, other: &ArgumentSet) -> bool {
        if self.items.len() != other.items.len() {
            return false;
        }
        other
            .items
            .iter()
            .all(|arg| self.value_of(arg.id()).as_ref() == Some(arg.value()))
    }
}

impl FromIterator<Argument> for ArgumentSet {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        let mut set = ArgumentSet::new();
        for argument in iter {
            set.push(argument);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Counter {
        hits: RefCell<usize>,
    }

    impl Observer for Counter {
        fn on_change(&self, _event: &Notification) {
            *self.hits.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_set_value_and_notify_on_change_only() {
        let counter = Rc::new(Counter {
            hits: RefCell::new(0),
        });
        let mut arg = Argument::optional("multiplier", Scalar::Int(10));
        arg.subscribe(counter.clone());

        arg.set_value(Scalar::Int(10)).unwrap(); // unchanged, silent
        assert_eq!(*counter.hits.borrow(), 0);

        arg.set_value(Scalar::Int(42)).unwrap();
        assert_eq!(arg.value(), &Scalar::Int(42));
        assert_eq!(arg.default_value(), &Scalar::Int(10));
        assert_eq!(*counter.hits.borrow(), 1);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut arg = Argument::read_only("engine", Scalar::from("fixed"));
        let err = arg.set_value(Scalar::from("other")).unwrap_err();
        assert_eq!(
            err,
            Error::ReadOnlyArgument {
                id: "engine".to_string()
            }
        );
        assert_eq!(arg.value(), &Scalar::from("fixed"));
    }

    #[test]
    fn test_possible_values_constrain_writes() {
        let mut arg = Argument::new("mode", Scalar::from("fast"));
        arg.set_possible_values(vec![Scalar::from("fast"), Scalar::from("safe")])
            .unwrap();

        assert!(arg.set_value(Scalar::from("safe")).is_ok());
        let err = arg.set_value(Scalar::from("wild")).unwrap_err();
        assert!(matches!(err, Error::DisallowedValue { .. }));
        assert_eq!(arg.value(), &Scalar::from("safe"));

        // a constraint set excluding the current value is rejected
        let err = arg
            .set_possible_values(vec![Scalar::from("wild")])
            .unwrap_err();
        assert!(matches!(err, Error::DisallowedValue { .. }));
    }

    #[test]
    fn test_matching_ignores_flags_and_captions() {
        let a = Argument::optional("k", Scalar::Int(1));
        let mut b = Argument::read_only("k", Scalar::Int(1));
        b.set_caption("entirely different");
        assert!(a.matches(&b));

        let c = Argument::optional("k", Scalar::Int(2));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_clone_does_not_share_subscribers() {
        let counter = Rc::new(Counter {
            hits: RefCell::new(0),
        });
        let arg = Argument::new("a", Scalar::Int(0));
        arg.subscribe(counter.clone());

        let mut copy = arg.clone();
        copy.set_value(Scalar::Int(5)).unwrap();
        assert_eq!(*counter.hits.borrow(), 0);
    }

    #[test]
    fn test_set_rejects_duplicate_ids() {
        let mut set = ArgumentSet::new();
        assert!(set.push(Argument::new("a", Scalar::Int(1))));
        assert!(!set.push(Argument::new("a", Scalar::Int(2))));
        assert_eq!(set.len(), 1);
        assert_eq!(set.value_of("a"), Some(Scalar::Int(1)));
    }

    #[test]
    fn test_same_values_rule() {
        let a: ArgumentSet = [
            Argument::new("k", Scalar::Int(10)),
            Argument::new("mode", Scalar::from("fast")),
        ]
        .into_iter()
        .collect();

        let b: ArgumentSet = [
            Argument::optional("mode", Scalar::from("fast")),
            Argument::optional("k", Scalar::Int(10)),
        ]
        .into_iter()
        .collect();
        assert!(a.same_values(&b)); // order and flags do not matter

        let c: ArgumentSet = [Argument::new("k", Scalar::Int(10))].into_iter().collect();
        assert!(!a.same_values(&c)); // different sizes

        let d: ArgumentSet = [
            Argument::new("k", Scalar::Int(11)),
            Argument::new("mode", Scalar::from("fast")),
        ]
        .into_iter()
        .collect();
        assert!(!a.same_values(&d)); // one value differs
    }

    #[test]
    fn test_set_value_of_skips_read_only() {
        let mut set: ArgumentSet = [
            Argument::new("k", Scalar::Int(1)),
            Argument::read_only("frozen", Scalar::Int(0)),
        ]
        .into_iter()
        .collect();

        set.set_value_of("k", Scalar::Int(3)).unwrap();
        set.set_value_of("frozen", Scalar::Int(3)).unwrap();
        set.set_value_of("missing", Scalar::Int(3)).unwrap();

        assert_eq!(set.value_of("k"), Some(Scalar::Int(3)));
        assert_eq!(set.value_of("frozen"), Some(Scalar::Int(0)));
    }
}
