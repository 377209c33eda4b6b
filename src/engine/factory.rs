//! # Adapter Factory
//!
//! Registry of adaptation algorithms and the place where adapted outputs
//! are created and wired into the graph.
//!
//! Each registered entry pairs a [`Transform`] prototype with an argument
//! snapshot; the same algorithm can be registered several times under
//! different argument values. Creation never reuses the prototype: every
//! adapted output gets a fresh transform instance from
//! [`Transform::create`].

use crate::core::argument::ArgumentSet;
use crate::core::error::{Error, Result};
use crate::core::identity::Identity;
use crate::ports::Transform;

use crate::engine::exchange::{AdaptedOutput, Input, Output};
use crate::ports::ExchangeItem;

#[derive(Debug)]
struct AdapterEntry {
    identity: Identity,
    snapshot: ArgumentSet,
    prototype: Box<dyn Transform>,
    /// Lazily built probe instance, reused across availability queries.
    sample: Option<AdaptedOutput>,
}

impl AdapterEntry {
    /// Entries are equal when they describe the same algorithm under the
    /// same argument values.
    fn matches(&self, tag: &str, arguments: &ArgumentSet) -> bool {
        self.prototype.type_tag() == tag && self.snapshot.same_values(arguments)
    }
}

/// Registry of adapter entries, identified itself so a composition can
/// carry several factories.
#[derive(Debug)]
pub struct AdapterFactory {
    identity: Identity,
    entries: Vec<AdapterEntry>,
}

impl AdapterFactory {
    pub fn new(id: &str, caption: &str, description: &str) -> Self {
        Self {
            identity: Identity::new(id, caption, description),
            entries: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn caption(&self) -> &str {
        self.identity.caption()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of all registered entries, in registration order.
    pub fn registered_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.identity.id().to_string())
            .collect()
    }

    /// Distinct algorithm tags currently registered, in first-seen order.
    pub fn registered_tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = Vec::new();
        for entry in &self.entries {
            let tag = entry.prototype.type_tag();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Registers an algorithm under an argument snapshot. Returns whether
    /// a new entry was added; an entry with the same tag and the same
    /// argument values registers only once.
    pub fn register(&mut self, prototype: Box<dyn Transform>, arguments: ArgumentSet) -> bool {
        let tag = prototype.type_tag();
        if self.entries.iter().any(|e| e.matches(tag, &arguments)) {
            return false;
        }
        tracing::debug!(factory = %self.identity, tag, "registering adapter");
        self.entries.push(AdapterEntry {
            identity: Identity::random(tag, ""),
            snapshot: arguments,
            prototype,
            sample: None,
        });
        true
    }

    /// Removes the entry with the given tag and argument values. Returns
    /// whether one was removed.
    pub fn unregister(&mut self, tag: &str, arguments: &ArgumentSet) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(tag, arguments));
        self.entries.len() != before
    }

    /// Removes every entry for the given algorithm, regardless of
    /// argument values. Returns how many were removed.
    pub fn unregister_by_tag(&mut self, tag: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.prototype.type_tag() != tag);
        before - self.entries.len()
    }

    /// Ids of the entries whose adapters could sit between the given
    /// output and target, in registration order. Each entry probes with a
    /// cached sample instance, transiently attached to the adaptee and
    /// detached again before returning, so the adaptee's adapter list is
    /// left as it was. Without a target, every entry qualifies.
    pub fn available_adapter_ids(&mut self, adaptee: &Output, target: Option<&Input>) -> Vec<String> {
        let mut ids = Vec::new();
        for entry in &mut self.entries {
            let sample = entry.sample.get_or_insert_with(|| {
                AdaptedOutput::with_identity(
                    Identity::random(entry.identity.caption(), ""),
                    entry.prototype.create(),
                )
            });
            let attached = sample.set_adaptee(Some(adaptee)).is_ok();
            let compatible =
                attached && target.map_or(true, |input| sample.can_adapt_to(input));
            if attached {
                let _ = sample.set_adaptee(None);
            }
            if compatible {
                ids.push(entry.identity.id().to_string());
            }
        }
        ids
    }

    /// Creates an adapted output from the given entry, links it to the
    /// adaptee and applies the entry's argument snapshot. When a target
    /// input is given, it is attached as a consumer of the new item.
    pub fn create_adapted_output(
        &self,
        id: &str,
        adaptee: &Output,
        target: Option<&Input>,
    ) -> Result<AdaptedOutput> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.identity.id() == id)
            .ok_or_else(|| Error::UnknownAdapter { id: id.to_string() })?;

        tracing::debug!(
            factory = %self.identity,
            entry = %entry.identity,
            adaptee = %adaptee.id(),
            "creating adapted output"
        );

        let identity = Identity::random(entry.identity.caption(), "");
        let adapted = AdaptedOutput::with_identity(identity, entry.prototype.create());
        adapted.set_adaptee(Some(adaptee))?;
        for argument in entry.snapshot.iter() {
            adapted.set_argument_value(argument.id(), argument.value().clone())?;
        }
        if let Some(input) = target {
            adapted.as_output().add_consumer(input);
        }
        Ok(adapted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::argument::Argument;
    use crate::core::error::ErrorClass;
    use crate::core::scalar::{Scalar, ScalarKind};
    use crate::core::values::ValueContainer;

    struct Scale {
        factor: i64,
    }

    impl Scale {
        fn boxed(factor: i64) -> Box<dyn Transform> {
            Box::new(Self { factor })
        }

        fn arguments(factor: i64) -> ArgumentSet {
            std::iter::once(Argument::new("factor", Scalar::Int(factor))).collect()
        }
    }

    impl Transform for Scale {
        fn type_tag(&self) -> &'static str {
            "scale"
        }

        fn create(&self) -> Box<dyn Transform> {
            Scale::boxed(1)
        }

        fn default_arguments(&self) -> ArgumentSet {
            Scale::arguments(1)
        }

        fn configure(&mut self, arguments: &ArgumentSet) -> Result<()> {
            match arguments.value_of("factor") {
                Some(Scalar::Int(factor)) => {
                    self.factor = factor;
                    Ok(())
                }
                Some(other) => Err(Error::KindMismatch {
                    expected: ScalarKind::Int,
                    got: other.kind(),
                }),
                None => Err(Error::MissingArgument {
                    id: "scale".to_string(),
                    argument: "factor".to_string(),
                }),
            }
        }

        fn recompute(&mut self, source: &ValueContainer) -> Result<ValueContainer> {
            if source.kind() != ScalarKind::Int {
                return Err(Error::KindMismatch {
                    expected: ScalarKind::Int,
                    got: source.kind(),
                });
            }
            let factor = self.factor;
            let mut result = ValueContainer::dynamic(ScalarKind::Int, source.rank());
            source.visit(|indices, value| {
                if let Some(Scalar::Int(v)) = value {
                    result.set(indices, Scalar::Int(v * factor))?;
                }
                Ok(())
            })?;
            Ok(result)
        }
    }

    struct Labeller;

    impl Transform for Labeller {
        fn type_tag(&self) -> &'static str {
            "labeller"
        }

        fn create(&self) -> Box<dyn Transform> {
            Box::new(Labeller)
        }

        fn default_arguments(&self) -> ArgumentSet {
            ArgumentSet::default()
        }

        fn configure(&mut self, _arguments: &ArgumentSet) -> Result<()> {
            Ok(())
        }

        fn recompute(&mut self, source: &ValueContainer) -> Result<ValueContainer> {
            let mut result = ValueContainer::dynamic(ScalarKind::Text, source.rank());
            source.visit(|indices, value| match value {
                Some(v) => result.set(indices, Scalar::from(v.to_string())),
                None => Ok(()),
            })?;
            Ok(result)
        }

        fn definition(&self) -> Option<crate::core::metadata::ValueDefinition> {
            Some(crate::core::metadata::ValueDefinition::Quality(
                crate::core::metadata::Quality::text("label", "", false, &[]),
            ))
        }
    }

    fn int_output(value: i64) -> Output {
        let output = Output::new("o", "O", "");
        let mut container = ValueContainer::dynamic(ScalarKind::Int, 1);
        container.set(&[0], Scalar::Int(value)).unwrap();
        output.set_values(Some(container)).unwrap();
        output
    }

    #[test]
    fn test_register_deduplicates_by_tag_and_argument_values() {
        let mut factory = AdapterFactory::new("f", "Factory", "");
        assert!(factory.register(Scale::boxed(1), Scale::arguments(2)));
        assert!(!factory.register(Scale::boxed(1), Scale::arguments(2)));
        assert!(factory.register(Scale::boxed(1), Scale::arguments(3)));
        assert_eq!(factory.len(), 2);
    }

    #[test]
    fn test_unregister() {
        let mut factory = AdapterFactory::new("f", "Factory", "");
        factory.register(Scale::boxed(1), Scale::arguments(2));
        factory.register(Scale::boxed(1), Scale::arguments(3));
        factory.register(Box::new(Labeller), ArgumentSet::default());

        assert!(factory.unregister("scale", &Scale::arguments(3)));
        assert!(!factory.unregister("scale", &Scale::arguments(3)));
        assert_eq!(factory.len(), 2);

        assert_eq!(factory.unregister_by_tag("scale"), 1);
        assert_eq!(factory.len(), 1);
        assert_eq!(factory.unregister_by_tag("scale"), 0);
        assert_eq!(factory.registered_tags(), vec!["labeller"]);
    }

    #[test]
    fn test_available_ids_filter_by_target_and_leave_no_trace() {
        let mut factory = AdapterFactory::new("f", "Factory", "");
        factory.register(Scale::boxed(1), Scale::arguments(2));
        factory.register(Box::new(Labeller), ArgumentSet::default());

        let adaptee = int_output(4);

        // no target: everything is listed, in registration order
        let all = factory.available_adapter_ids(&adaptee, None);
        assert_eq!(all, factory.registered_ids());

        // a plain target rules out entries that impose a definition
        let target = Input::new("t", "T", "");
        let available = factory.available_adapter_ids(&adaptee, Some(&target));
        assert_eq!(available.len(), 1);
        assert_eq!(available[0], factory.registered_ids()[0]);

        // probing left the adaptee's adapter list alone
        assert!(adaptee.adapted_outputs().is_empty());
    }

    #[test]
    fn test_create_applies_snapshot_and_links_the_graph() {
        let mut factory = AdapterFactory::new("f", "Factory", "");
        factory.register(Scale::boxed(1), Scale::arguments(3));
        let id = factory.registered_ids()[0].clone();

        let adaptee = int_output(5);
        let target = Input::new("t", "T", "");
        let adapted = factory
            .create_adapted_output(&id, &adaptee, Some(&target))
            .unwrap();

        assert_eq!(adapted.adaptee().unwrap(), adaptee);
        assert_eq!(adaptee.adapted_outputs().len(), 1);
        assert_eq!(
            adapted.arguments().value_of("factor"),
            Some(Scalar::Int(3))
        );
        assert_eq!(target.provider().unwrap(), adapted.as_output());

        // the snapshot takes effect once the instance is initialized
        adapted.initialize().unwrap();
        adapted.refresh().unwrap();
        let values = adapted.values().unwrap();
        assert_eq!(values.get(&[0]).unwrap(), Some(Scalar::Int(15)));

        // every creation is a distinct instance
        let second = factory.create_adapted_output(&id, &adaptee, None).unwrap();
        assert_ne!(second, adapted);
        assert_eq!(adaptee.adapted_outputs().len(), 2);
    }

    #[test]
    fn test_create_with_unknown_id_is_a_configuration_error() {
        let factory = AdapterFactory::new("f", "Factory", "");
        let adaptee = Output::new("o", "O", "");
        let err = factory
            .create_adapted_output("nope", &adaptee, None)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAdapter { .. }));
        assert_eq!(err.class(), ErrorClass::Configuration);
    }
}
