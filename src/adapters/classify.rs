//! # Classifier
//!
//! Transform mapping numeric values onto an ordered three-class quality.

use crate::core::argument::{Argument, ArgumentSet};
use crate::core::error::{Error, Result};
use crate::core::metadata::{Quality, ValueDefinition};
use crate::core::scalar::{Scalar, ScalarKind};
use crate::core::values::ValueContainer;
use crate::ports::Transform;

pub const ARG_LOW_BOUND: &str = "low_bound";
pub const ARG_HIGH_BOUND: &str = "high_bound";

pub const CLASS_LOW: &str = "low";
pub const CLASS_MEDIUM: &str = "medium";
pub const CLASS_HIGH: &str = "high";

/// Classifies integer values into `low`, `medium` or `high` against two
/// configurable bounds. Values below the low bound are `low`, values
/// above the high bound are `high`, everything else is `medium`.
#[derive(Debug, Clone)]
pub struct Classifier {
    low_bound: i64,
    high_bound: i64,
}

impl Classifier {
    pub fn new(low_bound: i64, high_bound: i64) -> Self {
        Self {
            low_bound,
            high_bound,
        }
    }

    pub fn boxed(low_bound: i64, high_bound: i64) -> Box<dyn Transform> {
        Box::new(Self::new(low_bound, high_bound))
    }

    pub fn arguments(low_bound: i64, high_bound: i64) -> ArgumentSet {
        [
            Argument::new(ARG_LOW_BOUND, Scalar::Int(low_bound)),
            Argument::new(ARG_HIGH_BOUND, Scalar::Int(high_bound)),
        ]
        .into_iter()
        .collect()
    }

    fn label(&self, value: i64) -> &'static str {
        if value < self.low_bound {
            CLASS_LOW
        } else if value > self.high_bound {
            CLASS_HIGH
        } else {
            CLASS_MEDIUM
        }
    }
}

impl Default for Classifier {
    /// Everything classifies as `medium` until bounds are configured.
    fn default() -> Self {
        Self::new(i64::MIN, i64::MAX)
    }
}

impl Transform for Classifier {
    fn type_tag(&self) -> &'static str {
        "classifier"
    }

    fn create(&self) -> Box<dyn Transform> {
        Box::new(Classifier::default())
    }

    fn default_arguments(&self) -> ArgumentSet {
        Classifier::arguments(self.low_bound, self.high_bound)
    }

    fn configure(&mut self, arguments: &ArgumentSet) -> Result<()> {
        for (id, slot) in [
            (ARG_LOW_BOUND, &mut self.low_bound),
            (ARG_HIGH_BOUND, &mut self.high_bound),
        ] {
            match arguments.value_of(id) {
                Some(Scalar::Int(bound)) => *slot = bound,
                Some(other) => {
                    return Err(Error::KindMismatch {
                        expected: ScalarKind::Int,
                        got: other.kind(),
                    })
                }
                None => {
                    return Err(Error::MissingArgument {
                        id: "classifier".to_string(),
                        argument: id.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    fn recompute(&mut self, source: &ValueContainer) -> Result<ValueContainer> {
        if source.kind() != ScalarKind::Int {
            return Err(Error::KindMismatch {
                expected: ScalarKind::Int,
                got: source.kind(),
            });
        }
        let mut result = ValueContainer::dynamic(ScalarKind::Text, source.rank());
        source.visit(|indices, value| {
            if let Some(Scalar::Int(v)) = value {
                result.set(indices, Scalar::from(self.label(*v)))?;
            }
            Ok(())
        })?;
        Ok(result)
    }

    fn definition(&self) -> Option<ValueDefinition> {
        Some(ValueDefinition::Quality(Quality::text(
            "class",
            "three class quality",
            true,
            &[CLASS_LOW, CLASS_MEDIUM, CLASS_HIGH],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AdaptedOutput, Output};
    use crate::ports::ExchangeItem;
    use std::cmp::Ordering;

    #[test]
    fn test_classifies_against_the_bounds() {
        let mut classifier = Classifier::new(10, 100);
        let mut source = ValueContainer::dynamic(ScalarKind::Int, 1);
        source.set(&[0], Scalar::Int(5)).unwrap();
        source.set(&[1], Scalar::Int(50)).unwrap();
        source.set(&[2], Scalar::Int(500)).unwrap();
        source.set(&[3], Scalar::Int(10)).unwrap(); // bounds are inclusive

        let result = classifier.recompute(&source).unwrap();
        assert_eq!(result.kind(), ScalarKind::Text);
        assert_eq!(result.get(&[0]).unwrap(), Some(Scalar::from(CLASS_LOW)));
        assert_eq!(result.get(&[1]).unwrap(), Some(Scalar::from(CLASS_MEDIUM)));
        assert_eq!(result.get(&[2]).unwrap(), Some(Scalar::from(CLASS_HIGH)));
        assert_eq!(result.get(&[3]).unwrap(), Some(Scalar::from(CLASS_MEDIUM)));
    }

    #[test]
    fn test_rejects_non_integer_sources() {
        let source = ValueContainer::dynamic(ScalarKind::Real, 1);
        let err = Classifier::default().recompute(&source).unwrap_err();
        assert!(matches!(err, Error::KindMismatch { .. }));
    }

    #[test]
    fn test_adapted_output_carries_an_ordered_quality_definition() {
        let output = Output::new("o", "O", "");
        let adapted = AdaptedOutput::new("c", "C", "", Classifier::boxed(10, 100));
        adapted.set_adaptee(Some(&output)).unwrap();

        let definition = adapted.definition().unwrap();
        let quality = match definition {
            ValueDefinition::Quality(q) => q,
            other => panic!("unexpected definition {other:?}"),
        };
        assert!(quality.is_ordered());
        assert_eq!(
            quality
                .compare(&Scalar::from(CLASS_LOW), &Scalar::from(CLASS_HIGH))
                .unwrap(),
            Ordering::Less
        );

        let mut values = ValueContainer::dynamic(ScalarKind::Int, 1);
        values.set(&[0], Scalar::Int(7)).unwrap();
        output.set_values(Some(values)).unwrap();
        assert_eq!(
            adapted.values().unwrap().get(&[0]).unwrap(),
            Some(Scalar::from(CLASS_LOW))
        );
    }
}
