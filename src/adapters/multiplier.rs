//! # Multiplier
//!
//! Transform scaling every numeric value by a constant factor.

use crate::core::argument::{Argument, ArgumentSet};
use crate::core::error::{Error, Result};
use crate::core::scalar::{Scalar, ScalarKind};
use crate::core::values::ValueContainer;
use crate::ports::Transform;

pub const ARG_MULTIPLIER: &str = "multiplier";

/// Multiplies integer and real values by a configurable integer factor.
/// The shape of the source carries over unchanged.
#[derive(Debug, Clone)]
pub struct Multiplier {
    factor: i64,
}

impl Multiplier {
    pub fn new(factor: i64) -> Self {
        Self { factor }
    }

    pub fn boxed(factor: i64) -> Box<dyn Transform> {
        Box::new(Self::new(factor))
    }

    pub fn arguments(factor: i64) -> ArgumentSet {
        std::iter::once(Argument::new(ARG_MULTIPLIER, Scalar::Int(factor))).collect()
    }

    pub fn factor(&self) -> i64 {
        self.factor
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Transform for Multiplier {
    fn type_tag(&self) -> &'static str {
        "multiplier"
    }

    fn create(&self) -> Box<dyn Transform> {
        Box::new(Multiplier::default())
    }

    fn default_arguments(&self) -> ArgumentSet {
        Multiplier::arguments(self.factor)
    }

    fn configure(&mut self, arguments: &ArgumentSet) -> Result<()> {
        match arguments.value_of(ARG_MULTIPLIER) {
            Some(Scalar::Int(factor)) => {
                self.factor = factor;
                Ok(())
            }
            Some(other) => Err(Error::KindMismatch {
                expected: ScalarKind::Int,
                got: other.kind(),
            }),
            None => Err(Error::MissingArgument {
                id: self.type_tag().to_string(),
                argument: ARG_MULTIPLIER.to_string(),
            }),
        }
    }

    fn recompute(&mut self, source: &ValueContainer) -> Result<ValueContainer> {
        let kind = source.kind();
        if kind != ScalarKind::Int && kind != ScalarKind::Real {
            return Err(Error::KindMismatch {
                expected: ScalarKind::Real,
                got: kind,
            });
        }
        let factor = self.factor;
        let mut result = ValueContainer::dynamic(kind, source.rank());
        source.visit(|indices, value| {
            let scaled = match value {
                Some(Scalar::Int(v)) => Some(Scalar::Int(v * factor)),
                Some(Scalar::Real(v)) => Some(Scalar::Real(v * factor as f64)),
                _ => None,
            };
            match scaled {
                Some(scaled) => result.set(indices, scaled),
                None => Ok(()),
            }
        })?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AdapterFactory, AdaptedOutput, Output};
    use crate::ports::ExchangeItem;

    #[test]
    fn test_scales_every_value_by_the_factor() {
        let mut source = ValueContainer::dynamic(ScalarKind::Int, 1);
        for i in 0..5 {
            source.set(&[i], Scalar::Int(i as i64 + 1)).unwrap();
        }

        let mut multiplier = Multiplier::new(10);
        let result = multiplier.recompute(&source).unwrap();
        for i in 0..5 {
            assert_eq!(
                result.get(&[i]).unwrap(),
                Some(Scalar::Int(10 * (i as i64 + 1)))
            );
        }
    }

    #[test]
    fn test_scales_real_values() {
        let mut source = ValueContainer::dynamic(ScalarKind::Real, 1);
        source.set(&[0], Scalar::Real(1.5)).unwrap();

        let mut multiplier = Multiplier::new(4);
        let result = multiplier.recompute(&source).unwrap();
        assert_eq!(result.get(&[0]).unwrap(), Some(Scalar::Real(6.0)));
    }

    #[test]
    fn test_rejects_text_sources() {
        let source = ValueContainer::dynamic(ScalarKind::Text, 1);
        let err = Multiplier::new(2).recompute(&source).unwrap_err();
        assert!(matches!(err, Error::KindMismatch { .. }));
    }

    #[test]
    fn test_adapted_output_tracks_its_adaptee_times_the_factor() {
        let output = Output::new("o", "O", "");
        let adapted = AdaptedOutput::new("m", "M", "", Multiplier::boxed(1));
        adapted.set_adaptee(Some(&output)).unwrap();
        adapted
            .set_argument_value(ARG_MULTIPLIER, Scalar::Int(10))
            .unwrap();
        adapted.initialize().unwrap();

        let mut values = ValueContainer::dynamic(ScalarKind::Int, 1);
        for i in 0..10 {
            values.set(&[i], Scalar::Int(i as i64)).unwrap();
        }
        output.set_values(Some(values)).unwrap();

        let adapted_values = adapted.values().unwrap();
        for i in 0..10 {
            assert_eq!(
                adapted_values.get(&[i]).unwrap(),
                Some(Scalar::Int(10 * i as i64))
            );
        }
    }

    #[test]
    fn test_factory_created_multiplier_carries_the_registered_factor() {
        let mut factory = AdapterFactory::new("f", "Factory", "");
        factory.register(Multiplier::boxed(1), Multiplier::arguments(10));
        let id = factory.registered_ids()[0].clone();

        let output = Output::new("o", "O", "");
        let mut values = ValueContainer::dynamic(ScalarKind::Int, 1);
        values.set(&[0], Scalar::Int(7)).unwrap();
        output.set_values(Some(values)).unwrap();

        let adapted = factory.create_adapted_output(&id, &output, None).unwrap();
        adapted.initialize().unwrap();
        adapted.refresh().unwrap();
        assert_eq!(
            adapted.values().unwrap().get(&[0]).unwrap(),
            Some(Scalar::Int(70))
        );
    }
}
