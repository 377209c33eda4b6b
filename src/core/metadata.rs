//! # Value Definitions
//!
//! Metadata describing the semantic type of values on an exchange item.
//!
//! A [`Quantity`] is numeric and carries a [`Unit`]; a [`Quality`] is
//! categorical and carries an ordered or unordered [`Category`] list.
//! Definitions are consumed read-only by the graph and compared by
//! content. Units are only compared for compatibility; no conversion
//! arithmetic happens here.

use std::cmp::Ordering;

use crate::core::error::{Error, Result};
use crate::core::scalar::{Scalar, ScalarKind};

/// Base dimensions a unit can carry exponents over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDimension {
    Length,
    Mass,
    Time,
    ElectricCurrent,
    Temperature,
    AmountOfSubstance,
    LuminousIntensity,
    Currency,
}

const BASE_DIMENSION_COUNT: usize = 8;

/// Exponents over the fixed base dimension set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dimension {
    powers: [f64; BASE_DIMENSION_COUNT],
}

impl Dimension {
    /// A dimensionless value (all exponents zero).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn power(&self, base: BaseDimension) -> f64 {
        self.powers[base as usize]
    }

    pub fn set_power(&mut self, base: BaseDimension, power: f64) {
        self.powers[base as usize] = power;
    }

    pub fn with_power(mut self, base: BaseDimension, power: f64) -> Self {
        self.set_power(base, power);
        self
    }
}

/// Unit of a quantity: conversion factor and offset to the SI reference
/// system plus the dimension exponents.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    caption: String,
    description: String,
    factor_to_si: f64,
    offset_to_si: f64,
    dimension: Dimension,
}

impl Unit {
    pub fn new(caption: &str, description: &str, factor_to_si: f64, offset_to_si: f64) -> Self {
        Self {
            caption: caption.to_string(),
            description: description.to_string(),
            factor_to_si,
            offset_to_si,
            dimension: Dimension::none(),
        }
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn dimensionless() -> Self {
        Self::new("[-]", "dimensionless", 1.0, 0.0)
    }

    pub fn meter() -> Self {
        Self::new("m", "meter", 1.0, 0.0)
            .with_dimension(Dimension::none().with_power(BaseDimension::Length, 1.0))
    }

    pub fn meter_per_second() -> Self {
        Self::new("m/s", "meter per second", 1.0, 0.0).with_dimension(
            Dimension::none()
                .with_power(BaseDimension::Length, 1.0)
                .with_power(BaseDimension::Time, -1.0),
        )
    }

    pub fn cubic_meter_per_second() -> Self {
        Self::new("m3/s", "cubic meter per second", 1.0, 0.0).with_dimension(
            Dimension::none()
                .with_power(BaseDimension::Length, 3.0)
                .with_power(BaseDimension::Time, -1.0),
        )
    }

    pub fn millimeter_per_day() -> Self {
        Self::new("mm/day", "millimeters per day", 1.15741e-8, 0.0).with_dimension(
            Dimension::none()
                .with_power(BaseDimension::Length, 1.0)
                .with_power(BaseDimension::Time, -1.0),
        )
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn factor_to_si(&self) -> f64 {
        self.factor_to_si
    }

    pub fn offset_to_si(&self) -> f64 {
        self.offset_to_si
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    /// Compatibility comparison: same dimension exponents, regardless of
    /// factor and offset.
    pub fn compatible_with(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }
}

/// Numeric value definition with a unit and optional bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    caption: String,
    description: String,
    kind: ScalarKind,
    missing_data_value: Option<Scalar>,
    unit: Unit,
    bounds: Option<(f64, f64)>,
}

impl Quantity {
    pub fn real(caption: &str, description: &str, unit: Unit) -> Self {
        Self::with_kind(ScalarKind::Real, caption, description, unit)
    }

    pub fn int(caption: &str, description: &str, unit: Unit) -> Self {
        Self::with_kind(ScalarKind::Int, caption, description, unit)
    }

    fn with_kind(kind: ScalarKind, caption: &str, description: &str, unit: Unit) -> Self {
        Self {
            caption: caption.to_string(),
            description: description.to_string(),
            kind,
            missing_data_value: None,
            unit,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    pub fn with_missing_data_value(mut self, value: Scalar) -> Self {
        self.missing_data_value = Some(value);
        self
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }
}

/// One value a quality can take.
///
/// Equal by value; the caption is display text.
#[derive(Debug, Clone)]
pub struct Category {
    value: Scalar,
    caption: String,
}

impl Category {
    pub fn new(value: Scalar) -> Self {
        let caption = value.to_string();
        Self { value, caption }
    }

    pub fn with_caption(value: Scalar, caption: &str) -> Self {
        Self {
            value,
            caption: caption.to_string(),
        }
    }

    pub fn value(&self) -> &Scalar {
        &self.value
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Categorical value definition.
#[derive(Debug, Clone)]
pub struct Quality {
    caption: String,
    description: String,
    kind: ScalarKind,
    missing_data_value: Option<Scalar>,
    ordered: bool,
    categories: Vec<Category>,
}

impl Quality {
    pub fn new(kind: ScalarKind, caption: &str, description: &str, ordered: bool) -> Self {
        Self {
            caption: caption.to_string(),
            description: description.to_string(),
            kind,
            missing_data_value: None,
            ordered,
            categories: Vec::new(),
        }
    }

    /// Text-valued quality with categories in the given order.
    pub fn text(caption: &str, description: &str, ordered: bool, labels: &[&str]) -> Self {
        let mut quality = Self::new(ScalarKind::Text, caption, description, ordered);
        for label in labels {
            quality.add_category(Category::new(Scalar::from(*label)));
        }
        quality
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Adds a category of the quality's kind; duplicates (by value) and
    /// foreign kinds are rejected.
    pub fn add_category(&mut self, category: Category) -> bool {
        if category.value().kind() != self.kind || self.categories.contains(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }

    pub fn remove_category(&mut self, value: &Scalar) -> Option<Category> {
        let index = self.index_of(value)?;
        Some(self.categories.remove(index))
    }

    pub fn contains(&self, value: &Scalar) -> bool {
        self.index_of(value).is_some()
    }

    pub fn index_of(&self, value: &Scalar) -> Option<usize> {
        self.categories.iter().position(|c| c.value() == value)
    }

    pub fn category_of(&self, value: &Scalar) -> Option<&Category> {
        self.index_of(value).map(|i| &self.categories[i])
    }

    /// Compares two category values by their position. Fails when the
    /// quality is unordered or either value is not one of its categories.
    pub fn compare(&self, a: &Scalar, b: &Scalar) -> Result<Ordering> {
        if !self.ordered {
            return Err(Error::UnorderedQuality {
                caption: self.caption.clone(),
            });
        }
        let ia = self.index_of(a).ok_or_else(|| Error::UnknownCategory {
            caption: self.caption.clone(),
            value: a.clone(),
        })?;
        let ib = self.index_of(b).ok_or_else(|| Error::UnknownCategory {
            caption: self.caption.clone(),
            value: b.clone(),
        })?;
        Ok(ia.cmp(&ib))
    }
}

impl PartialEq for Quality {
    /// Content equality; unordered qualities disregard category order.
    fn eq(&self, other: &Self) -> bool {
        if self.caption != other.caption
            || self.description != other.description
            || self.kind != other.kind
            || self.missing_data_value != other.missing_data_value
            || self.ordered != other.ordered
            || self.categories.len() != other.categories.len()
        {
            return false;
        }
        if self.ordered {
            self.categories == other.categories
        } else {
            self.categories
                .iter()
                .all(|c| other.categories.contains(c))
        }
    }
}

/// Semantic type of the values on an exchange item.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueDefinition {
    Quantity(Quantity),
    Quality(Quality),
}

impl ValueDefinition {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ValueDefinition::Quantity(q) => q.kind,
            ValueDefinition::Quality(q) => q.kind,
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            ValueDefinition::Quantity(q) => &q.caption,
            ValueDefinition::Quality(q) => &q.caption,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ValueDefinition::Quantity(q) => &q.description,
            ValueDefinition::Quality(q) => &q.description,
        }
    }

    /// The sentinel marking absent data, when the definition declares one.
    pub fn missing_data_value(&self) -> Option<&Scalar> {
        match self {
            ValueDefinition::Quantity(q) => q.missing_data_value.as_ref(),
            ValueDefinition::Quality(q) => q.missing_data_value.as_ref(),
        }
    }
}
