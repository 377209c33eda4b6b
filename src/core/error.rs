//! # Errors
//!
//! Every fault in this crate is one of three classes:
//!
//! - **Validation** - rank/kind mismatches, constrained argument writes,
//!   category comparisons on unordered or foreign values.
//! - **Configuration** - unknown or incomplete adapter registrations.
//! - **State** - operations that would corrupt the graph (adaptee cycles).
//!
//! Errors are raised synchronously to the immediate caller. Validation runs
//! before any mutation, so a failed write leaves its target unchanged.

use crate::core::scalar::{Scalar, ScalarKind};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error taxonomy, see [`Error::class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Configuration,
    State,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("got {got} indices for a container of rank {expected}")]
    RankMismatch { expected: usize, got: usize },

    #[error("cannot store a {got} value in a {expected} container")]
    KindMismatch { expected: ScalarKind, got: ScalarKind },

    #[error("index {index} exceeds extent {extent} on axis {axis}")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        extent: usize,
    },

    #[error("dense containers have a fixed shape")]
    FixedShape,

    #[error("argument `{id}` is read only")]
    ReadOnlyArgument { id: String },

    #[error("value {value} is not among the possible values of argument `{id}`")]
    DisallowedValue { id: String, value: Scalar },

    #[error("categories of the unordered quality `{caption}` cannot be compared")]
    UnorderedQuality { caption: String },

    #[error("value {value} is not a category of quality `{caption}`")]
    UnknownCategory { caption: String, value: Scalar },

    #[error("no adapter registered under id `{id}`")]
    UnknownAdapter { id: String },

    #[error("adapter `{id}` requires an argument `{argument}` that is not present")]
    MissingArgument { id: String, argument: String },

    #[error("adapter `{id}` would become its own adaptee")]
    AdapteeCycle { id: String },
}

impl Error {
    /// Maps a concrete error onto the crate's three-way taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::RankMismatch { .. }
            | Error::KindMismatch { .. }
            | Error::IndexOutOfRange { .. }
            | Error::FixedShape
            | Error::ReadOnlyArgument { .. }
            | Error::DisallowedValue { .. }
            | Error::UnorderedQuality { .. }
            | Error::UnknownCategory { .. } => ErrorClass::Validation,
            Error::UnknownAdapter { .. } | Error::MissingArgument { .. } => {
                ErrorClass::Configuration
            }
            Error::AdapteeCycle { .. } => ErrorClass::State,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let e = Error::RankMismatch {
            expected: 2,
            got: 1,
        };
        assert_eq!(e.class(), ErrorClass::Validation);

        let e = Error::UnknownAdapter {
            id: "x".to_string(),
        };
        assert_eq!(e.class(), ErrorClass::Configuration);

        let e = Error::AdapteeCycle {
            id: "a".to_string(),
        };
        assert_eq!(e.class(), ErrorClass::State);
    }

    #[test]
    fn test_error_messages() {
        let e = Error::KindMismatch {
            expected: ScalarKind::Int,
            got: ScalarKind::Text,
        };
        assert_eq!(e.to_string(), "cannot store a text value in a int container");
    }
}
