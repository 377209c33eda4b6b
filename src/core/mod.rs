//! # Core
//!
//! Pure domain types with no graph wiring.
//!
//! Everything in here is value-like: scalars, identities, multidimensional
//! value containers, arguments, value definitions and the notification
//! primitives. The exchange graph in [`crate::engine`] is built on top of
//! these.

pub mod argument;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod notify;
pub mod scalar;
pub mod values;

pub use argument::{Argument, ArgumentSet};
pub use error::{Error, ErrorClass, Result};
pub use identity::Identity;
pub use metadata::{
    BaseDimension, Category, Dimension, Quality, Quantity, Unit, ValueDefinition,
};
pub use notify::{ChangeKind, ChangeNotifier, Changed, Notification, Observer};
pub use scalar::{Scalar, ScalarKind};
pub use values::ValueContainer;
