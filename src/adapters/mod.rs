//! # Adapters
//!
//! Ready-made [`Transform`](crate::ports::Transform) implementations.
//!
//! These are the built-in adaptation algorithms; anything else plugs in
//! through the same trait and registers with the factory the same way.

pub mod classify;
pub mod multiplier;

pub use classify::Classifier;
pub use multiplier::Multiplier;
