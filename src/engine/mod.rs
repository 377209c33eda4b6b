//! # Engine
//!
//! The exchange graph itself: components, the items linked between them,
//! and the factory that wires adapted outputs in.

pub mod component;
pub mod exchange;
pub mod factory;

pub use component::{Component, ComponentStatus};
pub use exchange::{AdaptedOutput, Input, Output};
pub use factory::AdapterFactory;
