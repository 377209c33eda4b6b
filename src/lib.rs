//! # Coupler - Exchange Item Graph
//!
//! Coupler links simulation components through typed exchange items:
//! outputs feed inputs, and adapted outputs derive new values from the
//! outputs they are attached to. Replacing an output's values propagates
//! through every attached adapter before the call returns.
//!
//! ## Philosophy
//!
//! - **Links are symmetric** - Connecting either end wires both ends
//! - **Propagation is synchronous** - No queues, no deferred refresh
//! - **Transforms over reflection** - Adapters are explicit trait objects
//! - **Pure core, swappable adapters** - Hexagonal architecture
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        COUPLER                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  CORE (pure domain, no graph wiring)                        │
//! │    Scalar, Identity, ValueContainer, Argument,              │
//! │    ValueDefinition, ChangeNotifier                          │
//! │                                                              │
//! │  PORTS (trait contracts)                                     │
//! │    ExchangeItem, Transform                                   │
//! │                                                              │
//! │  ADAPTERS (built-in transforms)                              │
//! │    Multiplier, Classifier                                    │
//! │                                                              │
//! │  ENGINE (the graph)                                          │
//! │    Component, Input, Output, AdaptedOutput,                 │
//! │    AdapterFactory                                            │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coupler::{AdaptedOutput, ExchangeItem, Input, Multiplier, Output};
//! use coupler::{Scalar, ScalarKind, ValueContainer};
//!
//! // A provider, a consumer, and a scaling adapter in between
//! let output = Output::new("flow", "Flow", "");
//! let input = Input::new("intake", "Intake", "");
//! let scaled = AdaptedOutput::new("flow-x10", "Flow x10", "", Multiplier::boxed(10));
//!
//! scaled.set_adaptee(Some(&output))?;
//! scaled.as_output().add_consumer(&input);
//!
//! // Writing the output recomputes the adapter synchronously
//! let mut values = ValueContainer::dynamic(ScalarKind::Int, 1);
//! values.set(&[0], Scalar::Int(7))?;
//! output.set_values(Some(values))?;
//!
//! assert_eq!(input.provider_values(), scaled.values());
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Core domain - scalars, identities, value containers, arguments,
/// value definitions, change notification
pub mod core;

/// Port definitions - trait contracts
/// Contains: ExchangeItem trait, Transform trait
pub mod ports;

/// Adapter implementations - built-in transforms
/// Contains: multiplier, classify submodules
pub mod adapters;

/// Engine - the exchange graph
/// Contains: Component, Input, Output, AdaptedOutput, AdapterFactory
pub mod engine;

// ============================================================================
// RE-EXPORTS (public API)
// ============================================================================

// Core types
pub use crate::core::{Argument, ArgumentSet, Identity, Scalar, ScalarKind, ValueContainer};
pub use crate::core::{ChangeKind, ChangeNotifier, Changed, Notification, Observer};
pub use crate::core::{Error, ErrorClass, Result};
pub use crate::core::{BaseDimension, Category, Dimension, Quality, Quantity, Unit, ValueDefinition};

// Port traits
pub use crate::ports::{ExchangeItem, Transform};

// Engine
pub use crate::engine::{AdaptedOutput, AdapterFactory, Component, ComponentStatus, Input, Output};

// Built-in adapters
pub use crate::adapters::{Classifier, Multiplier};
