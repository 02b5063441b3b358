//! Terrain layers and the stack that composites them.
//!
//! This module provides:
//! - [`Layer`]: per-layer heights, stencil, splat and detail maps, trees and objects
//! - [`LayerStack`]: ordering, compound resolution and the compound cache
//! - [`TreeInstance`] / [`ObjectInstance`]: sparse placements keyed by [`Uuid`](uuid::Uuid)

mod cache;
mod instances;
mod layer;
mod stack;

pub use instances::{ObjectInstance, TreeInstance};
pub use layer::{DetailId, Layer, LayerId, LayerKind, SplatId};
pub use stack::LayerStack;
