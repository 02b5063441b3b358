//! # bevy_terrain_layers
//!
//! Stencil-driven layer compositing for terrain heightmaps, splat maps and
//! detail maps.
//!
//! ## Features
//!
//! - Dense 2D channel grids with an "absent" state for unpopulated channels
//! - Stencils packing an owner key and a strength into one float per cell
//! - Bilinear sampling of channels and stencils in normalized coordinates
//! - Set, Additive and Stencil-weighted blending for float and byte channels
//! - A prioritized layer stack with cached compound views
//! - Tree and object placements with per-layer removals
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_terrain_layers::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(MinimalPlugins)
//!         .add_plugins(TerrainLayersPlugin::default())
//!         .add_systems(Startup, stamp)
//!         .run();
//! }
//!
//! fn stamp(mut stack: ResMut<LayerStack>) {
//!     let base = stack.get_or_create_layer("base", LayerKind::Procedural);
//!     let hill = stack.get_or_create_layer("hill", LayerKind::Authored);
//!
//!     let layer = stack.layer_mut(hill).unwrap();
//!     layer.set_blend_mode(BlendMode::Stencil);
//!     layer.heights_mut().fill(0.25).unwrap();
//!     layer.stencil_mut().fill(StencilValue::encode(1, 0.5)).unwrap();
//!     stack.invalidate_cache(Some(hill));
//!
//!     let rect = URect::new(0, 0, 64, 64);
//!     let heights = stack.resolve_compound_heights(None, true, rect).unwrap();
//!     info!("{heights:?}");
//! }
//! ```

pub mod blend;
pub mod error;
pub mod grid;
pub mod layers;
pub mod sampling;
pub mod settings;
pub mod stencil;
mod plugin;

pub mod prelude {
    pub use crate::blend::{BlendEngine, BlendMode, BlendRegion, EraseRegion};
    pub use crate::error::GridError;
    pub use crate::grid::{ByteOverflow, Grid2D, GridValue};
    pub use crate::layers::{
        DetailId, Layer, LayerId, LayerKind, LayerStack, ObjectInstance, SplatId, TreeInstance,
    };
    pub use crate::plugin::TerrainLayersPlugin;
    pub use crate::sampling::{StencilSampleOptions, resample, sample, stencil_sample};
    pub use crate::settings::{CompositorSettings, LayerResolution};
    pub use crate::stencil::{StencilValue, claim_stencil};
}
