//! Compositor configuration.

use bevy::prelude::*;

use crate::blend::BlendEngine;
use crate::grid::ByteOverflow;
use crate::sampling::{MIN_STENCIL_CONTRIBUTION, StencilSampleOptions};

/// Per-channel grid resolution of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerResolution {
    /// Heightmap resolution. Stencils share it.
    pub heights: UVec2,
    /// Resolution of every splat (texture weight) map.
    pub splats: UVec2,
    /// Resolution of every detail density map.
    pub details: UVec2,
}

impl LayerResolution {
    /// Uses the same resolution for every channel.
    pub const fn uniform(size: UVec2) -> Self {
        Self {
            heights: size,
            splats: size,
            details: size,
        }
    }
}

impl Default for LayerResolution {
    fn default() -> Self {
        Self {
            heights: UVec2::splat(513),
            splats: UVec2::splat(512),
            details: UVec2::splat(512),
        }
    }
}

/// Settings shared by every blend the [`LayerStack`](crate::layers::LayerStack) performs.
#[derive(Resource, Clone, Debug)]
pub struct CompositorSettings {
    /// Channel resolutions given to newly created layers.
    pub resolution: LayerResolution,

    /// Treat stencil cells owned by keys below 1 as unclaimed when layers
    /// are composited.
    /// Default: false
    pub ignore_negative_keys: bool,

    /// Weighted stencil strengths below this sample as zero.
    /// Default: 0.01
    pub min_stencil_contribution: f32,

    /// Overflow policy for additive blends on byte channels.
    /// Default: [`ByteOverflow::Saturate`]
    pub byte_overflow: ByteOverflow,

    /// Keep flattened results per terminating layer until invalidated.
    /// Default: true
    pub cache_compounds: bool,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            resolution: LayerResolution::default(),
            ignore_negative_keys: false,
            min_stencil_contribution: MIN_STENCIL_CONTRIBUTION,
            byte_overflow: ByteOverflow::Saturate,
            cache_compounds: true,
        }
    }
}

impl CompositorSettings {
    pub fn with_resolution(mut self, resolution: LayerResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_ignore_negative_keys(mut self, ignore: bool) -> Self {
        self.ignore_negative_keys = ignore;
        self
    }

    pub fn with_byte_overflow(mut self, overflow: ByteOverflow) -> Self {
        self.byte_overflow = overflow;
        self
    }

    pub fn with_compound_cache(mut self, enabled: bool) -> Self {
        self.cache_compounds = enabled;
        self
    }

    /// Builds the blend engine these settings describe.
    pub fn blend_engine(&self) -> BlendEngine {
        BlendEngine::new(
            self.byte_overflow,
            StencilSampleOptions {
                key_filter: None,
                ignore_negative_keys: self.ignore_negative_keys,
                min_contribution: self.min_stencil_contribution,
            },
        )
    }
}
