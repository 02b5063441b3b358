//! A single layer of the composition stack.

use std::collections::{BTreeMap, HashMap, HashSet};

use bevy::math::URect;
use bevy::prelude::*;
use uuid::Uuid;

use super::{ObjectInstance, TreeInstance};
use crate::blend::BlendMode;
use crate::error::GridError;
use crate::grid::Grid2D;
use crate::sampling::resample;
use crate::settings::LayerResolution;
use crate::stencil::claim_stencil;

/// Splat map identifier (one texture weight map per terrain material).
pub type SplatId = u32;

/// Detail map identifier (one density map per grass/detail type).
pub type DetailId = u32;

/// Stable handle to a layer in a [`LayerStack`](super::LayerStack).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

/// Where a layer's content comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Painted or stamped by hand.
    #[default]
    Authored,
    /// Regenerated from scratch on every recomposition.
    Procedural,
}

/// One entry in the layer stack.
///
/// A layer owns one grid per channel. Grids start absent and are allocated
/// on first write at the resolution the layer was created with. The stencil
/// shares the heightmap resolution.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    kind: LayerKind,
    blend_mode: BlendMode,
    enabled: bool,
    priority: i32,
    insertion: u64,
    resolution: LayerResolution,

    heights: Grid2D<f32>,
    stencil: Grid2D<f32>,
    splats: BTreeMap<SplatId, Grid2D<u8>>,
    details: BTreeMap<DetailId, Grid2D<u8>>,

    trees: HashMap<Uuid, TreeInstance>,
    tree_removals: HashSet<Uuid>,
    objects: HashMap<Uuid, ObjectInstance>,
    object_removals: HashSet<Uuid>,
}

impl Layer {
    pub(crate) fn new(
        id: LayerId,
        name: String,
        kind: LayerKind,
        insertion: u64,
        resolution: LayerResolution,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            blend_mode: BlendMode::default(),
            enabled: true,
            priority: 0,
            insertion,
            resolution,
            heights: Grid2D::absent(resolution.heights.x, resolution.heights.y),
            stencil: Grid2D::absent(resolution.heights.x, resolution.heights.y),
            splats: BTreeMap::new(),
            details: BTreeMap::new(),
            trees: HashMap::new(),
            tree_removals: HashSet::new(),
            objects: HashMap::new(),
            object_removals: HashSet::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Stack ordering key: priority first, then insertion order.
    pub(crate) fn order(&self) -> (i32, u64) {
        (self.priority, self.insertion)
    }

    #[inline]
    pub fn resolution(&self) -> LayerResolution {
        self.resolution
    }

    /// Wipes every channel back to absent.
    pub fn clear(&mut self) {
        let res = self.resolution;
        self.heights.reset(res.heights.x, res.heights.y);
        self.stencil.reset(res.heights.x, res.heights.y);
        self.splats.clear();
        self.details.clear();
        self.trees.clear();
        self.tree_removals.clear();
        self.objects.clear();
        self.object_removals.clear();
    }

    /// Adopts a new resolution, wiping the layer.
    pub(crate) fn set_resolution(&mut self, resolution: LayerResolution) {
        self.resolution = resolution;
        self.clear();
    }

    // =========================================================================
    // Heights and stencil
    // =========================================================================

    pub fn heights(&self) -> &Grid2D<f32> {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut Grid2D<f32> {
        &mut self.heights
    }

    /// Writes `heights` with its origin at `(x, z)`.
    pub fn write_heights(&mut self, x: u32, z: u32, heights: &Grid2D<f32>) -> Result<(), GridError> {
        self.heights.paste(x, z, heights)
    }

    pub fn stencil(&self) -> &Grid2D<f32> {
        &self.stencil
    }

    pub fn stencil_mut(&mut self) -> &mut Grid2D<f32> {
        &mut self.stencil
    }

    /// Writes raw encoded stencil values with their origin at `(x, z)`.
    pub fn write_stencil(&mut self, x: u32, z: u32, stencil: &Grid2D<f32>) -> Result<(), GridError> {
        self.stencil.paste(x, z, stencil)
    }

    /// Claims stencil cells for `key`; see [`claim_stencil`].
    pub fn claim_stencil(
        &mut self,
        x: u32,
        z: u32,
        strengths: &Grid2D<f32>,
        key: i32,
        ignore_negative_keys: bool,
    ) -> Result<usize, GridError> {
        claim_stencil(&mut self.stencil, x, z, strengths, key, ignore_negative_keys)
    }

    /// Heights of a rectangle resampled to `target` resolution.
    pub fn query_heights(&self, rect: URect, target: UVec2) -> Result<Grid2D<f32>, GridError> {
        let size = rect.size();
        resample(&self.heights, rect.min.x, rect.min.y, size.x, size.y, target)
    }

    // =========================================================================
    // Splats and details
    // =========================================================================

    pub fn splat(&self, id: SplatId) -> Option<&Grid2D<u8>> {
        self.splats.get(&id)
    }

    /// The splat map for `id`, created absent if the layer has none yet.
    pub fn splat_mut(&mut self, id: SplatId) -> &mut Grid2D<u8> {
        let size = self.resolution.splats;
        self.splats
            .entry(id)
            .or_insert_with(|| Grid2D::absent(size.x, size.y))
    }

    pub fn write_splat(
        &mut self,
        id: SplatId,
        x: u32,
        z: u32,
        weights: &Grid2D<u8>,
    ) -> Result<(), GridError> {
        self.splat_mut(id).paste(x, z, weights)
    }

    pub fn splat_ids(&self) -> impl Iterator<Item = SplatId> + '_ {
        self.splats.keys().copied()
    }

    /// Splat weights of a rectangle resampled to `target`. Missing maps read as absent.
    pub fn query_splat(
        &self,
        id: SplatId,
        rect: URect,
        target: UVec2,
    ) -> Result<Grid2D<u8>, GridError> {
        let size = rect.size();
        match self.splats.get(&id) {
            Some(grid) => resample(grid, rect.min.x, rect.min.y, size.x, size.y, target),
            None => Ok(Grid2D::absent(target.x, target.y)),
        }
    }

    pub fn detail(&self, id: DetailId) -> Option<&Grid2D<u8>> {
        self.details.get(&id)
    }

    /// The detail map for `id`, created absent if the layer has none yet.
    pub fn detail_mut(&mut self, id: DetailId) -> &mut Grid2D<u8> {
        let size = self.resolution.details;
        self.details
            .entry(id)
            .or_insert_with(|| Grid2D::absent(size.x, size.y))
    }

    pub fn write_detail(
        &mut self,
        id: DetailId,
        x: u32,
        z: u32,
        densities: &Grid2D<u8>,
    ) -> Result<(), GridError> {
        self.detail_mut(id).paste(x, z, densities)
    }

    pub fn detail_ids(&self) -> impl Iterator<Item = DetailId> + '_ {
        self.details.keys().copied()
    }

    /// Detail densities of a rectangle resampled to `target`. Missing maps read as absent.
    pub fn query_detail(
        &self,
        id: DetailId,
        rect: URect,
        target: UVec2,
    ) -> Result<Grid2D<u8>, GridError> {
        let size = rect.size();
        match self.details.get(&id) {
            Some(grid) => resample(grid, rect.min.x, rect.min.y, size.x, size.y, target),
            None => Ok(Grid2D::absent(target.x, target.y)),
        }
    }

    // =========================================================================
    // Trees and objects
    // =========================================================================

    pub fn trees(&self) -> &HashMap<Uuid, TreeInstance> {
        &self.trees
    }

    pub fn tree_removals(&self) -> &HashSet<Uuid> {
        &self.tree_removals
    }

    /// Places a tree under a fresh id.
    pub fn add_tree(&mut self, tree: TreeInstance) -> Uuid {
        let id = Uuid::new_v4();
        self.trees.insert(id, tree);
        id
    }

    pub fn insert_tree(&mut self, id: Uuid, tree: TreeInstance) {
        self.tree_removals.remove(&id);
        self.trees.insert(id, tree);
    }

    /// Removes `id` from this layer and from every layer beneath it when composited.
    pub fn remove_tree(&mut self, id: Uuid) {
        self.trees.remove(&id);
        self.tree_removals.insert(id);
    }

    pub fn objects(&self) -> &HashMap<Uuid, ObjectInstance> {
        &self.objects
    }

    pub fn object_removals(&self) -> &HashSet<Uuid> {
        &self.object_removals
    }

    /// Places an object under a fresh id.
    pub fn add_object(&mut self, object: ObjectInstance) -> Uuid {
        let id = Uuid::new_v4();
        self.objects.insert(id, object);
        id
    }

    pub fn insert_object(&mut self, id: Uuid, object: ObjectInstance) {
        self.object_removals.remove(&id);
        self.objects.insert(id, object);
    }

    /// Removes `id` from this layer and from every layer beneath it when composited.
    pub fn remove_object(&mut self, id: Uuid) {
        self.objects.remove(&id);
        self.object_removals.insert(id);
    }
}
