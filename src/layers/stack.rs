//! The ordered layer stack and compound resolution.

use std::collections::{HashMap, HashSet};

use bevy::math::URect;
use bevy::prelude::*;
use uuid::Uuid;

use super::cache::{CompoundCache, CompoundKey};
use super::{DetailId, Layer, LayerId, LayerKind, ObjectInstance, SplatId, TreeInstance};
use crate::blend::{BlendEngine, BlendMode, BlendRegion};
use crate::error::GridError;
use crate::grid::{Grid2D, GridValue};
use crate::settings::{CompositorSettings, LayerResolution};

/// An ordered stack of terrain layers.
///
/// Layers are ordered bottom to top by priority, then by insertion order.
/// A *compound* view of a channel is the result of blending every enabled
/// layer from the bottom of the stack up to a terminating layer, each with
/// its own [`BlendMode`] and stencil.
///
/// Compound views are cached per terminating layer. The cache is not
/// invalidated by writes into a layer: whoever writes a layer must call
/// [`invalidate_cache`](Self::invalidate_cache) for it once the writes are
/// done, or later resolutions will read the stale flattening. Structural
/// changes (adding, removing, reordering or toggling layers) clear the whole
/// cache.
///
/// # Example
///
/// ```
/// use bevy::math::{URect, UVec2};
/// use bevy_terrain_layers::prelude::*;
///
/// let settings = CompositorSettings::default()
///     .with_resolution(LayerResolution::uniform(UVec2::splat(3)));
/// let mut stack = LayerStack::new(settings);
///
/// let base = stack.get_or_create_layer("base", LayerKind::Authored);
/// stack
///     .layer_mut(base)
///     .unwrap()
///     .heights_mut()
///     .fill(10.0)
///     .unwrap();
///
/// let heights = stack
///     .resolve_compound_heights(None, true, URect::new(0, 0, 3, 3))
///     .unwrap();
/// assert!(heights.iter().all(|&h| h == 10.0));
/// ```
#[derive(Resource, Debug)]
pub struct LayerStack {
    settings: CompositorSettings,
    engine: BlendEngine,
    /// Bottom to top.
    layers: Vec<Layer>,
    next_id: u64,
    cache: CompoundCache,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new(CompositorSettings::default())
    }
}

impl LayerStack {
    pub fn new(settings: CompositorSettings) -> Self {
        Self {
            engine: settings.blend_engine(),
            settings,
            layers: Vec::new(),
            next_id: 0,
            cache: CompoundCache::default(),
        }
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    pub fn engine(&self) -> &BlendEngine {
        &self.engine
    }

    pub fn resolution(&self) -> LayerResolution {
        self.settings.resolution
    }

    /// Changes the channel resolution of the whole stack, wiping every layer.
    pub fn set_resolution(&mut self, resolution: LayerResolution) {
        if self.settings.resolution == resolution {
            return;
        }
        debug!("layer stack resolution changed to {resolution:?}");
        self.settings.resolution = resolution;
        for layer in &mut self.layers {
            layer.set_resolution(resolution);
        }
        self.cache.clear();
    }

    // =========================================================================
    // Layer management
    // =========================================================================

    /// Returns the layer named `name`, creating it on top of its priority
    /// band if it does not exist yet.
    pub fn get_or_create_layer(&mut self, name: &str, kind: LayerKind) -> LayerId {
        if let Some(layer) = self.layer_by_name(name) {
            return layer.id();
        }
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push(Layer::new(
            id,
            name.to_owned(),
            kind,
            id.0,
            self.settings.resolution,
        ));
        self.sort();
        self.cache.clear();
        debug!("created {kind:?} layer '{name}' ({id:?})");
        id
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Mutable access to a layer's channels.
    ///
    /// Writes made through this reference do not invalidate cached compound
    /// views; see [`invalidate_cache`](Self::invalidate_cache).
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.position(id)?;
        let layer = self.layers.remove(index);
        self.cache.clear();
        debug!("removed layer '{}' ({id:?})", layer.name());
        Some(layer)
    }

    /// Moves a layer within the stack. Returns `false` if it does not exist.
    pub fn set_priority(&mut self, id: LayerId, priority: i32) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            return false;
        };
        layer.set_priority(priority);
        self.sort();
        self.cache.clear();
        true
    }

    /// Enables or disables a layer. Returns `false` if it does not exist.
    pub fn set_enabled(&mut self, id: LayerId, enabled: bool) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            return false;
        };
        if layer.enabled() != enabled {
            layer.set_enabled(enabled);
            self.cache.clear();
        }
        true
    }

    /// Layer ids from the bottom of the stack to the top.
    pub fn ordered_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(Layer::id).collect()
    }

    /// Layers from the bottom of the stack to the top.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wipes every layer and the compound cache before a full recomposition.
    pub fn begin_recomposition(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
        self.cache.clear();
        debug!("cleared {} layers for recomposition", self.layers.len());
    }

    fn sort(&mut self) {
        self.layers.sort_by_key(Layer::order);
    }

    fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    // =========================================================================
    // Compound cache
    // =========================================================================

    /// Drops cached compound views terminating at `layer` (`None` is the
    /// whole-stack view).
    ///
    /// Call this as soon as `layer` has finished writing.
    pub fn invalidate_cache(&mut self, layer: Option<LayerId>) {
        if self.cache.invalidate(layer) {
            debug!("invalidated compound views for {layer:?}");
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // =========================================================================
    // Compound resolution
    // =========================================================================

    /// Flattened heights inside `rect` (heightmap cells).
    ///
    /// Blends every enabled layer from the bottom of the stack up to
    /// `terminating`, including it if `include_terminating` is set. `None`
    /// flattens the whole stack.
    pub fn resolve_compound_heights(
        &mut self,
        terminating: Option<LayerId>,
        include_terminating: bool,
        rect: URect,
    ) -> Result<Grid2D<f32>, GridError> {
        let canvas = self.settings.resolution.heights;
        let layers = walk(&self.layers, terminating, include_terminating)?;
        if !self.settings.cache_compounds {
            return composite(&self.engine, layers, rect, canvas, |l| Some(l.heights()));
        }

        let key = CompoundKey {
            terminating,
            include_terminating,
        };
        let view = self.cache.view_mut(key);
        // Borrow the full flattening out of the cache, then put it back after selecting
        let full = match view.heights.take() {
            Some(full) => full,
            None => {
                debug!("flattening heights up to {terminating:?}");
                composite(&self.engine, layers, canvas_rect(canvas), canvas, |l| {
                    Some(l.heights())
                })?
            }
        };
        let selected = select_rect(&full, rect);
        view.heights = Some(full);
        selected
    }

    /// Flattened weights of splat map `splat` inside `rect` (splat cells).
    pub fn resolve_compound_splat(
        &mut self,
        terminating: Option<LayerId>,
        include_terminating: bool,
        splat: SplatId,
        rect: URect,
    ) -> Result<Grid2D<u8>, GridError> {
        let canvas = self.settings.resolution.splats;
        let layers = walk(&self.layers, terminating, include_terminating)?;
        if !self.settings.cache_compounds {
            return composite(&self.engine, layers, rect, canvas, |l| l.splat(splat));
        }

        let key = CompoundKey {
            terminating,
            include_terminating,
        };
        let view = self.cache.view_mut(key);
        let full = match view.splats.remove(&splat) {
            Some(full) => full,
            None => {
                debug!("flattening splat {splat} up to {terminating:?}");
                composite(&self.engine, layers, canvas_rect(canvas), canvas, |l| {
                    l.splat(splat)
                })?
            }
        };
        let selected = select_rect(&full, rect);
        view.splats.insert(splat, full);
        selected
    }

    /// Flattened densities of detail map `detail` inside `rect` (detail cells).
    pub fn resolve_compound_detail(
        &mut self,
        terminating: Option<LayerId>,
        include_terminating: bool,
        detail: DetailId,
        rect: URect,
    ) -> Result<Grid2D<u8>, GridError> {
        let canvas = self.settings.resolution.details;
        let layers = walk(&self.layers, terminating, include_terminating)?;
        if !self.settings.cache_compounds {
            return composite(&self.engine, layers, rect, canvas, |l| l.detail(detail));
        }

        let key = CompoundKey {
            terminating,
            include_terminating,
        };
        let view = self.cache.view_mut(key);
        let full = match view.details.remove(&detail) {
            Some(full) => full,
            None => {
                debug!("flattening detail {detail} up to {terminating:?}");
                composite(&self.engine, layers, canvas_rect(canvas), canvas, |l| {
                    l.detail(detail)
                })?
            }
        };
        let selected = select_rect(&full, rect);
        view.details.insert(detail, full);
        selected
    }

    /// Flattened tree placements.
    ///
    /// Each layer first deletes the ids in its removal list from what the
    /// layers beneath placed, then adds its own trees.
    pub fn resolve_compound_trees(
        &mut self,
        terminating: Option<LayerId>,
        include_terminating: bool,
    ) -> Result<HashMap<Uuid, TreeInstance>, GridError> {
        let layers = walk(&self.layers, terminating, include_terminating)?;
        if !self.settings.cache_compounds {
            return Ok(composite_instances(layers, Layer::trees, Layer::tree_removals));
        }

        let view = self.cache.view_mut(CompoundKey {
            terminating,
            include_terminating,
        });
        let trees = view
            .trees
            .get_or_insert_with(|| composite_instances(layers, Layer::trees, Layer::tree_removals));
        Ok(trees.clone())
    }

    /// Flattened object placements, with the same removal rules as trees.
    pub fn resolve_compound_objects(
        &mut self,
        terminating: Option<LayerId>,
        include_terminating: bool,
    ) -> Result<HashMap<Uuid, ObjectInstance>, GridError> {
        let layers = walk(&self.layers, terminating, include_terminating)?;
        if !self.settings.cache_compounds {
            return Ok(composite_instances(
                layers,
                Layer::objects,
                Layer::object_removals,
            ));
        }

        let view = self.cache.view_mut(CompoundKey {
            terminating,
            include_terminating,
        });
        let objects = view.objects.get_or_insert_with(|| {
            composite_instances(layers, Layer::objects, Layer::object_removals)
        });
        Ok(objects.clone())
    }
}

/// The layers a compound resolution walks over, bottom to top.
fn walk(
    layers: &[Layer],
    terminating: Option<LayerId>,
    include_terminating: bool,
) -> Result<&[Layer], GridError> {
    let Some(id) = terminating else {
        return Ok(layers);
    };
    let position = layers
        .iter()
        .position(|l| l.id() == id)
        .ok_or_else(|| GridError::InvalidArgument(format!("{id:?} is not in the layer stack")))?;
    let end = if include_terminating {
        position + 1
    } else {
        position
    };
    Ok(&layers[..end])
}

fn canvas_rect(canvas: UVec2) -> URect {
    URect::from_corners(UVec2::ZERO, canvas)
}

fn select_rect<T: GridValue>(grid: &Grid2D<T>, rect: URect) -> Result<Grid2D<T>, GridError> {
    let size = rect.size();
    grid.select(rect.min.x, rect.min.y, size.x, size.y)
}

/// Blends one channel of `layers` over `rect`, bottom to top.
fn composite<T, F>(
    engine: &BlendEngine,
    layers: &[Layer],
    rect: URect,
    canvas: UVec2,
    channel: F,
) -> Result<Grid2D<T>, GridError>
where
    T: GridValue,
    F: Fn(&Layer) -> Option<&Grid2D<T>>,
{
    let size = rect.size();
    let region = BlendRegion::new(rect.min, size, canvas);
    let mut result = Grid2D::absent(size.x, size.y);

    for layer in layers.iter().filter(|l| l.enabled()) {
        // Layer never wrote this channel
        let Some(grid) = channel(layer) else {
            continue;
        };
        if grid.size() != canvas {
            return Err(GridError::shape(canvas, grid.size()));
        }
        let incoming = select_rect(grid, rect)?;
        let mode = layer.blend_mode();
        // Only stencil blends read the stencil; Set and Additive cover the whole rect
        let stencil = (mode == BlendMode::Stencil).then(|| layer.stencil());
        engine.blend_into(&mut result, &incoming, stencil, mode, &region)?;
        trace!("blended layer '{}' ({mode:?})", layer.name());
    }
    Ok(result)
}

fn composite_instances<I: Clone>(
    layers: &[Layer],
    added: fn(&Layer) -> &HashMap<Uuid, I>,
    removed: fn(&Layer) -> &HashSet<Uuid>,
) -> HashMap<Uuid, I> {
    let mut out = HashMap::new();
    for layer in layers.iter().filter(|l| l.enabled()) {
        // Removals only hit what lower layers placed
        for id in removed(layer) {
            out.remove(id);
        }
        out.extend(added(layer).iter().map(|(id, item)| (*id, item.clone())));
    }
    out
}
