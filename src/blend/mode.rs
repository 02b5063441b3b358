use bevy::math::{UVec2, Vec2};

/// How an incoming grid is combined with the grid beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Incoming values replace the base.
    #[default]
    Set,
    /// Incoming values are added to the base.
    Additive,
    /// Base and incoming are lerped by the decoded stencil strength.
    Stencil,
}

/// Placement of a blended rectangle inside the full channel canvas.
///
/// The canvas size is needed to normalize cell positions before sampling a
/// stencil, which may have a different resolution than the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendRegion {
    /// Top-left cell of the rectangle in canvas cells.
    pub offset: UVec2,
    /// Rectangle size in cells. Both base and incoming must have this size.
    pub size: UVec2,
    /// Full canvas size in cells.
    pub total: UVec2,
}

impl BlendRegion {
    pub const fn new(offset: UVec2, size: UVec2, total: UVec2) -> Self {
        Self {
            offset,
            size,
            total,
        }
    }

    /// A region covering the whole canvas.
    pub const fn full(total: UVec2) -> Self {
        Self::new(UVec2::ZERO, total, total)
    }

    /// Normalized canvas position of cell `(u, v)` of the rectangle.
    #[inline]
    pub(crate) fn uv(&self, u: u32, v: u32) -> Vec2 {
        normalize(self.offset.as_vec2() + Vec2::new(u as f32, v as f32), self.total)
    }
}

/// Canvas span covered by a grid passed to
/// [`BlendEngine::erase_with_stencil`](super::BlendEngine::erase_with_stencil).
///
/// The first cell of the grid maps to `min` and the last to `max`, both
/// inclusive, in canvas cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EraseRegion {
    pub min: Vec2,
    pub max: Vec2,
    pub total: UVec2,
}

impl EraseRegion {
    pub const fn new(min: Vec2, max: Vec2, total: UVec2) -> Self {
        Self { min, max, total }
    }

    /// Normalized canvas position of cell `(u, v)` of a grid of size `dims`.
    #[inline]
    pub(crate) fn uv(&self, u: u32, v: u32, dims: UVec2) -> Vec2 {
        let t = Vec2::new(
            u as f32 / dims.x.saturating_sub(1).max(1) as f32,
            v as f32 / dims.y.saturating_sub(1).max(1) as f32,
        );
        normalize(self.min + (self.max - self.min) * t, self.total)
    }
}

#[inline]
fn normalize(cell: Vec2, total: UVec2) -> Vec2 {
    let span = Vec2::new(
        total.x.saturating_sub(1).max(1) as f32,
        total.y.saturating_sub(1).max(1) as f32,
    );
    cell / span
}
