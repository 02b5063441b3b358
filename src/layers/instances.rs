//! Sparse placements carried by layers: trees and arbitrary objects.

use bevy::prelude::*;

/// A tree placement.
///
/// `position` is normalized terrain space: X and Z in `[0, 1]` across the
/// terrain, Y as a fraction of terrain height.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeInstance {
    /// Index of the tree prototype on the target terrain.
    pub prototype: u32,
    pub position: Vec3,
    /// Width and height scale.
    pub scale: Vec2,
    /// Rotation around the vertical axis, in radians.
    pub rotation: f32,
}

impl TreeInstance {
    pub fn new(prototype: u32, position: Vec3) -> Self {
        Self {
            prototype,
            position,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// A placed object, identified by the prefab it instantiates.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectInstance {
    pub prefab: String,
    /// Normalized terrain space, as for [`TreeInstance::position`].
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Snap the object's height to the terrain surface when instantiated.
    pub relative_to_terrain: bool,
}

impl ObjectInstance {
    pub fn new(prefab: impl Into<String>, position: Vec3) -> Self {
        Self {
            prefab: prefab.into(),
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            relative_to_terrain: true,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn absolute(mut self) -> Self {
        self.relative_to_terrain = false;
        self
    }
}
