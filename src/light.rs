//! Light sources.

use glam::{Vec3A, Vec4};

/// Kind of light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Directional light; `position` stores the direction the light shines
    /// in.
    Parallel,
    /// Point light; `position` is its world-space location.
    Point,
}

/// A light source with an RGBA emission power.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    kind: LightType,
    position: Vec3A,
    power: Vec4,
}

impl Light {
    /// Creates a light. For parallel lights `position` carries the
    /// direction.
    pub fn new(kind: LightType, position: Vec3A, power: Vec4) -> Self {
        Self {
            kind,
            position,
            power,
        }
    }

    /// The light's kind.
    pub fn kind(&self) -> LightType {
        self.kind
    }

    /// World position (point lights).
    pub fn position(&self) -> Vec3A {
        self.position
    }

    /// Shining direction (parallel lights).
    pub fn direction(&self) -> Vec3A {
        self.position
    }

    /// Emission power.
    pub fn power(&self) -> Vec4 {
        self.power
    }
}
