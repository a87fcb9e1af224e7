//! Ray representation for 3D ray tracing.
//!
//! A ray is defined as r(t) = origin + t * direction with a unit direction,
//! so that intersection distances are Euclidean distances.

use glam::Vec3A;

/// Ray in 3D space defined by origin and unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3A,
    direction: Vec3A,
}

impl Ray {
    /// Creates a new ray; the direction is normalized on construction
    /// (a zero direction stays zero).
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Starting point of the ray in world coordinates.
    pub fn origin(&self) -> Vec3A {
        self.origin
    }

    /// Unit direction of the ray.
    pub fn direction(&self) -> Vec3A {
        self.direction
    }

    /// Shifts the ray origin. Secondary rays are biased off the surface they
    /// leave by a small multiple of the normal to avoid acne.
    pub fn add_offset(&mut self, offset: Vec3A) {
        self.origin += offset;
    }
}

#[test]
fn direction_is_normalized() {
    let ray = Ray::new(Vec3A::ZERO, Vec3A::new(3.0, -4.0, 12.0));
    assert!((ray.direction().length() - 1.0).abs() < 1e-6);
}

#[test]
fn zero_direction_stays_zero() {
    let ray = Ray::new(Vec3A::ONE, Vec3A::ZERO);
    assert_eq!(ray.direction(), Vec3A::ZERO);
}

#[test]
fn offset_moves_origin_only() {
    let mut ray = Ray::new(Vec3A::ZERO, Vec3A::Z);
    let dir = ray.direction();
    ray.add_offset(Vec3A::new(0.0, 0.5, 0.0));
    assert_eq!(ray.origin(), Vec3A::new(0.0, 0.5, 0.0));
    assert_eq!(ray.direction(), dir);
}
