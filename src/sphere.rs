//! Sphere primitive.
//!
//! Rays are transformed into object space and intersected by solving the
//! quadratic that results from combining the parametric ray with the
//! implicit sphere equation.

use std::f32::consts::PI;

use glam::{Vec2, Vec3A};

use crate::math::INFINITE;
use crate::object::{Intersection, ObjectTransform};
use crate::ray::Ray;

/// Sphere defined by center and radius in object space, plus the transforms
/// between object and world space.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3A,
    radius: f32,
    transform: ObjectTransform,
}

impl Sphere {
    /// Creates a new sphere.
    pub fn new(center: Vec3A, radius: f32, transform: ObjectTransform) -> Self {
        Self {
            center,
            radius,
            transform,
        }
    }

    /// Nearest intersection along the ray within `max_distance`.
    ///
    /// The test runs in object space; the reported point, normal and
    /// distance are transformed back to world space. The texture coordinate
    /// is the equirectangular projection of the object-space normal.
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<Intersection> {
        let object_origin = self.transform.world2object.transform_point3a(ray.origin());
        let object_direction = self
            .transform
            .world2object
            .transform_vector3a(ray.direction())
            .normalize_or_zero();
        // The distance bound has to be transformed alongside the ray.
        let object_max_distance = if max_distance != INFINITE {
            let far = ray.origin() + ray.direction() * max_distance;
            (object_origin - self.transform.world2object.transform_point3a(far)).length()
        } else {
            INFINITE
        };

        // a of the quadratic is 1 for a unit direction
        let oc = object_origin - self.center;
        let b = oc.dot(object_direction);
        let c = oc.dot(oc) - self.radius * self.radius;
        let h = b * b - c;
        if h < 0.0 {
            return None;
        }
        // try the smaller root first
        let mut distance = -b - h.sqrt();
        if distance > object_max_distance {
            return None;
        }
        if distance < 0.0 {
            // ray origin is inside or past the sphere
            distance = -b + h.sqrt();
            if distance < 0.0 || distance > object_max_distance {
                return None;
            }
        }

        let object_point = object_origin + object_direction * distance;
        let object_normal = (object_point - self.center).normalize_or_zero();
        let texture_uv = Vec2::new(
            0.5 + object_normal.x.atan2(object_normal.z) / (2.0 * PI),
            0.5 - object_normal.y.asin() / PI,
        );
        let point = self.transform.object2world.transform_point3a(object_point);
        Some(Intersection {
            distance: (ray.origin() - point).length(),
            point,
            normal: (self.transform.object2world_normals * object_normal).normalize_or_zero(),
            texture_uv,
            photon_uv: texture_uv,
        })
    }
}

#[cfg(test)]
use glam::{Affine3A, Vec3};

#[test]
fn hit_from_outside_reports_world_distance() {
    let sphere = Sphere::new(Vec3A::ZERO, 1.0, ObjectTransform::default());
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 4.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = sphere.intersect(&ray, INFINITE).unwrap();
    assert!((hit.distance - 3.0).abs() < 1e-4);
    assert!((hit.distance - (hit.point - ray.origin()).length()).abs() < 1e-3);
    assert!((hit.normal - Vec3A::Z).length() < 1e-4);
}

#[test]
fn hit_from_inside_takes_far_root() {
    let sphere = Sphere::new(Vec3A::ZERO, 2.0, ObjectTransform::default());
    let ray = Ray::new(Vec3A::ZERO, Vec3A::X);
    let hit = sphere.intersect(&ray, INFINITE).unwrap();
    assert!((hit.distance - 2.0).abs() < 1e-4);
}

#[test]
fn sphere_behind_origin_misses() {
    let sphere = Sphere::new(Vec3A::ZERO, 1.0, ObjectTransform::default());
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 4.0), Vec3A::Z);
    assert!(sphere.intersect(&ray, INFINITE).is_none());
}

#[test]
fn max_distance_cuts_off_hits() {
    let sphere = Sphere::new(Vec3A::ZERO, 1.0, ObjectTransform::default());
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 4.0), Vec3A::new(0.0, 0.0, -1.0));
    assert!(sphere.intersect(&ray, 2.0).is_none());
    assert!(sphere.intersect(&ray, 3.5).is_some());
}

#[test]
fn equirectangular_texture_coordinates() {
    let sphere = Sphere::new(Vec3A::ZERO, 1.0, ObjectTransform::default());
    // hit at (0, 0, 1): normal +z, so u = 0.5 and v = 0.5
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 4.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = sphere.intersect(&ray, INFINITE).unwrap();
    assert!((hit.texture_uv - Vec2::splat(0.5)).length() < 1e-4);
    // hit at the north pole: v = 0
    let ray = Ray::new(Vec3A::new(0.0, 4.0, 0.0), Vec3A::new(0.0, -1.0, 0.0));
    let hit = sphere.intersect(&ray, INFINITE).unwrap();
    assert!(hit.texture_uv.y.abs() < 1e-3);
}

#[test]
fn scaled_sphere_reports_world_space_hit() {
    // object space unit sphere, scaled 2x in world space
    let object2world = Affine3A::from_scale(Vec3::splat(2.0));
    let transform = ObjectTransform {
        world2object: object2world.inverse(),
        object2world,
        object2world_normals: glam::Mat3A::from_diagonal(Vec3::splat(0.5)),
    };
    let sphere = Sphere::new(Vec3A::ZERO, 1.0, transform);
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 6.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = sphere.intersect(&ray, INFINITE).unwrap();
    assert!((hit.distance - 4.0).abs() < 1e-3);
    assert!((hit.point - Vec3A::new(0.0, 0.0, 2.0)).length() < 1e-3);
    assert!((hit.normal - Vec3A::Z).length() < 1e-4);
}
