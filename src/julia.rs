//! Quaternion Julia set primitive.
//!
//! The set iterates z ← z² + c over the quaternions, sliced by fixing the
//! fourth component at a cut plane. Rays are marched with a conservative
//! distance estimator (Douady–Hubbard potential over the gradient, halved),
//! and normals come from central differences of the same estimator.

use glam::{Vec2, Vec3A, Vec4};

use crate::math::EPSILON;
use crate::object::{Intersection, ObjectTransform};
use crate::ray::Ray;

const INTERSECT_SEARCH_ITERATIONS: u32 = 10240;
const INTERSECT_SEARCH_CONVERGENCE_LIMIT: f32 = 1e-4;
const INTERSECT_SEARCH_DIVERGENCE_LIMIT: f32 = 1e4;
const INTERSECT_DISTANCE_ITERATIONS: u32 = 10000;
const NORMALS_GRADIENT_DIFF: f32 = 5e-3;
const NORMALS_GRADIENT_DISTANCE_ITERATIONS: u32 = 8;

/// Hamilton product of two quaternions stored as (r, a, b, c) in the four
/// vector lanes.
fn quat_mul(p: Vec4, q: Vec4) -> Vec4 {
    Vec4::new(
        p.x * q.x - p.y * q.y - p.z * q.z - p.w * q.w,
        p.x * q.y + p.y * q.x + p.z * q.w - p.w * q.z,
        p.x * q.z - p.y * q.w + p.z * q.x + p.w * q.y,
        p.x * q.w + p.y * q.z - p.z * q.y + p.w * q.x,
    )
}

/// Julia set placed at `position`, scaled by `scale`, with iteration
/// constant `c` and slice plane `cut_plane`.
#[derive(Debug, Clone)]
pub struct Julia {
    position: Vec3A,
    scale: f32,
    c: Vec4,
    cut_plane: f32,
    transform: ObjectTransform,
}

impl Julia {
    /// Creates a new Julia set primitive.
    pub fn new(
        position: Vec3A,
        scale: f32,
        c: Vec4,
        cut_plane: f32,
        transform: ObjectTransform,
    ) -> Self {
        Self {
            position,
            scale,
            c,
            cut_plane,
            transform,
        }
    }

    /// Lower bound on the distance from `z0` to the set surface.
    ///
    /// Iterates z ← z² + c while tracking the squared magnitude m² and the
    /// squared gradient d² ← 4·|z|²·d², then evaluates
    /// sqrt(m²/d²) · ½ · log(sqrt(m²)). The estimate can overshoot by at
    /// most a factor of two, so half of it is a safe stepping distance.
    fn estimate_distance(&self, z0: Vec4, iterations: u32) -> f32 {
        let mut z = z0;
        let mut d2 = 1.0f32;
        let mut m2 = z.length_squared();
        for _ in 0..iterations {
            d2 *= 4.0 * m2;
            z = quat_mul(z, z) + self.c;
            m2 = z.length_squared();
            if m2 > 1e10 {
                break;
            }
        }
        (m2 / d2).sqrt() * 0.5 * m2.sqrt().ln()
    }

    /// Surface normal from central differences of the distance estimator
    /// along the three spatial quaternion axes.
    fn estimate_normal(&self, pos: Vec4, diff: f32) -> Vec3A {
        let iterations = NORMALS_GRADIENT_DISTANCE_ITERATIONS;
        let gradient = |axis: Vec4| {
            self.estimate_distance(pos + axis * diff, iterations)
                - self.estimate_distance(pos - axis * diff, iterations)
        };
        Vec3A::new(gradient(Vec4::X), gradient(Vec4::Y), gradient(Vec4::Z)).normalize_or_zero()
    }

    /// Sphere-traces the ray against the set.
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<Intersection> {
        // transform into object space and normalize the set to the unit region
        let mut test_pos = (self.transform.world2object.transform_point3a(ray.origin())
            - self.position)
            * (1.0 / self.scale);
        let direction = self
            .transform
            .world2object
            .transform_vector3a(ray.direction())
            .normalize_or_zero();

        // Jump ahead to the sphere circumscribing the (-1..+1)³ cube: the
        // estimator is only trustworthy near the set, and marching from far
        // away wastes iterations.
        let bounding_radius = 3.0f32.sqrt();
        if test_pos.length() > bounding_radius {
            let b = test_pos.dot(direction);
            let c = test_pos.dot(test_pos) - bounding_radius * bounding_radius;
            let h = b * b - c;
            // no real solution, or only touching the bounding sphere
            if h <= 0.0 {
                return None;
            }
            let distance = -b - h.sqrt();
            if distance < 0.0 {
                // bounding sphere lies behind the ray
                return None;
            }
            test_pos += direction * distance;
        }

        let mut distance = INTERSECT_SEARCH_DIVERGENCE_LIMIT;
        for i in 0..INTERSECT_SEARCH_ITERATIONS {
            let q = Vec4::new(test_pos.x, test_pos.y, test_pos.z, self.cut_plane);
            distance = self.estimate_distance(q, INTERSECT_DISTANCE_ITERATIONS);
            if i == 0 && distance < INTERSECT_SEARCH_CONVERGENCE_LIMIT {
                // the ray starts on or inside the set; push through instead
                // of reporting the origin itself as a hit
                distance = 100.0 * INTERSECT_SEARCH_CONVERGENCE_LIMIT;
            } else if distance < INTERSECT_SEARCH_CONVERGENCE_LIMIT
                || distance > INTERSECT_SEARCH_DIVERGENCE_LIMIT
            {
                break;
            }
            test_pos += direction * distance;
        }

        if distance >= INTERSECT_SEARCH_CONVERGENCE_LIMIT {
            return None;
        }

        let q = Vec4::new(test_pos.x, test_pos.y, test_pos.z, self.cut_plane);
        let mut normal = self.estimate_normal(q, NORMALS_GRADIENT_DIFF);
        // the set is rendered two-sided: turn the normal against the ray
        if normal.dot(direction) > 0.0 {
            normal = -normal;
        }

        let point = self
            .transform
            .object2world
            .transform_point3a(test_pos * self.scale + self.position);
        let distance = (point - ray.origin()).length();
        if distance < EPSILON || distance > max_distance {
            return None;
        }

        // texturing is not supported on Julia sets
        let texture_uv = Vec2::ZERO;
        Some(Intersection {
            distance,
            point,
            normal: (self.transform.object2world_normals * normal).normalize_or_zero(),
            texture_uv,
            photon_uv: texture_uv,
        })
    }
}

#[cfg(test)]
use crate::math::INFINITE;

#[cfg(test)]
fn unit_sphere_julia() -> Julia {
    // with c = 0 the iteration is z ← z² and the set boundary is the unit
    // sphere, which makes the estimator's output easy to check
    Julia::new(Vec3A::ZERO, 1.0, Vec4::ZERO, 0.0, ObjectTransform::default())
}

#[test]
fn distance_estimate_is_a_positive_lower_bound() {
    let julia = unit_sphere_julia();
    let d = julia.estimate_distance(Vec4::new(2.0, 0.0, 0.0, 0.0), 100);
    assert!(d > 0.0);
    assert!(d <= 1.0 + 1e-3);
}

#[test]
fn traces_to_the_unit_sphere_boundary() {
    let julia = unit_sphere_julia();
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 3.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = julia.intersect(&ray, INFINITE).unwrap();
    assert!((hit.distance - 2.0).abs() < 0.05);
    assert!((hit.point.length() - 1.0).abs() < 0.05);
    // normal faces the ray
    assert!(hit.normal.dot(ray.direction()) < 0.0);
    assert_eq!(hit.texture_uv, Vec2::ZERO);
}

#[test]
fn ray_away_from_bounding_sphere_misses() {
    let julia = unit_sphere_julia();
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 3.0), Vec3A::Z);
    assert!(julia.intersect(&ray, INFINITE).is_none());
    let sideways = Ray::new(Vec3A::new(0.0, 3.0, 3.0), Vec3A::X);
    assert!(julia.intersect(&sideways, INFINITE).is_none());
}

#[test]
fn max_distance_rejects_the_hit() {
    let julia = unit_sphere_julia();
    let ray = Ray::new(Vec3A::new(0.0, 0.0, 3.0), Vec3A::new(0.0, 0.0, -1.0));
    assert!(julia.intersect(&ray, 1.0).is_none());
}
