//! Triangle primitive with smooth shading.
//!
//! Intersection uses the Möller–Trumbore test in world space; vertices are
//! already transformed when a mesh is loaded.

use glam::{Vec2, Vec3A};

use crate::math::EPSILON;
use crate::object::Intersection;
use crate::ray::Ray;

/// One mesh vertex: world-space position and normal plus a texture
/// coordinate.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    /// World-space position.
    pub position: Vec3A,
    /// World-space normal.
    pub normal: Vec3A,
    /// Texture coordinate.
    pub texture_uv: Vec2,
}

/// Triangle over three vertices.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [Vertex; 3],
}

impl Triangle {
    /// Creates a triangle from its vertices.
    pub fn new(vertices: [Vertex; 3]) -> Self {
        Self { vertices }
    }

    /// Möller–Trumbore intersection.
    ///
    /// The barycentric bounds are checked against -ε instead of 0 so that
    /// adjacent triangles overlap by a sliver and shared edges do not show
    /// cracks. The normal and texture coordinate are the barycentric blends
    /// of the vertex attributes; the photon coordinate is the barycentric
    /// pair (w0, w1) itself.
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<Intersection> {
        let [v0, v1, v2] = &self.vertices;
        let edge1 = v1.position - v0.position;
        let edge2 = v2.position - v0.position;

        let h = ray.direction().cross(edge2);
        let approach_rate = edge1.dot(h);
        let s = ray.origin() - v0.position;
        let w1 = s.dot(h) / approach_rate;
        if w1 < -EPSILON || w1 > 1.0 {
            return None;
        }
        let q = s.cross(edge1);
        let w2 = ray.direction().dot(q) / approach_rate;
        if w2 < -EPSILON || w1 + w2 > 1.0 {
            return None;
        }

        let distance = edge2.dot(q) / approach_rate;
        if distance < 0.0 || distance > max_distance {
            return None;
        }

        let w0 = 1.0 - (w1 + w2);
        let normal =
            (v0.normal * w0 + v1.normal * w1 + v2.normal * w2).normalize_or_zero();
        let texture_uv = v0.texture_uv * w0 + v1.texture_uv * w1 + v2.texture_uv * w2;
        Some(Intersection {
            distance,
            point: ray.origin() + ray.direction() * distance,
            normal,
            texture_uv,
            photon_uv: Vec2::new(w0, w1),
        })
    }
}

#[cfg(test)]
fn xy_triangle() -> Triangle {
    let vertex = |x: f32, y: f32, u: f32, v: f32| Vertex {
        position: Vec3A::new(x, y, 0.0),
        normal: Vec3A::Z,
        texture_uv: Vec2::new(u, v),
    };
    Triangle::new([
        vertex(0.0, 0.0, 0.0, 0.0),
        vertex(1.0, 0.0, 1.0, 0.0),
        vertex(0.0, 1.0, 0.0, 1.0),
    ])
}

#[cfg(test)]
use crate::math::INFINITE;

#[test]
fn hit_inside_reports_blended_attributes() {
    let triangle = xy_triangle();
    let ray = Ray::new(Vec3A::new(0.25, 0.25, 2.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = triangle.intersect(&ray, INFINITE).unwrap();
    assert!((hit.distance - 2.0).abs() < 1e-4);
    assert!((hit.texture_uv - Vec2::new(0.25, 0.25)).length() < 1e-4);
    // barycentrics sum to one
    let w0 = hit.photon_uv.x;
    let w1 = hit.photon_uv.y;
    let w2 = 1.0 - w0 - w1;
    assert!((w0 + w1 + w2 - 1.0).abs() < 1e-5);
    assert!((hit.normal - Vec3A::Z).length() < 1e-5);
}

#[test]
fn miss_outside_barycentric_range() {
    let triangle = xy_triangle();
    let ray = Ray::new(Vec3A::new(0.8, 0.8, 2.0), Vec3A::new(0.0, 0.0, -1.0));
    assert!(triangle.intersect(&ray, INFINITE).is_none());
}

#[test]
fn shared_edge_bleeds_by_epsilon() {
    // a point a hair outside the w1 = 0 edge still hits
    let triangle = xy_triangle();
    let ray = Ray::new(
        Vec3A::new(-0.25 * EPSILON, 0.5, 2.0),
        Vec3A::new(0.0, 0.0, -1.0),
    );
    assert!(triangle.intersect(&ray, INFINITE).is_some());
}

#[test]
fn behind_origin_and_too_far_miss() {
    let triangle = xy_triangle();
    let behind = Ray::new(Vec3A::new(0.25, 0.25, -1.0), Vec3A::new(0.0, 0.0, -1.0));
    assert!(triangle.intersect(&behind, INFINITE).is_none());
    let ray = Ray::new(Vec3A::new(0.25, 0.25, 2.0), Vec3A::new(0.0, 0.0, -1.0));
    assert!(triangle.intersect(&ray, 1.5).is_none());
}

#[test]
fn smooth_normal_interpolates_vertex_normals() {
    let tilted = |x: f32, y: f32, n: Vec3A| Vertex {
        position: Vec3A::new(x, y, 0.0),
        normal: n.normalize_or_zero(),
        texture_uv: Vec2::ZERO,
    };
    let triangle = Triangle::new([
        tilted(0.0, 0.0, Vec3A::new(-1.0, 0.0, 1.0)),
        tilted(1.0, 0.0, Vec3A::new(1.0, 0.0, 1.0)),
        tilted(0.0, 1.0, Vec3A::new(0.0, 1.0, 1.0)),
    ]);
    let ray = Ray::new(Vec3A::new(0.5, 0.0, 2.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = triangle.intersect(&ray, INFINITE).unwrap();
    // halfway along the bottom edge the x components cancel
    assert!(hit.normal.x.abs() < 1e-5);
    assert!(hit.normal.z > 0.9);
}
