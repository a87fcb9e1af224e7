//! Scene objects: one intersection primitive, a material and a lazily
//! allocated photon accumulation texture.

use glam::{Affine3A, Mat3A, UVec2, Vec2, Vec3A, Vec4};

use crate::julia::Julia;
use crate::material::Material;
use crate::picture::Picture;
use crate::ray::Ray;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Ray-primitive intersection record.
///
/// Point and normal are in world space, the distance is the Euclidean
/// world-space distance from the ray origin. The photon coordinate equals
/// the texture coordinate for spheres and Julia sets, and the first two
/// barycentric weights for triangles.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    /// World-space distance from the ray origin to the hit point.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3A,
    /// World-space unit normal at the hit point.
    pub normal: Vec3A,
    /// Texture coordinate in the primitive's parameterization.
    pub texture_uv: Vec2,
    /// Coordinate under which photons are deposited on this primitive.
    pub photon_uv: Vec2,
}

/// The three matrices a transformed primitive needs: rays go world to
/// object, hit points come back object to world, and normals use their own
/// matrix (rotations and reciprocal scales, no translation).
#[derive(Debug, Clone, Copy)]
pub struct ObjectTransform {
    /// World-to-object transform, applied to rays.
    pub world2object: Affine3A,
    /// Object-to-world transform, applied to hit points.
    pub object2world: Affine3A,
    /// Object-to-world transform for normals.
    pub object2world_normals: Mat3A,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            world2object: Affine3A::IDENTITY,
            object2world: Affine3A::IDENTITY,
            object2world_normals: Mat3A::IDENTITY,
        }
    }
}

/// Intersection primitive. A closed enum rather than a trait object: the
/// render loop visits every object for every ray, and the three variants
/// are small value types.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// Analytic sphere.
    Sphere(Sphere),
    /// Single triangle of a mesh.
    Triangle(Triangle),
    /// Quaternion Julia set.
    Julia(Julia),
}

impl Primitive {
    /// Nearest intersection with a positive distance not exceeding
    /// `max_distance`, if any.
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<Intersection> {
        match self {
            Primitive::Sphere(sphere) => sphere.intersect(ray, max_distance),
            Primitive::Triangle(triangle) => triangle.intersect(ray, max_distance),
            Primitive::Julia(julia) => julia.intersect(ray, max_distance),
        }
    }
}

/// One renderable object of the scene.
#[derive(Debug, Clone)]
pub struct Object {
    material: Material,
    photon_map: Picture,
    primitive: Primitive,
}

impl Object {
    /// Wraps a primitive with its material. The photon texture starts out
    /// empty and is only allocated if a photon is ever deposited.
    pub fn new(primitive: Primitive, material: Material) -> Self {
        Self {
            material,
            photon_map: Picture::default(),
            primitive,
        }
    }

    /// The object's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Dispatches to the primitive's intersection test.
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<Intersection> {
        self.primitive.intersect(ray, max_distance)
    }

    /// Sums `rad` into the photon texel under `pos`, allocating the texture
    /// at `texture_size` × `texture_size` on the first deposit.
    pub fn add_photon(&mut self, texture_size: u32, pos: Vec2, rad: Vec4) {
        if self.photon_map.is_empty() {
            self.photon_map = Picture::new(UVec2::splat(texture_size));
        }
        let (x, y) = photon_texel(self.photon_map.size(), pos);
        let sum = self.photon_map.get(x, y) + rad;
        self.photon_map.set(x, y, sum);
    }

    /// Radiance baked into the photon texel under `pos`; zero when the
    /// object never received a photon.
    pub fn photon(&self, pos: Vec2) -> Vec4 {
        if self.photon_map.is_empty() {
            return Vec4::ZERO;
        }
        let (x, y) = photon_texel(self.photon_map.size(), pos);
        self.photon_map.get(x, y)
    }
}

/// Maps a photon coordinate to a texel index, clamped to the texture.
fn photon_texel(size: UVec2, pos: Vec2) -> (u32, u32) {
    (
        ((pos.x * (size.x - 1) as f32) as u32).min(size.x - 1),
        ((pos.y * (size.y - 1) as f32) as u32).min(size.y - 1),
    )
}

#[cfg(test)]
fn test_object() -> Object {
    Object::new(
        Primitive::Sphere(Sphere::new(Vec3A::ZERO, 1.0, ObjectTransform::default())),
        Material::default(),
    )
}

#[test]
fn photon_texture_is_lazy() {
    let mut object = test_object();
    assert_eq!(object.photon(Vec2::new(0.5, 0.5)), Vec4::ZERO);
    object.add_photon(8, Vec2::new(0.5, 0.5), Vec4::splat(1.0));
    assert_eq!(object.photon(Vec2::new(0.5, 0.5)), Vec4::splat(1.0));
}

#[test]
fn photons_sum_instead_of_averaging() {
    let mut object = test_object();
    object.add_photon(8, Vec2::new(0.25, 0.25), Vec4::splat(0.5));
    object.add_photon(8, Vec2::new(0.25, 0.25), Vec4::splat(0.5));
    assert_eq!(object.photon(Vec2::new(0.25, 0.25)), Vec4::splat(1.0));
}

#[test]
fn out_of_range_photon_coordinates_clamp() {
    let mut object = test_object();
    object.add_photon(4, Vec2::new(2.0, -1.0), Vec4::splat(1.0));
    assert_eq!(object.photon(Vec2::new(1.0, 0.0)), Vec4::splat(1.0));
}
