//! Wavefront OBJ subset loader.
//!
//! Supports `v`, `vt`, `vn` and triangular `f v/vt/vn` statements, which is
//! all the scene format promises for meshes. Anything else is silently
//! skipped, but a face index pointing outside the loaded data fails the
//! whole mesh. Faces must reference normals; texture coordinates are
//! optional and default to (0, 0).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::{Mat3A, Vec2, Vec3A};

use crate::error::{Error, Result};
use crate::material::Material;
use crate::object::{Object, Primitive};
use crate::triangle::{Triangle, Vertex};

/// One corner of a face: 1-based indices into the mesh data, 0 = no texture
/// coordinate.
#[derive(Debug, Clone, Copy, Default)]
struct FacePoint {
    vertex: u32,
    texture_coord: u32,
    normal: u32,
}

/// An indexed triangle mesh as read from an OBJ file.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vec3A>,
    texture_coords: Vec<Vec2>,
    normals: Vec<Vec3A>,
    faces: Vec<[FacePoint; 3]>,
}

impl Mesh {
    /// Loads a mesh from a file.
    pub fn load(path: &Path) -> Result<Mesh> {
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read(BufReader::new(file)).map_err(|message| Error::Asset {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Reads a mesh from any line-oriented source.
    pub fn read(input: impl BufRead) -> std::result::Result<Mesh, String> {
        let mut mesh = Mesh::default();
        let mut max = FacePoint::default();
        for line in input.lines() {
            let line = line.map_err(|e| e.to_string())?;
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("v") => {
                    if let Some(p) = read_vec3(&mut fields) {
                        mesh.vertices.push(p);
                    }
                }
                Some("vt") => {
                    if let Some(uv) = read_vec2(&mut fields) {
                        mesh.texture_coords.push(uv);
                    }
                }
                Some("vn") => {
                    if let Some(n) = read_vec3(&mut fields) {
                        mesh.normals.push(n);
                    }
                }
                Some("f") => {
                    let corners: Vec<&str> = fields.take(3).collect();
                    if corners.len() < 3 {
                        continue;
                    }
                    let mut face = [FacePoint::default(); 3];
                    let mut ok = true;
                    for (slot, text) in face.iter_mut().zip(&corners) {
                        match parse_face_point(text) {
                            Some(point) => {
                                max.vertex = max.vertex.max(point.vertex);
                                max.texture_coord = max.texture_coord.max(point.texture_coord);
                                max.normal = max.normal.max(point.normal);
                                *slot = point;
                            }
                            None => ok = false,
                        }
                    }
                    if ok {
                        mesh.faces.push(face);
                    }
                }
                _ => {}
            }
        }
        if max.vertex as usize > mesh.vertices.len()
            || max.texture_coord as usize > mesh.texture_coords.len()
            || max.normal as usize > mesh.normals.len()
        {
            return Err("mesh obj file contains an out of bounds index on a face".to_string());
        }
        Ok(mesh)
    }

    /// Turns each face into a world-space triangle object. Vertices go
    /// through the object-to-world transform, normals through the normal
    /// transform, once at load time.
    pub fn create_objects(
        &self,
        material: &Material,
        vertices_transform: glam::Affine3A,
        normals_transform: Mat3A,
    ) -> Vec<Object> {
        let vertices: Vec<Vec3A> = self
            .vertices
            .iter()
            .map(|&p| vertices_transform.transform_point3a(p))
            .collect();
        let normals: Vec<Vec3A> = self
            .normals
            .iter()
            .map(|&n| (normals_transform * n).normalize_or_zero())
            .collect();

        self.faces
            .iter()
            .map(|face| {
                let corner = |p: &FacePoint| Vertex {
                    position: vertices[p.vertex as usize - 1],
                    normal: normals[p.normal as usize - 1],
                    texture_uv: if p.texture_coord > 0 {
                        self.texture_coords[p.texture_coord as usize - 1]
                    } else {
                        Vec2::ZERO
                    },
                };
                Object::new(
                    Primitive::Triangle(Triangle::new([
                        corner(&face[0]),
                        corner(&face[1]),
                        corner(&face[2]),
                    ])),
                    material.clone(),
                )
            })
            .collect()
    }
}

fn read_vec3<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Option<Vec3A> {
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    let z = fields.next()?.parse().ok()?;
    Some(Vec3A::new(x, y, z))
}

fn read_vec2<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Option<Vec2> {
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    Some(Vec2::new(x, y))
}

/// Parses `v/vt/vn` with an optional `vt`; indices are 1-based and 0 is
/// invalid.
fn parse_face_point(text: &str) -> Option<FacePoint> {
    let mut parts = text.split('/');
    let vertex: u32 = parts.next()?.parse().ok()?;
    let texture_part = parts.next()?;
    let texture_coord: u32 = if texture_part.is_empty() {
        0
    } else {
        texture_part.parse().ok()?
    };
    let normal: u32 = parts.next()?.parse().ok()?;
    if vertex == 0 || normal == 0 || parts.next().is_some() {
        return None;
    }
    Some(FacePoint {
        vertex,
        texture_coord,
        normal,
    })
}

#[cfg(test)]
const QUAD_OBJ: &str = "\
# two triangles
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

#[test]
fn loads_triangles_with_attributes() {
    let mesh = Mesh::read(QUAD_OBJ.as_bytes()).unwrap();
    let objects = mesh.create_objects(
        &Material::default(),
        glam::Affine3A::IDENTITY,
        Mat3A::IDENTITY,
    );
    assert_eq!(objects.len(), 2);
    use crate::math::INFINITE;
    use crate::ray::Ray;
    let ray = Ray::new(Vec3A::new(0.5, 0.5, 2.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = objects
        .iter()
        .find_map(|o| o.intersect(&ray, INFINITE))
        .unwrap();
    assert!((hit.normal - Vec3A::Z).length() < 1e-5);
    assert!((hit.texture_uv - Vec2::new(0.5, 0.5)).length() < 1e-5);
}

#[test]
fn missing_texture_coordinate_is_allowed() {
    let mesh = Mesh::read("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n".as_bytes())
        .unwrap();
    let objects = mesh.create_objects(
        &Material::default(),
        glam::Affine3A::IDENTITY,
        Mat3A::IDENTITY,
    );
    assert_eq!(objects.len(), 1);
}

#[test]
fn out_of_bounds_index_fails_the_load() {
    let result = Mesh::read("v 0 0 0\nvn 0 0 1\nf 1//1 2//1 1//1\n".as_bytes());
    assert!(result.is_err());
}

#[test]
fn unknown_statements_are_skipped() {
    let mesh = Mesh::read("o name\ns off\nusemtl x\nv 0 0 0\n".as_bytes()).unwrap();
    assert_eq!(mesh.vertices.len(), 1);
    assert!(mesh.faces.is_empty());
}

#[test]
fn transforms_apply_at_load_time() {
    let mesh = Mesh::read("v 1 0 0\nv 0 1 0\nv 0 0 0\nvn 0 0 1\nf 1//1 2//1 3//1\n".as_bytes())
        .unwrap();
    let objects = mesh.create_objects(
        &Material::default(),
        glam::Affine3A::from_translation(glam::Vec3::new(0.0, 0.0, -1.0)),
        Mat3A::IDENTITY,
    );
    use crate::math::INFINITE;
    use crate::ray::Ray;
    let ray = Ray::new(Vec3A::new(0.25, 0.25, 2.0), Vec3A::new(0.0, 0.0, -1.0));
    let hit = objects[0].intersect(&ray, INFINITE).unwrap();
    assert!((hit.point.z + 1.0).abs() < 1e-5);
}
