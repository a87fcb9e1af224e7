//! Camera model.
//!
//! The camera sits at the origin of its own space looking down -z; the
//! look-at transform places it in the world. Depth of field derives the
//! focus distance from an explicit focus point, and the lens size controls
//! how far ray origins spread over the lens.

use glam::{Affine3A, UVec2, Vec3A};

use crate::math::look_at;

/// Perspective camera with supersampling and depth-of-field parameters.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3A,
    look_at: Vec3A,
    up: Vec3A,
    field_of_view: f32,
    resolution: UVec2,
    max_bounces: u32,
    super_sampling_per_axis: u32,
    focus_point: Vec3A,
    lens_size: f32,
    transformation: Affine3A,
    focus_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3A::ZERO,
            look_at: Vec3A::new(0.0, 0.0, -1.0),
            up: Vec3A::new(0.0, 1.0, 0.0),
            field_of_view: std::f32::consts::FRAC_PI_4,
            resolution: UVec2::new(512, 512),
            max_bounces: 8,
            super_sampling_per_axis: 1,
            focus_point: Vec3A::new(0.0, 0.0, -1.0),
            lens_size: 0.0,
            transformation: Affine3A::IDENTITY,
            focus_distance: 1.0,
        };
        camera.recalculate();
        camera
    }
}

impl Camera {
    /// Configured field of view angle in radians.
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Camera-to-world transform.
    pub fn transformation(&self) -> Affine3A {
        self.transformation
    }

    /// Output resolution in pixels.
    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    /// Maximum recursion depth of the shader.
    pub fn max_bounces(&self) -> u32 {
        self.max_bounces
    }

    /// Supersampling factor n: n × n rays per pixel.
    pub fn super_sampling_per_axis(&self) -> u32 {
        self.super_sampling_per_axis
    }

    /// Distance from the camera to the plane of perfect focus.
    pub fn focus_distance(&self) -> f32 {
        self.focus_distance
    }

    /// Lens extent; zero disables depth of field.
    pub fn lens_size(&self) -> f32 {
        self.lens_size
    }

    /// Moves the camera.
    pub fn set_position(&mut self, position: Vec3A) {
        self.position = position;
        self.recalculate();
    }

    /// Points the camera at a world-space target.
    pub fn set_look_at(&mut self, look_at: Vec3A) {
        self.look_at = look_at;
        self.recalculate();
    }

    /// Sets the camera-relative up vector.
    pub fn set_up(&mut self, up: Vec3A) {
        self.up = up;
        self.recalculate();
    }

    /// Sets the field of view angle in radians.
    pub fn set_field_of_view(&mut self, angle: f32) {
        self.field_of_view = angle;
    }

    /// Sets the output resolution.
    pub fn set_resolution(&mut self, resolution: UVec2) {
        self.resolution = resolution;
    }

    /// Sets the maximum recursion depth.
    pub fn set_max_bounces(&mut self, n: u32) {
        self.max_bounces = n;
    }

    /// Sets the supersampling factor per axis.
    pub fn set_super_sampling_per_axis(&mut self, n: u32) {
        self.super_sampling_per_axis = n;
    }

    /// Sets the point that is in perfect focus.
    pub fn set_focus_point(&mut self, point: Vec3A) {
        self.focus_point = point;
        self.recalculate();
    }

    /// Sets the lens extent.
    pub fn set_lens_size(&mut self, size: f32) {
        self.lens_size = size;
    }

    fn recalculate(&mut self) {
        self.transformation = look_at(self.position, self.look_at, self.up);
        self.focus_distance = (self.focus_point - self.position).length();
    }
}

#[test]
fn transform_places_camera() {
    let mut camera = Camera::default();
    camera.set_position(Vec3A::new(0.0, 0.0, 4.0));
    camera.set_look_at(Vec3A::ZERO);
    let eye = camera.transformation().transform_point3a(Vec3A::ZERO);
    assert!((eye - Vec3A::new(0.0, 0.0, 4.0)).length() < 1e-6);
    // -z in camera space points at the target
    let forward = camera.transformation().transform_vector3a(-Vec3A::Z);
    assert!(forward.dot(Vec3A::new(0.0, 0.0, -1.0)) > 0.999);
}

#[test]
fn focus_distance_follows_focus_point() {
    let mut camera = Camera::default();
    camera.set_position(Vec3A::new(0.0, 0.0, 4.0));
    camera.set_focus_point(Vec3A::new(0.0, 3.0, 0.0));
    assert!((camera.focus_distance() - 5.0).abs() < 1e-6);
}
