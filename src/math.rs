//! Shared numeric helpers: scalar constants, the complex arithmetic used by
//! the Fresnel equations, HSV color conversion and the camera look-at
//! transform.

use glam::{Affine3A, Vec3A, Vec4};

/// Surface offset used to bias secondary rays off the surface they leave
/// (shadow and reflection acne).
pub const EPSILON: f32 = 1e-4;

/// Sentinel for "unbounded distance" and "no explicit still time".
///
/// The largest finite f32 rather than IEEE infinity, so that arithmetic on
/// it stays finite.
pub const INFINITE: f32 = f32::MAX;

/// Complex number over f32, as needed by the Fresnel equations for
/// conductors: real part is the index of refraction, imaginary part the
/// extinction coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f32,
    /// Imaginary part.
    pub im: f32,
}

impl Complex {
    /// Builds a complex number from its parts.
    pub fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    /// Squared magnitude |z|².
    pub fn norm_sqr(self) -> f32 {
        self.re * self.re + self.im * self.im
    }

    /// Principal square root.
    pub fn sqrt(self) -> Self {
        let modulus = self.norm_sqr().sqrt().sqrt();
        let half_arg = self.im.atan2(self.re) / 2.0;
        Self::new(modulus * half_arg.cos(), modulus * half_arg.sin())
    }
}

impl From<f32> for Complex {
    fn from(re: f32) -> Self {
        Self::new(re, 0.0)
    }
}

impl std::ops::Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl std::ops::Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl std::ops::Sub<Complex> for f32 {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self - rhs.re, -rhs.im)
    }
}

impl std::ops::Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl std::ops::Mul<f32> for Complex {
    type Output = Complex;
    fn mul(self, rhs: f32) -> Complex {
        Complex::new(self.re * rhs, self.im * rhs)
    }
}

impl std::ops::Div for Complex {
    type Output = Complex;
    fn div(self, rhs: Complex) -> Complex {
        let d = rhs.norm_sqr();
        Complex::new(
            (self.re * rhs.re + self.im * rhs.im) / d,
            (self.im * rhs.re - self.re * rhs.im) / d,
        )
    }
}

/// Converts HSV (H in degrees 0..360, S and V in percent 0..100) to a linear
/// RGBA color with alpha 1. Used to tint the chromatic ray copies when
/// dispersion is enabled.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec4 {
    let s = s / 100.0;
    let v = v / 100.0;
    let c = s * v;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Vec4::new(r + m, g + m, b + m, 1.0)
}

/// Camera-to-world transform: the camera basis vectors become the columns,
/// the camera position the translation.
pub fn look_at(camera: Vec3A, target: Vec3A, up: Vec3A) -> Affine3A {
    let z_axis = (camera - target).normalize_or_zero();
    let x_axis = up.cross(z_axis).normalize_or_zero();
    let y_axis = z_axis.cross(x_axis).normalize_or_zero();
    Affine3A::from_cols(x_axis, y_axis, z_axis, camera)
}

/// Resets the alpha channel to 1, keeping the color channels.
pub fn without_alpha(c: Vec4) -> Vec4 {
    Vec4::new(c.x, c.y, c.z, 1.0)
}

#[test]
fn complex_sqrt_of_negative_real() {
    let z = Complex::new(-4.0, 0.0).sqrt();
    assert!(z.re.abs() < 1e-6);
    assert!((z.im - 2.0).abs() < 1e-6);
}

#[test]
fn complex_division_round_trips() {
    let a = Complex::new(3.0, -2.0);
    let b = Complex::new(0.5, 1.5);
    let q = a / b * b;
    assert!((q.re - a.re).abs() < 1e-5);
    assert!((q.im - a.im).abs() < 1e-5);
}

#[test]
fn hsv_primaries() {
    let red = hsv_to_rgb(0.0, 100.0, 100.0);
    assert_eq!(red, Vec4::new(1.0, 0.0, 0.0, 1.0));
    let green = hsv_to_rgb(120.0, 100.0, 100.0);
    assert_eq!(green, Vec4::new(0.0, 1.0, 0.0, 1.0));
    let blue = hsv_to_rgb(240.0, 100.0, 100.0);
    assert_eq!(blue, Vec4::new(0.0, 0.0, 1.0, 1.0));
}

#[test]
fn look_at_maps_origin_to_camera() {
    let camera = Vec3A::new(1.0, -2.0, 3.0);
    let m = look_at(camera, Vec3A::new(4.0, 0.0, -1.0), Vec3A::Y);
    let p = m.transform_point3a(Vec3A::ZERO);
    assert!((p - camera).length() < 1e-5);
}

#[test]
fn look_at_basis_is_orthonormal() {
    let m = look_at(Vec3A::new(0.0, 0.0, 4.0), Vec3A::ZERO, Vec3A::Y);
    let x = m.transform_vector3a(Vec3A::X);
    let y = m.transform_vector3a(Vec3A::Y);
    assert!((x.length() - 1.0).abs() < 1e-6);
    assert!((y.length() - 1.0).abs() < 1e-6);
    assert!(x.dot(y).abs() < 1e-6);
}
