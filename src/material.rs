//! Surface material: textured Phong parameters plus the reflection and
//! refraction behavior of the recursive shader.

use glam::Vec4;

use crate::math::Complex;
use crate::picture::Picture;

/// Phong shading coefficients.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phong {
    /// Ambient coefficient.
    pub ka: f32,
    /// Diffuse coefficient.
    pub kd: f32,
    /// Specular coefficient.
    pub ks: f32,
    /// Specular exponent.
    pub exponent: f32,
}

/// Material of an object.
///
/// The refraction index is a complex number: the real part is the index of
/// refraction, the imaginary part the extinction coefficient of conductors.
/// Only the Fresnel split uses the complex value; the refraction direction
/// uses the real part alone.
#[derive(Debug, Clone)]
pub struct Material {
    /// Base color, used when no texture is present.
    pub color: Vec4,
    /// Optional texture; sampled bilinearly in repeat mode.
    pub texture: Option<Picture>,
    /// Phong coefficients.
    pub phong: Phong,
    /// Fraction of the Fresnel-reflected energy that is traced, in [0, 1].
    pub reflectance: f32,
    /// Fraction of the Fresnel-transmitted energy that is traced, in [0, 1].
    pub transmittance: f32,
    /// Complex index of refraction. A zero magnitude marks a purely diffuse
    /// surface.
    pub refraction: Complex,
    /// Dispersion coefficient, added to the index of refraction in
    /// proportion to the ray's wavelength parameter.
    pub dispersion: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec4::ZERO,
            texture: None,
            phong: Phong::default(),
            reflectance: 0.0,
            transmittance: 0.0,
            refraction: Complex::new(0.0, 0.0),
            dispersion: 0.0,
        }
    }
}
