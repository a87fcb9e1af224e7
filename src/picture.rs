//! Rectangular buffer of linear RGBA radiance samples.
//!
//! A `Picture` is the render target, a material texture and an object's
//! photon accumulation buffer all at once. Samples stay linear; the only
//! quantization happens in [`scale_out`] when a picture is handed to the
//! PNG encoder.

use glam::{UVec2, Vec2, Vec4};

/// Width × height array of linear radiance in row-major order.
#[derive(Debug, Clone, Default)]
pub struct Picture {
    size: UVec2,
    data: Vec<Vec4>,
}

impl Picture {
    /// Allocates a zero-initialized picture.
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            data: vec![Vec4::ZERO; (size.x as usize) * (size.y as usize)],
        }
    }

    /// Dimensions in pixels.
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// True for the zero-sized sentinel (e.g. an unallocated photon map).
    pub fn is_empty(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }

    /// Radiance at pixel (x, y).
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.data[(y * self.size.x + x) as usize]
    }

    /// Stores radiance at pixel (x, y).
    pub fn set(&mut self, x: u32, y: u32, radiance: Vec4) {
        self.data[(y * self.size.x + x) as usize] = radiance;
    }

    /// Accumulates `self[i] += other[i] * factor` over all pixels; this is
    /// how motion-blur sub-frames are averaged into the output frame.
    pub fn mul_add(&mut self, other: &Picture, factor: f32) {
        for (dst, src) in self.data.iter_mut().zip(&other.data) {
            *dst += *src * factor;
        }
    }

    /// Bilinearly filtered texture lookup in repeat mode: only the
    /// fractional part of the coordinate is used, and the four sampled
    /// texels are clamped to the texture bounds.
    pub fn sample_bilinear(&self, uv: Vec2) -> Vec4 {
        let size = self.size;
        let texel = Vec2::new(
            uv.x.fract() * (size.x - 1) as f32,
            uv.y.fract() * (size.y - 1) as f32,
        );
        let fx = texel.x.fract();
        let fy = texel.y.fract();
        let x0 = (texel.x as u32).min(size.x - 1);
        let y0 = (texel.y as u32).min(size.y - 1);
        let x1 = (texel.x.ceil() as u32).min(size.x - 1);
        let y1 = (texel.y.ceil() as u32).min(size.y - 1);
        self.get(x0, y0) * ((1.0 - fx) * (1.0 - fy))
            + self.get(x1, y0) * (fx * (1.0 - fy))
            + self.get(x0, y1) * ((1.0 - fx) * fy)
            + self.get(x1, y1) * (fx * fy)
    }
}

/// Quantizes a linear radiance sample to 8-bit RGBA: each channel is scaled
/// by `gain`, clamped to [0, 1] and mapped to 0..=255 without gamma
/// correction.
pub fn scale_out(radiance: Vec4, gain: f32) -> [u8; 4] {
    let scale = |v: f32| ((v * gain).clamp(0.0, 1.0) * 255.0) as u8;
    [
        scale(radiance.x),
        scale(radiance.y),
        scale(radiance.z),
        scale(radiance.w),
    ]
}

#[test]
fn get_set_round_trip() {
    let mut pic = Picture::new(UVec2::new(4, 3));
    pic.set(3, 2, Vec4::new(0.1, 0.2, 0.3, 1.0));
    assert_eq!(pic.get(3, 2), Vec4::new(0.1, 0.2, 0.3, 1.0));
    assert_eq!(pic.get(0, 0), Vec4::ZERO);
}

#[test]
fn default_picture_is_empty() {
    assert!(Picture::default().is_empty());
    assert!(!Picture::new(UVec2::new(1, 1)).is_empty());
}

#[test]
fn mul_add_accumulates() {
    let mut a = Picture::new(UVec2::new(2, 1));
    let mut b = Picture::new(UVec2::new(2, 1));
    a.set(0, 0, Vec4::splat(1.0));
    b.set(0, 0, Vec4::splat(2.0));
    b.set(1, 0, Vec4::splat(4.0));
    a.mul_add(&b, 0.5);
    assert_eq!(a.get(0, 0), Vec4::splat(2.0));
    assert_eq!(a.get(1, 0), Vec4::splat(2.0));
}

#[test]
fn scale_out_clamps_and_quantizes() {
    assert_eq!(scale_out(Vec4::new(0.5, 2.0, -1.0, 1.0), 1.0), [127, 255, 0, 255]);
    assert_eq!(scale_out(Vec4::splat(0.5), 2.0), [255, 255, 255, 255]);
}

#[test]
fn bilinear_sample_interpolates_between_texels() {
    let mut tex = Picture::new(UVec2::new(2, 2));
    tex.set(0, 0, Vec4::ZERO);
    tex.set(1, 0, Vec4::splat(1.0));
    tex.set(0, 1, Vec4::ZERO);
    tex.set(1, 1, Vec4::splat(1.0));
    let mid = tex.sample_bilinear(Vec2::new(0.5, 0.0));
    assert!((mid.x - 0.5).abs() < 1e-6);
}

#[test]
fn bilinear_sample_repeats() {
    let mut tex = Picture::new(UVec2::new(2, 2));
    tex.set(0, 0, Vec4::splat(1.0));
    let a = tex.sample_bilinear(Vec2::new(0.25, 0.25));
    let b = tex.sample_bilinear(Vec2::new(1.25, 2.25));
    assert!((a - b).length() < 1e-6);
}
