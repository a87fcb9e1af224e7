//! # Output Module
//!
//! Image input and output:
//! - PNG texture loading for materials
//! - still image export as 8-bit RGBA PNG
//! - animation export as APNG with per-frame delays
//!
//! Output samples are quantized without gamma correction; the files carry a
//! gAMA chunk of 1/2.2 and sRGB primaries in cHRM so viewers know how to
//! display them.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use glam::{UVec2, Vec4};
use log::info;

use crate::error::{Error, Result};
use crate::picture::{scale_out, Picture};

/// Reference white point and sRGB primaries written into the cHRM chunk.
fn srgb_chromaticities() -> png::SourceChromaticities {
    png::SourceChromaticities::new((0.3127, 0.3290), (0.64, 0.33), (0.30, 0.60), (0.15, 0.06))
}

/// Loads an 8-bit PNG texture into linear radiance: each channel is mapped
/// to [0, 1] by dividing by 255, without gamma decoding. Missing alpha
/// reads as opaque.
pub fn load_texture(path: &Path) -> Result<Picture> {
    let image = image::open(path).map_err(|e| Error::Asset {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut picture = Picture::new(UVec2::new(width, height));
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        picture.set(
            x,
            y,
            Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0,
        );
    }
    Ok(picture)
}

/// Writes a single picture as a still PNG.
pub fn save_picture(picture: &Picture, path: &Path, gain: f32) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let encoder = new_encoder(BufWriter::new(file), picture.size());
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&quantize(picture, gain))?;
    writer.finish()?;
    info!("Image saved as {}", path.display());
    Ok(())
}

/// Streaming APNG writer; one call per frame, frames are encoded as they
/// arrive so an animation never needs to be held in memory.
pub struct AnimationWriter {
    writer: png::Writer<BufWriter<File>>,
    gain: f32,
}

impl AnimationWriter {
    /// Opens the output file and writes the stream header (IHDR, gAMA,
    /// cHRM, acTL).
    pub fn create(path: &Path, size: UVec2, frames: u32, fps: f32, gain: f32) -> Result<Self> {
        let file = File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut encoder = new_encoder(BufWriter::new(file), size);
        encoder
            .set_animated(frames, 0)
            .map_err(png::EncodingError::from)?;
        let (numerator, denominator) = frame_delay(fps);
        encoder
            .set_frame_delay(numerator, denominator)
            .map_err(png::EncodingError::from)?;
        Ok(Self {
            writer: encoder.write_header()?,
            gain,
        })
    }

    /// Encodes the next frame. The first frame becomes the IDAT image, all
    /// following ones fdAT chunks with their sequence numbers. The delay
    /// may change per frame, because the scene can animate its frame rate.
    pub fn write_frame(&mut self, picture: &Picture, fps: f32) -> Result<()> {
        let (numerator, denominator) = frame_delay(fps);
        self.writer
            .set_frame_delay(numerator, denominator)
            .map_err(png::EncodingError::from)?;
        self.writer.write_image_data(&quantize(picture, self.gain))?;
        Ok(())
    }

    /// Closes the stream (IEND).
    pub fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

/// Frame delay in milliseconds: 1000/fps over a denominator of 1000.
fn frame_delay(fps: f32) -> (u16, u16) {
    ((1000.0 / fps) as u16, 1000)
}

fn new_encoder<W: std::io::Write>(w: W, size: UVec2) -> png::Encoder<'static, W> {
    let mut encoder = png::Encoder::new(w, size.x, size.y);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_filter(png::FilterType::Sub);
    encoder.set_source_gamma(png::ScaledFloat::new(1.0 / 2.2));
    encoder.set_source_chromaticities(srgb_chromaticities());
    encoder
}

/// Quantizes a picture to packed RGBA rows.
fn quantize(picture: &Picture, gain: f32) -> Vec<u8> {
    let size = picture.size();
    let mut data = Vec::with_capacity((size.x * size.y * 4) as usize);
    for y in 0..size.y {
        for x in 0..size.x {
            data.extend_from_slice(&scale_out(picture.get(x, y), gain));
        }
    }
    data
}

#[test]
fn still_png_round_trips_through_quantization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uniform.png");
    let mut picture = Picture::new(UVec2::new(8, 8));
    for y in 0..8 {
        for x in 0..8 {
            picture.set(x, y, Vec4::new(0.25, 0.5, 0.75, 1.0));
        }
    }
    save_picture(&picture, &path, 1.0).unwrap();
    let decoded = load_texture(&path).unwrap();
    assert_eq!(decoded.size(), UVec2::new(8, 8));
    let expected = Vec4::new(
        (0.25f32 * 255.0).floor(),
        (0.5f32 * 255.0).floor(),
        (0.75f32 * 255.0).floor(),
        255.0,
    ) / 255.0;
    for y in 0..8 {
        for x in 0..8 {
            assert!((decoded.get(x, y) - expected).length() < 1e-6);
        }
    }
}

#[test]
fn animation_writer_produces_a_decodable_apng() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anim.png");
    let size = UVec2::new(4, 4);
    let mut writer = AnimationWriter::create(&path, size, 3, 25.0, 1.0).unwrap();
    for i in 0..3 {
        let mut frame = Picture::new(size);
        for y in 0..4 {
            for x in 0..4 {
                frame.set(x, y, Vec4::splat(i as f32 / 2.0));
            }
        }
        writer.write_frame(&frame, 25.0).unwrap();
    }
    writer.finish().unwrap();

    let decoder = png::Decoder::new(File::open(&path).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let info = reader.info();
    let animation = info.animation_control().unwrap();
    assert_eq!(animation.num_frames, 3);
    assert_eq!(info.width, 4);
    let mut buffer = vec![0u8; reader.output_buffer_size()];
    reader.next_frame(&mut buffer).unwrap();
    assert_eq!(&buffer[0..4], &[0, 0, 0, 0]);
}

#[test]
fn gain_scales_before_quantization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gain.png");
    let mut picture = Picture::new(UVec2::new(1, 1));
    picture.set(0, 0, Vec4::splat(0.5));
    save_picture(&picture, &path, 2.0).unwrap();
    let decoded = load_texture(&path).unwrap();
    assert_eq!(decoded.get(0, 0), Vec4::splat(1.0));
}
