//! Frame driver.
//!
//! Picks one of four render modes from the scene's frame and sub-frame
//! counts: a single image, an image averaged over motion-blur sub-frames,
//! an animation, or an animation with motion blur. The scene file is
//! re-loaded for every frame and sub-frame so that animated attributes and
//! the photon map are resolved at that exact instant.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::error::Result;
use crate::math::INFINITE;
use crate::output::{self, AnimationWriter};
use crate::photon;
use crate::picture::Picture;
use crate::raytracer;
use crate::scene::Scene;

/// Renders the scene into its output file.
pub fn render(orig_scene: &Scene) -> Result<()> {
    if orig_scene.frames() > 1 && orig_scene.time() == INFINITE {
        if orig_scene.sub_frames() > 1 {
            render_video_motion_blur(orig_scene)
        } else {
            render_video(orig_scene)
        }
    } else if orig_scene.sub_frames() > 1 {
        render_image_motion_blur(orig_scene)
    } else {
        render_image(orig_scene)
    }
}

/// Runs the photon pre-pass when the scene asks for caustics.
fn prepare_photon_map(scene: &mut Scene) {
    if scene.photon_map_scan_steps() > 0.0 {
        info!("Generating photon map for caustics.. This will take some time..");
        photon::generate(scene);
    }
}

fn progress_bar(steps: u64) -> ProgressBar {
    let bar = ProgressBar::new(steps);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40} {pos}/{len} ETA: {eta}")
            .unwrap(),
    );
    bar
}

/// Single still image.
fn render_image(orig_scene: &Scene) -> Result<()> {
    let start_time = if orig_scene.time() == INFINITE {
        0.0
    } else {
        orig_scene.time()
    };
    let mut scene = Scene::load(orig_scene.scene_file(), start_time)?;
    prepare_photon_map(&mut scene);
    info!("Rendering image..");
    let picture = raytracer::raytrace(&scene);
    info!("Writing image to {}", orig_scene.out_file());
    output::save_picture(&picture, Path::new(orig_scene.out_file()), 1.0)
}

/// Single image averaged over evenly spaced sub-frames.
fn render_image_motion_blur(orig_scene: &Scene) -> Result<()> {
    let start_time = if orig_scene.time() == INFINITE {
        0.0
    } else {
        orig_scene.time()
    };
    let scene_for_count = Scene::load(orig_scene.scene_file(), start_time)?;
    let sub_frames = scene_for_count.sub_frames();
    let mut picture = Picture::new(orig_scene.camera().resolution());
    let progress = progress_bar(sub_frames as u64);
    for sub_frame in 0..sub_frames {
        // one sub-frame at the start of the frame time, one at the end,
        // the rest evenly in between
        let time = sub_frame as f32 / (sub_frames - 1) as f32 / orig_scene.frames() as f32
            + start_time;
        let mut scene = Scene::load(orig_scene.scene_file(), time)?;
        prepare_photon_map(&mut scene);
        let sub_picture = raytracer::raytrace(&scene);
        picture.mul_add(&sub_picture, 1.0 / sub_frames as f32);
        progress.inc(1);
    }
    progress.finish();
    info!("Writing image to {}", orig_scene.out_file());
    output::save_picture(&picture, Path::new(orig_scene.out_file()), 1.0)
}

/// Animation, one scene evaluation per frame.
fn render_video(orig_scene: &Scene) -> Result<()> {
    let frames = orig_scene.frames();
    info!("Writing animation to {}", orig_scene.out_file());
    let mut writer = AnimationWriter::create(
        Path::new(orig_scene.out_file()),
        orig_scene.camera().resolution(),
        frames,
        orig_scene.fps(),
        1.0,
    )?;
    let progress = progress_bar(frames as u64);
    for frame in 0..frames {
        let mut scene = Scene::load(orig_scene.scene_file(), frame as f32 / (frames - 1) as f32)?;
        prepare_photon_map(&mut scene);
        let picture = raytracer::raytrace(&scene);
        // the frame delay follows the freshly loaded scene, so the frame
        // rate itself can be animated
        writer.write_frame(&picture, scene.fps())?;
        progress.inc(1);
    }
    progress.finish();
    writer.finish()
}

/// Animation with motion blur: every frame averages its own sub-frames.
fn render_video_motion_blur(orig_scene: &Scene) -> Result<()> {
    let frames = orig_scene.frames();
    info!("Writing animation to {}", orig_scene.out_file());
    let mut writer = AnimationWriter::create(
        Path::new(orig_scene.out_file()),
        orig_scene.camera().resolution(),
        frames,
        orig_scene.fps(),
        1.0,
    )?;
    let mut sub_frames = orig_scene.sub_frames();
    let progress = progress_bar((frames * sub_frames) as u64);
    for frame in 0..frames {
        let mut picture = Picture::new(orig_scene.camera().resolution());
        // the scene file may animate the sub-frame count; the value read at
        // the last sub-frame takes effect for the next frame
        let mut new_sub_frames = sub_frames;
        for sub_frame in 0..sub_frames {
            let time = (frame as f32 + sub_frame as f32 / (sub_frames - 1) as f32)
                / frames as f32;
            let mut scene = Scene::load(orig_scene.scene_file(), time)?;
            prepare_photon_map(&mut scene);
            let sub_picture = raytracer::raytrace(&scene);
            picture.mul_add(&sub_picture, 1.0 / sub_frames as f32);
            new_sub_frames = scene.sub_frames();
            progress.inc(1);
        }
        writer.write_frame(&picture, orig_scene.fps())?;
        sub_frames = new_sub_frames;
    }
    progress.finish();
    writer.finish()
}
