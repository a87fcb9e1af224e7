//! End-to-end tests: scene file on disk, through the frame driver, decoded
//! back from the output file.

use std::fs;
use std::path::{Path, PathBuf};

use caustica::driver;
use caustica::output::load_texture;
use caustica::scene::Scene;

fn render_scene_file(dir: &Path, xml: &str) -> PathBuf {
    let scene_path = dir.join("scene.xml");
    fs::write(&scene_path, xml).unwrap();
    let mut scene = Scene::load(&scene_path, 0.0).unwrap();
    let out_path = dir.join(scene.out_file().to_string());
    scene.set_out_file(out_path.to_str().unwrap());
    driver::render(&scene).unwrap();
    out_path
}

#[test]
fn empty_scene_writes_an_all_zero_image() {
    let dir = tempfile::tempdir().unwrap();
    let out = render_scene_file(
        dir.path(),
        r#"<scene output_file="out.png">
            <background_color r="0.0" g="0.0" b="0.0" a="0.0"/>
            <camera>
                <resolution horizontal="16" vertical="16"/>
            </camera>
            <lights></lights>
            <surfaces></surfaces>
        </scene>"#,
    );
    let picture = load_texture(&out).unwrap();
    assert_eq!(picture.size(), glam::UVec2::new(16, 16));
    for y in 0..16 {
        for x in 0..16 {
            assert_eq!(picture.get(x, y), glam::Vec4::ZERO);
        }
    }
}

#[test]
fn still_render_survives_the_encode_decode_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let xml = r#"<scene output_file="out.png">
        <background_color r="0.25" g="0.5" b="0.75"/>
        <camera>
            <resolution horizontal="8" vertical="8"/>
        </camera>
        <lights></lights>
        <surfaces></surfaces>
    </scene>"#;
    let out = render_scene_file(dir.path(), xml);
    let picture = load_texture(&out).unwrap();
    // lossless up to the 8-bit quantization
    let expected = glam::Vec4::new(63.0, 127.0, 191.0, 255.0) / 255.0;
    for y in 0..8 {
        for x in 0..8 {
            assert!((picture.get(x, y) - expected).length() < 1e-6);
        }
    }
}

#[test]
fn motion_blur_leaves_two_half_intensity_ghosts() {
    let dir = tempfile::tempdir().unwrap();
    let xml = r#"<scene output_file="out.png">
        <background_color r="0.0" g="0.0" b="0.0" a="0.0"/>
        <motionblur subframes="2"/>
        <camera>
            <position x="0.0" y="0.0" z="6.0"/>
            <lookat x="0.0" y="0.0" z="0.0"/>
            <up x="0.0" y="1.0" z="0.0"/>
            <horizontal_fov angle="40"/>
            <resolution horizontal="32" vertical="32"/>
            <max_bounces n="2"/>
        </camera>
        <lights>
            <ambient_light>
                <color r="1.0" g="1.0" b="1.0"/>
            </ambient_light>
        </lights>
        <surfaces>
            <sphere radius="1.0">
                <position x="-1.0; 1.0(l)" y="0.0" z="0.0"/>
                <material_solid>
                    <color r="1.0" g="0.0" b="0.0"/>
                    <phong ka="1.0" kd="0.0" ks="0.0" exponent="1.0"/>
                </material_solid>
            </sphere>
        </surfaces>
    </scene>"#;
    let out = render_scene_file(dir.path(), xml);
    let picture = load_texture(&out).unwrap();
    // each ghost is present in one of the two sub-frames only
    let left = picture.get(12, 16);
    let right = picture.get(19, 16);
    assert!((left.x - 0.5).abs() < 0.1, "left ghost: {left}");
    assert!((right.x - 0.5).abs() < 0.1, "right ghost: {right}");
    // outside both ghosts the background stays black
    assert_eq!(picture.get(0, 16).x, 0.0);
    assert_eq!(picture.get(31, 16).x, 0.0);
}

#[test]
fn animation_writes_one_apng_frame_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let xml = r#"<scene output_file="out.png">
        <background_color r="0.2" g="0.2" b="0.2"/>
        <animation fps="2.0" length="1.5"/>
        <camera>
            <resolution horizontal="8" vertical="4"/>
        </camera>
        <lights></lights>
        <surfaces></surfaces>
    </scene>"#;
    let out = render_scene_file(dir.path(), xml);

    let decoder = png::Decoder::new(fs::File::open(&out).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let info = reader.info();
    assert_eq!(info.width, 8);
    assert_eq!(info.height, 4);
    let animation = info.animation_control().unwrap();
    assert_eq!(animation.num_frames, 3);
    // frame delay is 1000/fps milliseconds
    let frame = info.frame_control().unwrap();
    assert_eq!(frame.delay_num, 500);
    assert_eq!(frame.delay_den, 1000);
    // the first frame decodes back to the background
    let mut buffer = vec![0u8; reader.output_buffer_size()];
    reader.next_frame(&mut buffer).unwrap();
    assert_eq!(&buffer[0..4], &[51, 51, 51, 255]);
}

#[test]
fn missing_scene_file_reports_its_path() {
    let error = Scene::load(Path::new("/nonexistent/scene.xml"), 0.0).unwrap_err();
    assert!(error.to_string().contains("/nonexistent/scene.xml"));
}

#[test]
fn motion_blur_animation_renders_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let xml = r#"<scene output_file="out.png">
        <background_color r="0.5" g="0.5" b="0.5"/>
        <animation fps="2.0" length="1.0"/>
        <motionblur subframes="2"/>
        <camera>
            <resolution horizontal="4" vertical="4"/>
        </camera>
        <lights></lights>
        <surfaces></surfaces>
    </scene>"#;
    let out = render_scene_file(dir.path(), xml);

    let decoder = png::Decoder::new(fs::File::open(&out).unwrap());
    let mut reader = decoder.read_info().unwrap();
    assert_eq!(reader.info().animation_control().unwrap().num_frames, 2);
    let mut buffer = vec![0u8; reader.output_buffer_size()];
    reader.next_frame(&mut buffer).unwrap();
    // two identical sub-frames average back to the background
    assert_eq!(&buffer[0..4], &[127, 127, 127, 255]);
}
