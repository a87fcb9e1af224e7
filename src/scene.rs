//! Scene model and scene-file parser.
//!
//! The parser is a recursive descent over the XML scanner with a lookahead
//! of one tag and no backtracking. It does not check for duplicate tags
//! (the last one wins) or missing ones (defaults apply). Every scalar
//! attribute runs through the animation evaluator at the scene's load
//! time, which is why the whole scene is re-parsed for every frame and
//! sub-frame of an animation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use glam::{Affine3A, Mat3A, UVec2, Vec3, Vec3A, Vec4};

use crate::anim;
use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::julia::Julia;
use crate::light::{Light, LightType};
use crate::material::Material;
use crate::math::{Complex, INFINITE};
use crate::mesh::Mesh;
use crate::object::{Object, ObjectTransform, Primitive};
use crate::output;
use crate::sphere::Sphere;
use crate::xml::{TagType, XmlScanner};

/// A fully resolved scene at one instant of the animation timeline.
#[derive(Debug, Clone)]
pub struct Scene {
    scene_file: PathBuf,
    out_file: String,
    threads: u32,
    time: f32,
    frames: u32,
    fps: f32,
    sub_frames: u32,
    camera: Camera,
    background: Vec4,
    ambient_light: Vec4,
    lights: Vec<Light>,
    objects: Vec<Object>,
    dispersion_mode: bool,
    photon_map_scan_steps: f32,
    photon_map_texture_size: u32,
    photon_map_factor: f32,
}

impl Scene {
    /// Loads and resolves the scene file at normalized scene time `time`.
    pub fn load(path: &Path, time: f32) -> Result<Scene> {
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read(BufReader::new(file), path, time)
    }

    /// Parses a scene from any reader; `path` is used to resolve mesh and
    /// texture references.
    pub fn read(reader: impl BufRead, path: &Path, time: f32) -> Result<Scene> {
        let mut parser = SceneParser {
            xml: XmlScanner::new(reader),
            scene_file: path.to_path_buf(),
            time,
        };
        parser.parse()
    }

    /// Path of the scene file this scene was loaded from.
    pub fn scene_file(&self) -> &Path {
        &self.scene_file
    }

    /// Output file name.
    pub fn out_file(&self) -> &str {
        &self.out_file
    }

    /// Overrides the output file name (command line takes precedence over
    /// the scene file).
    pub fn set_out_file(&mut self, name: &str) {
        self.out_file = name.to_string();
    }

    /// Number of render worker threads.
    pub fn threads(&self) -> u32 {
        self.threads
    }

    /// Explicit still time, or [`INFINITE`] when none was configured.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of animation frames (1 for a still).
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Animation frame rate.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Temporal supersamples per frame; above 1 enables motion blur.
    pub fn sub_frames(&self) -> u32 {
        self.sub_frames
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Radiance of rays that leave the scene.
    pub fn background(&self) -> Vec4 {
        self.background
    }

    /// Ambient light power.
    pub fn ambient_light(&self) -> Vec4 {
        self.ambient_light
    }

    /// All light sources.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// All renderable objects.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Mutable objects, used by the photon pre-pass to deposit radiance.
    pub fn objects_mut(&mut self) -> &mut [Object] {
        &mut self.objects
    }

    /// True when any material disperses; every camera and photon ray is
    /// then split into eight chromatic copies.
    pub fn dispersion_mode(&self) -> bool {
        self.dispersion_mode
    }

    /// Angular samples per axis of the photon pre-pass; 0 disables it.
    pub fn photon_map_scan_steps(&self) -> f32 {
        self.photon_map_scan_steps
    }

    /// Side length of per-object photon textures.
    pub fn photon_map_texture_size(&self) -> u32 {
        self.photon_map_texture_size
    }

    /// Radiance carried by each photon ray.
    pub fn photon_map_factor(&self) -> f32 {
        self.photon_map_factor
    }
}

/// Accumulated object transform while parsing a `<transform>` block.
///
/// The three matrices are kept separate to avoid inverting anything: the
/// world-to-object matrix composes the inverse factors in reverse order,
/// and the normal matrix composes rotations and reciprocal scales.
struct TransformInfo {
    o2w_vector: Affine3A,
    o2w_normal: Mat3A,
    w2o_vector: Affine3A,
}

impl Default for TransformInfo {
    fn default() -> Self {
        Self {
            o2w_vector: Affine3A::IDENTITY,
            o2w_normal: Mat3A::IDENTITY,
            w2o_vector: Affine3A::IDENTITY,
        }
    }
}

impl TransformInfo {
    fn object_transform(&self) -> ObjectTransform {
        ObjectTransform {
            world2object: self.w2o_vector,
            object2world: self.o2w_vector,
            object2world_normals: self.o2w_normal,
        }
    }
}

/// Everything shared by the three surface kinds.
#[derive(Default)]
struct ObjectInfo {
    position: Vec3A,
    material: Material,
    transform: TransformInfo,
}

struct SceneParser<R: BufRead> {
    xml: XmlScanner<R>,
    scene_file: PathBuf,
    time: f32,
}

impl<R: BufRead> SceneParser<R> {
    fn parse(&mut self) -> Result<Scene> {
        self.next()?;
        if !self.tag_is("scene", TagType::Start) {
            return Err(self.err("scene tag expected"));
        }
        self.tag_scene()
    }

    fn tag_scene(&mut self) -> Result<Scene> {
        let mut scene = Scene {
            scene_file: self.scene_file.clone(),
            out_file: self.attr_string("output_file")?,
            threads: self.attr_u32_or("threads", 8)?,
            time: INFINITE,
            frames: 1,
            fps: 25.0,
            sub_frames: 1,
            camera: Camera::default(),
            background: Vec4::ZERO,
            ambient_light: Vec4::ZERO,
            lights: Vec::new(),
            objects: Vec::new(),
            dispersion_mode: false,
            photon_map_scan_steps: 0.0,
            photon_map_texture_size: 0,
            photon_map_factor: 0.0,
        };

        loop {
            self.next()?;
            if self.tag_is("scene", TagType::End) {
                break;
            }
            if self.tag_is("background_color", TagType::Empty) {
                scene.background = self.tag_color()?;
            } else if self.tag_is("animation", TagType::Empty) {
                scene.fps = self.attr_scalar("fps")?;
                scene.frames = (self.attr_scalar("length")? * scene.fps).ceil() as u32;
            } else if self.tag_is("still", TagType::Empty) {
                scene.time = self.attr_scalar("time")?;
            } else if self.tag_is("motionblur", TagType::Empty) {
                scene.sub_frames = self.attr_scalar("subframes")?.ceil() as u32;
            } else if self.tag_is("caustic", TagType::Empty) {
                scene.photon_map_scan_steps = self.attr_scalar("steps")?;
                scene.photon_map_texture_size = self.attr_u32("texture_size")?;
                scene.photon_map_factor = self.attr_scalar("factor")?;
            } else if self.tag_is("camera", TagType::Start) {
                scene.camera = self.tag_camera()?;
            } else if self.tag_is("lights", TagType::Start) {
                let (ambient, lights) = self.tag_lights()?;
                scene.ambient_light = ambient;
                scene.lights = lights;
            } else if self.tag_is("surfaces", TagType::Start) {
                scene.objects = self.tag_surfaces()?;
            } else {
                return Err(self.err("unknown tag in scene"));
            }
        }

        scene.dispersion_mode = scene
            .objects
            .iter()
            .any(|o| o.material().dispersion != 0.0);
        Ok(scene)
    }

    fn tag_camera(&mut self) -> Result<Camera> {
        let mut camera = Camera::default();
        loop {
            self.next()?;
            if self.tag_is("camera", TagType::End) {
                break;
            }
            if self.tag_is("position", TagType::Empty) {
                camera.set_position(self.tag_vector3()?);
            } else if self.tag_is("lookat", TagType::Empty) {
                camera.set_look_at(self.tag_vector3()?);
            } else if self.tag_is("up", TagType::Empty) {
                camera.set_up(self.tag_vector3()?);
            } else if self.tag_is("horizontal_fov", TagType::Empty) {
                camera.set_field_of_view(self.attr_scalar("angle")?.to_radians());
            } else if self.tag_is("resolution", TagType::Empty) {
                camera.set_resolution(UVec2::new(
                    self.attr_u32("horizontal")?,
                    self.attr_u32("vertical")?,
                ));
            } else if self.tag_is("max_bounces", TagType::Empty) {
                // parsed as a scalar so the bounce count can be animated
                camera.set_max_bounces(self.attr_scalar("n")?.round() as u32);
            } else if self.tag_is("supersampling", TagType::Empty) {
                camera.set_super_sampling_per_axis(self.attr_u32("subpixels_peraxis")?);
            } else if self.tag_is("dof", TagType::Empty) {
                camera.set_focus_point(self.tag_vector3()?);
                camera.set_lens_size(self.attr_scalar("lenssize")?);
            } else {
                return Err(self.err("unknown tag in camera"));
            }
        }
        Ok(camera)
    }

    fn tag_lights(&mut self) -> Result<(Vec4, Vec<Light>)> {
        let mut ambient = Vec4::ZERO;
        let mut lights = Vec::new();
        loop {
            self.next()?;
            if self.tag_is("lights", TagType::End) {
                break;
            }
            if self.tag_is("ambient_light", TagType::Start) {
                ambient = self.tag_light()?.power();
            } else if self.tag_is("parallel_light", TagType::Start)
                || self.tag_is("point_light", TagType::Start)
            {
                lights.push(self.tag_light()?);
            } else {
                return Err(self.err("unknown tag in lights"));
            }
        }
        Ok((ambient, lights))
    }

    /// Handles `<ambient_light>`, `<parallel_light>` and `<point_light>`.
    fn tag_light(&mut self) -> Result<Light> {
        let tag_name = self.xml.this_tag().name.clone();
        let mut position = Vec3A::ZERO;
        let mut color = Vec4::ZERO;
        loop {
            self.next()?;
            if self.tag_is(&tag_name, TagType::End) {
                break;
            }
            if self.tag_is("color", TagType::Empty) {
                color = self.tag_color()?;
            } else if self.tag_is("direction", TagType::Empty)
                || self.tag_is("position", TagType::Empty)
            {
                position = self.tag_vector3()?;
            } else {
                return Err(self.err(format!("unknown tag in {tag_name}")));
            }
        }
        let kind = if tag_name == "parallel_light" {
            LightType::Parallel
        } else {
            LightType::Point
        };
        Ok(Light::new(kind, position, color))
    }

    fn tag_surfaces(&mut self) -> Result<Vec<Object>> {
        let mut objects = Vec::new();
        loop {
            self.next()?;
            if self.tag_is("surfaces", TagType::End) {
                break;
            }
            if self.tag_is("sphere", TagType::Start) {
                let radius = self.attr_scalar("radius")?;
                let info = self.tag_object()?;
                objects.push(Object::new(
                    Primitive::Sphere(Sphere::new(
                        info.position,
                        radius,
                        info.transform.object_transform(),
                    )),
                    info.material,
                ));
            } else if self.tag_is("mesh", TagType::Start) {
                let mesh_file = self.resolve_path(self.attr_string("name")?);
                let mesh = Mesh::load(&mesh_file)?;
                let info = self.tag_object()?;
                objects.extend(mesh.create_objects(
                    &info.material,
                    info.transform.o2w_vector,
                    info.transform.o2w_normal,
                ));
            } else if self.tag_is("julia", TagType::Start) {
                let scale = self.attr_scalar("scale")?;
                let c = Vec4::new(
                    self.attr_scalar("cr")?,
                    self.attr_scalar("ca")?,
                    self.attr_scalar("cb")?,
                    self.attr_scalar("cc")?,
                );
                let cut_plane = self.attr_scalar("cutplane")?;
                let info = self.tag_object()?;
                objects.push(Object::new(
                    Primitive::Julia(Julia::new(
                        info.position,
                        scale,
                        c,
                        cut_plane,
                        info.transform.object_transform(),
                    )),
                    info.material,
                ));
            } else {
                return Err(self.err("unknown tag in surfaces"));
            }
        }
        Ok(objects)
    }

    fn tag_object(&mut self) -> Result<ObjectInfo> {
        let tag_name = self.xml.this_tag().name.clone();
        let mut info = ObjectInfo::default();
        loop {
            self.next()?;
            if self.tag_is(&tag_name, TagType::End) {
                break;
            }
            if self.tag_is("position", TagType::Empty) {
                info.position = self.tag_vector3()?;
            } else if self.tag_is("material_solid", TagType::Start)
                || self.tag_is("material_textured", TagType::Start)
            {
                info.material = self.tag_material()?;
            } else if self.tag_is("transform", TagType::Start) {
                info.transform = self.tag_transform()?;
            } else {
                return Err(self.err(format!("unknown tag in {tag_name}")));
            }
        }
        Ok(info)
    }

    fn tag_material(&mut self) -> Result<Material> {
        let tag_name = self.xml.this_tag().name.clone();
        let mut material = Material::default();
        loop {
            self.next()?;
            if self.tag_is(&tag_name, TagType::End) {
                break;
            }
            if self.tag_is("color", TagType::Empty) {
                material.color = self.tag_color()?;
            } else if self.tag_is("texture", TagType::Empty) {
                let texture_file = self.resolve_path(self.attr_string("name")?);
                material.texture = Some(output::load_texture(&texture_file)?);
            } else if self.tag_is("phong", TagType::Empty) {
                material.phong.ka = self.attr_scalar("ka")?;
                material.phong.kd = self.attr_scalar("kd")?;
                material.phong.ks = self.attr_scalar("ks")?;
                material.phong.exponent = self.attr_scalar("exponent")?;
            } else if self.tag_is("reflectance", TagType::Empty) {
                material.reflectance = self.attr_scalar("r")?;
            } else if self.tag_is("transmittance", TagType::Empty) {
                material.transmittance = self.attr_scalar("t")?;
            } else if self.tag_is("refraction", TagType::Empty) {
                // complex refraction: index of refraction + i * extinction
                material.refraction = Complex::new(
                    self.attr_scalar("iof")?,
                    self.attr_scalar_or("ec", 0.0)?,
                );
                material.dispersion = self.attr_scalar_or("disp", 0.0)?;
            } else {
                return Err(self.err(format!("unknown tag in {tag_name}")));
            }
        }
        Ok(material)
    }

    fn tag_transform(&mut self) -> Result<TransformInfo> {
        let mut t = TransformInfo::default();
        loop {
            self.next()?;
            if self.tag_is("transform", TagType::End) {
                break;
            }
            if self.tag_is("translate", TagType::Empty) {
                let v = Vec3::from(self.tag_vector3()?);
                t.o2w_vector = t.o2w_vector * Affine3A::from_translation(v);
                t.w2o_vector = Affine3A::from_translation(-v) * t.w2o_vector;
            } else if self.tag_is("scale", TagType::Empty) {
                let v = Vec3::from(self.tag_vector3()?);
                t.o2w_vector = t.o2w_vector * Affine3A::from_scale(v);
                t.w2o_vector = Affine3A::from_scale(1.0 / v) * t.w2o_vector;
                t.o2w_normal = t.o2w_normal * Mat3A::from_diagonal(1.0 / v);
            } else if self.tag_is("rotateX", TagType::Empty) {
                let angle = self.attr_scalar("theta")?.to_radians();
                t.o2w_vector = t.o2w_vector * Affine3A::from_rotation_x(angle);
                t.w2o_vector = Affine3A::from_rotation_x(-angle) * t.w2o_vector;
                t.o2w_normal = t.o2w_normal * Mat3A::from_rotation_x(angle);
            } else if self.tag_is("rotateY", TagType::Empty) {
                let angle = self.attr_scalar("theta")?.to_radians();
                t.o2w_vector = t.o2w_vector * Affine3A::from_rotation_y(angle);
                t.w2o_vector = Affine3A::from_rotation_y(-angle) * t.w2o_vector;
                t.o2w_normal = t.o2w_normal * Mat3A::from_rotation_y(angle);
            } else if self.tag_is("rotateZ", TagType::Empty) {
                let angle = self.attr_scalar("theta")?.to_radians();
                t.o2w_vector = t.o2w_vector * Affine3A::from_rotation_z(angle);
                t.w2o_vector = Affine3A::from_rotation_z(-angle) * t.w2o_vector;
                t.o2w_normal = t.o2w_normal * Mat3A::from_rotation_z(angle);
            } else {
                return Err(self.err("unknown tag in transform"));
            }
        }
        Ok(t)
    }

    fn tag_color(&self) -> Result<Vec4> {
        Ok(Vec4::new(
            self.attr_scalar("r")?,
            self.attr_scalar("g")?,
            self.attr_scalar("b")?,
            self.attr_scalar_or("a", 1.0)?,
        ))
    }

    fn tag_vector3(&self) -> Result<Vec3A> {
        Ok(Vec3A::new(
            self.attr_scalar("x")?,
            self.attr_scalar("y")?,
            self.attr_scalar("z")?,
        ))
    }

    fn next(&mut self) -> Result<()> {
        let result = self.xml.next_tag().map(|_| ());
        result.map_err(|message| Error::Parse {
            tag: self.xml.this_tag_string().to_string(),
            message,
        })
    }

    fn tag_is(&self, name: &str, kind: TagType) -> bool {
        self.xml.this_tag().is(name, kind)
    }

    fn err(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            tag: self.xml.this_tag_string().to_string(),
            message: message.into(),
        }
    }

    fn attr_string(&self, name: &str) -> Result<String> {
        Ok(self
            .xml
            .this_tag()
            .attr(name)
            .map_err(|m| self.err(m))?
            .to_string())
    }

    /// Required scalar attribute, evaluated through the animation grammar
    /// at the parser's scene time.
    fn attr_scalar(&self, name: &str) -> Result<f32> {
        let value = self.xml.this_tag().attr(name).map_err(|m| self.err(m))?;
        anim::evaluate(value, self.time).map_err(|m| self.err(m))
    }

    fn attr_scalar_or(&self, name: &str, default: f32) -> Result<f32> {
        match self.xml.this_tag().attributes.get(name) {
            Some(value) => anim::evaluate(value, self.time).map_err(|m| self.err(m)),
            None => Ok(default),
        }
    }

    fn attr_u32(&self, name: &str) -> Result<u32> {
        let value = self.xml.this_tag().attr(name).map_err(|m| self.err(m))?;
        value
            .parse()
            .map_err(|_| self.err(format!("invalid integer \"{value}\"")))
    }

    fn attr_u32_or(&self, name: &str, default: u32) -> Result<u32> {
        match self.xml.this_tag().attributes.get(name) {
            Some(value) => value
                .parse()
                .map_err(|_| self.err(format!("invalid integer \"{value}\""))),
            None => Ok(default),
        }
    }

    /// Resolves a mesh or texture reference relative to the scene file.
    fn resolve_path(&self, name: String) -> PathBuf {
        self.scene_file.with_file_name(name)
    }
}

#[cfg(test)]
fn parse_str(input: &str, time: f32) -> Result<Scene> {
    Scene::read(input.as_bytes(), Path::new("scene.xml"), time)
}

#[cfg(test)]
const MINIMAL_SCENE: &str = r#"
<scene output_file="out.png" threads="4">
    <background_color r="0.1" g="0.2" b="0.3"/>
    <camera>
        <position x="0.0" y="0.0" z="4.0"/>
        <lookat x="0.0" y="0.0" z="0.0"/>
        <up x="0.0" y="1.0" z="0.0"/>
        <horizontal_fov angle="45"/>
        <resolution horizontal="16" vertical="8"/>
        <max_bounces n="3"/>
        <supersampling subpixels_peraxis="2"/>
    </camera>
    <lights>
        <ambient_light>
            <color r="1.0" g="1.0" b="1.0"/>
        </ambient_light>
        <point_light>
            <color r="2.0" g="2.0" b="2.0"/>
            <position x="5.0" y="5.0" z="5.0"/>
        </point_light>
    </lights>
    <surfaces>
        <sphere radius="1.0">
            <position x="0.0" y="0.0" z="0.0"/>
            <material_solid>
                <color r="1.0" g="0.0" b="0.0"/>
                <phong ka="0.1" kd="0.9" ks="0.0" exponent="1.0"/>
            </material_solid>
        </sphere>
    </surfaces>
</scene>
"#;

#[test]
fn parses_a_minimal_scene() {
    let scene = parse_str(MINIMAL_SCENE, 0.0).unwrap();
    assert_eq!(scene.out_file(), "out.png");
    assert_eq!(scene.threads(), 4);
    assert_eq!(scene.frames(), 1);
    assert_eq!(scene.time(), INFINITE);
    assert_eq!(scene.camera().resolution(), UVec2::new(16, 8));
    assert_eq!(scene.camera().max_bounces(), 3);
    assert_eq!(scene.camera().super_sampling_per_axis(), 2);
    assert!((scene.camera().field_of_view() - 45f32.to_radians()).abs() < 1e-6);
    assert_eq!(scene.lights().len(), 1);
    assert_eq!(scene.objects().len(), 1);
    assert_eq!(scene.background(), Vec4::new(0.1, 0.2, 0.3, 1.0));
    assert_eq!(scene.ambient_light(), Vec4::ONE);
    assert!(!scene.dispersion_mode());
}

#[test]
fn empty_scene_defaults() {
    let scene = parse_str(r#"<scene output_file="x.png"></scene>"#, 0.0).unwrap();
    assert_eq!(scene.threads(), 8);
    assert_eq!(scene.fps(), 25.0);
    assert_eq!(scene.sub_frames(), 1);
    assert_eq!(scene.background(), Vec4::ZERO);
    assert!(scene.objects().is_empty());
}

#[test]
fn animation_sets_frame_count() {
    let scene = parse_str(
        r#"<scene output_file="x.png"><animation fps="25" length="2.0"/></scene>"#,
        0.0,
    )
    .unwrap();
    assert_eq!(scene.frames(), 50);
    assert_eq!(scene.fps(), 25.0);
}

#[test]
fn animated_attributes_evaluate_at_load_time() {
    let xml = r#"
<scene output_file="x.png">
    <surfaces>
        <sphere radius="1.0; 3.0(l)">
            <position x="0.0" y="0.0" z="0.0"/>
            <material_solid>
                <color r="1.0" g="1.0" b="1.0"/>
                <phong ka="1.0" kd="0.0" ks="0.0" exponent="1.0"/>
            </material_solid>
        </sphere>
    </surfaces>
</scene>"#;
    use crate::ray::Ray;
    for (time, expected_radius) in [(0.0, 1.0f32), (0.5, 2.0), (1.0, 3.0)] {
        let scene = parse_str(xml, time).unwrap();
        let ray = Ray::new(Vec3A::new(0.0, 0.0, 10.0), Vec3A::new(0.0, 0.0, -1.0));
        let hit = scene.objects()[0].intersect(&ray, INFINITE).unwrap();
        assert!((hit.distance - (10.0 - expected_radius)).abs() < 1e-3);
    }
}

#[test]
fn dispersion_mode_follows_materials() {
    let xml = r#"
<scene output_file="x.png">
    <surfaces>
        <sphere radius="1.0">
            <position x="0.0" y="0.0" z="0.0"/>
            <material_solid>
                <color r="1.0" g="1.0" b="1.0"/>
                <phong ka="1.0" kd="0.0" ks="0.0" exponent="1.0"/>
                <transmittance t="1.0"/>
                <refraction iof="1.5" disp="0.1"/>
            </material_solid>
        </sphere>
    </surfaces>
</scene>"#;
    let scene = parse_str(xml, 0.0).unwrap();
    assert!(scene.dispersion_mode());
    assert_eq!(scene.objects()[0].material().refraction, Complex::new(1.5, 0.0));
}

#[test]
fn transform_order_is_right_multiplied() {
    // translate then scale: object-to-world applies the scale first
    let xml = r#"
<scene output_file="x.png">
    <surfaces>
        <sphere radius="1.0">
            <position x="0.0" y="0.0" z="0.0"/>
            <material_solid>
                <color r="1.0" g="1.0" b="1.0"/>
                <phong ka="1.0" kd="0.0" ks="0.0" exponent="1.0"/>
            </material_solid>
            <transform>
                <translate x="5.0" y="0.0" z="0.0"/>
                <scale x="2.0" y="2.0" z="2.0"/>
            </transform>
        </sphere>
    </surfaces>
</scene>"#;
    use crate::ray::Ray;
    let scene = parse_str(xml, 0.0).unwrap();
    // unit sphere scaled by 2 then translated to x = 5: surface spans 3..7
    let ray = Ray::new(Vec3A::new(10.0, 0.0, 0.0), Vec3A::new(-1.0, 0.0, 0.0));
    let hit = scene.objects()[0].intersect(&ray, INFINITE).unwrap();
    assert!((hit.distance - 3.0).abs() < 1e-3);
    assert!((hit.normal - Vec3A::X).length() < 1e-4);
}

#[test]
fn unknown_tags_report_context() {
    let err = parse_str(r#"<scene output_file="x.png"><bogus/></scene>"#, 0.0).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("unknown tag"));
    assert!(message.contains("bogus"));
}

#[test]
fn missing_scene_tag_is_an_error() {
    assert!(parse_str("<camera/>", 0.0).is_err());
}
