//! Per-frame renderer.
//!
//! A fixed pool of OS threads consumes scanlines through a shared atomic
//! counter; each worker owns its RNG and shades pixels by casting one
//! recursive ray per subpixel and lens sample. The shader is classic
//! Whitted style: Phong direct lighting plus Fresnel-weighted reflection
//! and refraction, with the photon map's baked caustics added on top.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use glam::{Affine3A, UVec2, Vec2, Vec3A, Vec4};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::light::LightType;
use crate::material::Material;
use crate::math::{hsv_to_rgb, without_alpha, Complex, EPSILON, INFINITE};
use crate::object::Intersection;
use crate::picture::Picture;
use crate::ray::Ray;
use crate::scene::Scene;

/// Renders one frame of the scene.
pub fn raytrace(scene: &Scene) -> Picture {
    let instance = Instance::new(scene);
    let mut picture = Picture::new(instance.pic_size);
    let next_line = AtomicU32::new(0);
    let threads = scene.threads().max(1);

    let start = Instant::now();
    std::thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel();
        for _ in 0..threads {
            let sender = sender.clone();
            let instance = &instance;
            let next_line = &next_line;
            scope.spawn(move || {
                let mut worker = Worker {
                    instance,
                    rng: ChaCha20Rng::from_os_rng(),
                };
                loop {
                    let y = next_line.fetch_add(1, Ordering::Relaxed);
                    if y >= instance.pic_size.y {
                        break;
                    }
                    let row = worker.raytrace_line(y);
                    if sender.send((y, row)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(sender);
        for (y, row) in receiver {
            for (x, radiance) in row.into_iter().enumerate() {
                picture.set(x as u32, y, radiance);
            }
        }
    });
    debug!("frame rendered in {:.2?}", start.elapsed());
    picture
}

/// Per-frame constants shared by all workers.
struct Instance<'a> {
    scene: &'a Scene,
    pic_size: UVec2,
    half_fov: Vec2,
    pixel_size: Vec2,
    camera_transformation: Affine3A,
}

impl<'a> Instance<'a> {
    fn new(scene: &'a Scene) -> Self {
        let pic_size = scene.camera().resolution();
        let pic_size_f = Vec2::new(pic_size.x as f32, pic_size.y as f32);
        // The configured angle acts directly as the half field of view;
        // existing scene files are tuned to this.
        let half_fov_x = scene.camera().field_of_view();
        let half_fov = Vec2::new(
            -half_fov_x.tan(),
            half_fov_x.tan() * (pic_size_f.y / pic_size_f.x),
        );
        let pixel_size = -2.0 / pic_size_f * half_fov;
        Self {
            scene,
            pic_size,
            half_fov,
            pixel_size,
            camera_transformation: scene.camera().transformation(),
        }
    }
}

/// One render worker with its own RNG for lens sampling.
struct Worker<'a> {
    instance: &'a Instance<'a>,
    rng: ChaCha20Rng,
}

impl Worker<'_> {
    fn raytrace_line(&mut self, y: u32) -> Vec<Vec4> {
        let i = self.instance;
        let camera = i.scene.camera();
        let n = camera.super_sampling_per_axis();
        let mut row = vec![Vec4::ZERO; i.pic_size.x as usize];

        // pixel centers on the image plane at z = -1 in camera space
        let ray_y = i.half_fov.y + y as f32 * i.pixel_size.y + 0.5 * i.pixel_size.y;
        let mut ray_x = i.half_fov.x + 0.5 * i.pixel_size.x;
        for pixel in row.iter_mut() {
            let mut radiance = Vec4::ZERO;
            // one ray per subpixel, on a regular grid inset from the pixel
            // edges by half a step
            for sub_y in 0..n {
                for sub_x in 0..n {
                    let sub_displacement = Vec2::new(
                        2.0 * (sub_x + 1) as f32 / (n + 1) as f32 - 1.0,
                        2.0 * (sub_y + 1) as f32 / (n + 1) as f32 - 1.0,
                    );
                    let target_displacement = sub_displacement * i.pixel_size;
                    let target_on_image_plane = Vec3A::new(
                        ray_x + target_displacement.x,
                        ray_y + target_displacement.y,
                        -1.0,
                    );
                    // scaling the image-plane target by the focus distance
                    // projects it onto the focus plane
                    let target_on_focus_plane = i
                        .camera_transformation
                        .transform_point3a(target_on_image_plane * camera.focus_distance());
                    // ray origins spread over the lens area; with a zero
                    // lens all rays share the camera position
                    let jitter = Vec2::new(
                        self.rng.random_range(-1.0..1.0f32),
                        self.rng.random_range(-1.0..1.0f32),
                    );
                    let origin_displacement =
                        (sub_displacement + jitter * (1.0 / n as f32)) * camera.lens_size();
                    let mut ray_origin = i.camera_transformation.transform_point3a(Vec3A::ZERO);
                    ray_origin.x += origin_displacement.x;
                    ray_origin.y += origin_displacement.y;
                    let ray = Ray::new(ray_origin, target_on_focus_plane - ray_origin);

                    if i.scene.dispersion_mode() {
                        // eight chromatic copies at 45 degree hue steps
                        let mut hue = 0.0f32;
                        while hue < 360.0 {
                            radiance += self.cast_ray(&ray, 0, hue / 180.0 - 1.0)
                                * hsv_to_rgb(hue, 100.0, 100.0)
                                / 4.0;
                            hue += 45.0;
                        }
                    } else {
                        radiance += self.cast_ray(&ray, 0, 0.0);
                    }
                }
            }
            *pixel += radiance * (1.0 / (n * n) as f32);
            ray_x += i.pixel_size.x;
        }
        row
    }

    fn cast_ray(&self, ray: &Ray, recursion: u32, wavelength: f32) -> Vec4 {
        let scene = self.instance.scene;
        if recursion > scene.camera().max_bounces() {
            return Vec4::ZERO;
        }

        let mut rad = scene.background();
        let mut max_distance = INFINITE;

        for object in scene.objects() {
            let Some(intersection) = object.intersect(ray, max_distance) else {
                continue;
            };
            let material = object.material();
            let cos_ray_normal = ray
                .direction()
                .dot(intersection.normal)
                .clamp(-1.0, 1.0);

            if cos_ray_normal >= 0.0
                && (material.transmittance == 0.0 || material.refraction.norm_sqr() == 0.0)
            {
                // back-faces of non-transparent objects are invisible
                continue;
            }

            // the hit replaces the background or any farther object found
            // so far
            rad = Vec4::ZERO;
            max_distance = intersection.distance;

            if cos_ray_normal < 0.0 {
                rad += self.calc_phong(ray, &intersection, material);
                rad += object.photon(intersection.photon_uv);
            }

            // transmittance and reflectance gate refraction and reflection
            if (material.transmittance != 0.0 || material.reflectance != 0.0)
                && material.refraction.norm_sqr() > 0.0
            {
                let kr = fresnel(material, cos_ray_normal, wavelength);
                if material.transmittance != 0.0 && kr < 1.0 {
                    rad += self.calc_refraction(
                        ray,
                        &intersection,
                        material,
                        cos_ray_normal,
                        recursion,
                        wavelength,
                    ) * (1.0 - kr);
                }
                if material.reflectance != 0.0 && kr > 0.0 {
                    rad += self
                        .calc_reflection(ray, &intersection, cos_ray_normal, recursion, wavelength)
                        * kr;
                }
            }
            rad = without_alpha(rad);
        }
        rad
    }

    fn calc_phong(&self, ray: &Ray, intersection: &Intersection, material: &Material) -> Vec4 {
        let scene = self.instance.scene;
        let point = intersection.point;
        let normal = intersection.normal;
        let mut rad = Vec4::ZERO;

        let material_color = match &material.texture {
            Some(texture) => texture.sample_bilinear(intersection.texture_uv),
            None => material.color,
        };

        rad += scene.ambient_light() * material_color * material.phong.ka;
        for light in scene.lights() {
            let mut light_ray = match light.kind() {
                LightType::Parallel => Ray::new(point, -light.direction()),
                LightType::Point => Ray::new(point, light.position() - point),
            };
            light_ray.add_offset(normal * EPSILON);
            let light_distance = match light.kind() {
                LightType::Parallel => INFINITE,
                LightType::Point => (light.position() - light_ray.origin()).length(),
            };
            // only front faces cast shadows
            let shadowed = scene.objects().iter().any(|object| {
                object
                    .intersect(&light_ray, light_distance)
                    .is_some_and(|hit| light_ray.direction().dot(hit.normal) < 0.0)
            });
            if shadowed {
                continue;
            }
            // point lights keep their full power regardless of distance
            let light_power = light.power();
            let diffuse = light_power
                * material_color
                * light_ray.direction().dot(normal).max(0.0)
                * material.phong.kd;
            let light_reflection = (normal * light_ray.direction().dot(normal) * 2.0
                - light_ray.direction())
            .normalize_or_zero();
            let specular = light_power
                * light_reflection
                    .dot(-ray.direction())
                    .max(0.0)
                    .powf(material.phong.exponent)
                * material.phong.ks;
            rad += diffuse + specular;
        }
        rad
    }

    fn calc_refraction(
        &self,
        ray: &Ray,
        intersection: &Intersection,
        material: &Material,
        cos_ray_normal: f32,
        recursion: u32,
        wavelength: f32,
    ) -> Vec4 {
        match refraction_ray(ray, intersection, material, cos_ray_normal, wavelength) {
            Some(refraction) => self.cast_ray(&refraction, recursion + 1, wavelength),
            None => Vec4::ZERO,
        }
    }

    fn calc_reflection(
        &self,
        ray: &Ray,
        intersection: &Intersection,
        cos_ray_normal: f32,
        recursion: u32,
        wavelength: f32,
    ) -> Vec4 {
        let mirror = reflection_ray(ray, intersection, cos_ray_normal);
        self.cast_ray(&mirror, recursion + 1, wavelength)
    }
}

/// Fresnel reflection coefficient kr for a possibly complex index of
/// refraction; the imaginary part keeps the extinction of conductors in
/// the split. Returns 1 on total internal reflection.
pub(crate) fn fresnel(material: &Material, cos_ray_normal: f32, wavelength: f32) -> f32 {
    let mut etai = Complex::from(1.0);
    let mut etat = material.refraction + Complex::from(wavelength * material.dispersion);
    if cos_ray_normal > 0.0 {
        // leaving the material
        std::mem::swap(&mut etai, &mut etat);
    }
    // sine of the transmitted angle via the Pythagorean identity and
    // Snell's law
    let sint = etai / etat * (1.0 - cos_ray_normal * cos_ray_normal).max(0.0).sqrt();
    if sint.norm_sqr() < 1.0 {
        let cost = (1.0 - sint * sint).sqrt();
        let cos_abs = cos_ray_normal.abs();
        let rs = (etat * cos_abs - etai * cost) / (etat * cos_abs + etai * cost);
        let rp = (etai * cos_abs - etat * cost) / (etai * cos_abs + etat * cost);
        (rs.norm_sqr() + rp.norm_sqr()) / 2.0
    } else {
        // total internal reflection
        1.0
    }
}

/// Builds the refracted continuation of `ray` behind the intersection, or
/// `None` past the critical angle. Only the real part of the refraction
/// index bends the ray.
pub(crate) fn refraction_ray(
    ray: &Ray,
    intersection: &Intersection,
    material: &Material,
    cos_ray_normal: f32,
    wavelength: f32,
) -> Option<Ray> {
    let normal = intersection.normal;
    let mut cos_turned = cos_ray_normal;
    let mut normal_turned = normal;
    let mut refraction_index = material.refraction.re + wavelength * material.dispersion;
    let outside = cos_ray_normal <= 0.0;
    if outside {
        cos_turned = -cos_turned;
        refraction_index = 1.0 / refraction_index;
    } else {
        normal_turned = -normal_turned;
    }
    let k = 1.0 - refraction_index * refraction_index * (1.0 - cos_turned * cos_turned);
    if k < 0.0 {
        return None;
    }
    let direction =
        ray.direction() * refraction_index + normal_turned * (refraction_index * cos_turned - k.sqrt());
    let mut refraction = Ray::new(intersection.point, direction);
    refraction.add_offset(normal * if outside { -EPSILON } else { EPSILON });
    Some(refraction)
}

/// Builds the mirrored continuation of `ray` off the intersection.
pub(crate) fn reflection_ray(ray: &Ray, intersection: &Intersection, cos_ray_normal: f32) -> Ray {
    let normal = intersection.normal;
    let outside = cos_ray_normal <= 0.0;
    let direction = ray.direction() - normal * cos_ray_normal * 2.0;
    let mut mirror = Ray::new(intersection.point, direction);
    mirror.add_offset(normal * if outside { EPSILON } else { -EPSILON });
    mirror
}

#[cfg(test)]
fn test_scene(xml: &str) -> Scene {
    Scene::read(xml.as_bytes(), std::path::Path::new("scene.xml"), 0.0).unwrap()
}

#[test]
fn fresnel_at_normal_incidence_matches_closed_form() {
    let material = Material {
        refraction: Complex::new(1.5, 0.0),
        ..Material::default()
    };
    let expected = ((1.5f32 - 1.0) / (1.5 + 1.0)).powi(2);
    assert!((fresnel(&material, -1.0, 0.0) - expected).abs() < 1e-6);
    assert!((fresnel(&material, 1.0, 0.0) - expected).abs() < 1e-6);
}

#[test]
fn fresnel_stays_in_unit_range_and_hits_tir() {
    let material = Material {
        refraction: Complex::new(1.5, 0.0),
        ..Material::default()
    };
    for i in 0..=10 {
        let cos = -1.0 + i as f32 * 0.2;
        let kr = fresnel(&material, cos, 0.0);
        assert!((0.0..=1.0).contains(&kr));
    }
    // leaving glass at a grazing angle: total internal reflection
    assert_eq!(fresnel(&material, 0.1, 0.0), 1.0);
}

#[test]
fn dispersion_shifts_the_fresnel_split() {
    let material = Material {
        refraction: Complex::new(1.5, 0.0),
        dispersion: 0.2,
        ..Material::default()
    };
    let blue = fresnel(&material, -1.0, 1.0);
    let red = fresnel(&material, -1.0, -1.0);
    assert!(blue > red);
}

#[test]
fn refraction_bends_toward_the_normal_on_entry() {
    let intersection = Intersection {
        distance: 1.0,
        point: Vec3A::ZERO,
        normal: Vec3A::Z,
        texture_uv: Vec2::ZERO,
        photon_uv: Vec2::ZERO,
    };
    let material = Material {
        refraction: Complex::new(1.5, 0.0),
        ..Material::default()
    };
    let incoming = Ray::new(Vec3A::new(-1.0, 0.0, 1.0), Vec3A::new(1.0, 0.0, -1.0));
    let cos = incoming.direction().dot(intersection.normal);
    let refracted = refraction_ray(&incoming, &intersection, &material, cos, 0.0).unwrap();
    let cos_in = (-incoming.direction().z).acos();
    let cos_out = (-refracted.direction().z).acos();
    assert!(cos_out < cos_in);
    // biased behind the surface
    assert!(refracted.origin().z < 0.0);
}

#[test]
fn reflection_mirrors_the_direction() {
    let intersection = Intersection {
        distance: 1.0,
        point: Vec3A::ZERO,
        normal: Vec3A::Z,
        texture_uv: Vec2::ZERO,
        photon_uv: Vec2::ZERO,
    };
    let incoming = Ray::new(Vec3A::new(-1.0, 0.0, 1.0), Vec3A::new(1.0, 0.0, -1.0));
    let cos = incoming.direction().dot(intersection.normal);
    let mirror = reflection_ray(&incoming, &intersection, cos);
    let expected = Vec3A::new(1.0, 0.0, 1.0).normalize();
    assert!((mirror.direction() - expected).length() < 1e-5);
    assert!(mirror.origin().z > 0.0);
}

#[test]
fn empty_scene_renders_the_background() {
    let scene = test_scene(
        r#"<scene output_file="x.png">
            <camera>
                <resolution horizontal="16" vertical="16"/>
            </camera>
            <lights></lights>
            <surfaces></surfaces>
        </scene>"#,
    );
    let picture = raytrace(&scene);
    assert_eq!(picture.size(), UVec2::new(16, 16));
    for y in 0..16 {
        for x in 0..16 {
            assert_eq!(picture.get(x, y), Vec4::ZERO);
        }
    }
}

#[cfg(test)]
const MATTE_SPHERE: &str = r#"
<scene output_file="x.png" threads="2">
    <background_color r="0.0" g="0.0" b="0.0" a="0.0"/>
    <camera>
        <position x="0.0" y="0.0" z="4.0"/>
        <lookat x="0.0" y="0.0" z="0.0"/>
        <up x="0.0" y="1.0" z="0.0"/>
        <horizontal_fov angle="30"/>
        <resolution horizontal="64" vertical="64"/>
        <max_bounces n="4"/>
        <supersampling subpixels_peraxis="1"/>
    </camera>
    <lights>
        <ambient_light>
            <color r="1.0" g="1.0" b="1.0"/>
        </ambient_light>
        <point_light>
            <color r="1.0" g="1.0" b="1.0"/>
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
fn matte_sphere_shades_like_phong() {
    let scene = test_scene(MATTE_SPHERE);
    let picture = raytrace(&scene);
    let center = picture.get(32, 32);
    // expected red: ka + kd * (n . l) at the hit point (0, 0, 1)
    let light = (Vec3A::new(5.0, 5.0, 5.0) - Vec3A::Z).normalize();
    let expected = 0.1 + 0.9 * light.z;
    assert!((center.x - expected).abs() < 0.05);
    // the material has no green or blue to reflect
    assert!(center.y.abs() < 1e-3);
    assert!(center.z.abs() < 1e-3);
    // a corner pixel misses the sphere entirely
    assert_eq!(picture.get(0, 0), Vec4::ZERO);
}

#[test]
fn render_is_deterministic_without_a_lens() {
    let scene = test_scene(MATTE_SPHERE);
    let first = raytrace(&scene);
    let second = raytrace(&scene);
    for y in 0..64 {
        for x in 0..64 {
            assert_eq!(first.get(x, y), second.get(x, y));
        }
    }
}

#[test]
fn reflective_sphere_mirrors_the_background_hue() {
    let scene = test_scene(
        r#"<scene output_file="x.png">
            <background_color r="0.2" g="0.4" b="0.6"/>
            <camera>
                <position x="0.0" y="0.0" z="4.0"/>
                <lookat x="0.0" y="0.0" z="0.0"/>
                <up x="0.0" y="1.0" z="0.0"/>
                <horizontal_fov angle="30"/>
                <resolution horizontal="33" vertical="33"/>
                <max_bounces n="4"/>
            </camera>
            <lights></lights>
            <surfaces>
                <sphere radius="1.0">
                    <position x="0.0" y="0.0" z="0.0"/>
                    <material_solid>
                        <color r="1.0" g="1.0" b="1.0"/>
                        <phong ka="0.0" kd="0.0" ks="0.0" exponent="1.0"/>
                        <reflectance r="1.0"/>
                        <refraction iof="1.5"/>
                    </material_solid>
                </sphere>
            </surfaces>
        </scene>"#,
    );
    let picture = raytrace(&scene);
    let center = picture.get(16, 16);
    // at normal incidence kr is small but the mirrored background hue
    // ratios survive
    assert!(center.x > 1e-3);
    assert!(center.y > center.x);
    assert!(center.z > center.y);
    assert!((center.y / center.x - 2.0).abs() < 0.1);
    assert!((center.z / center.x - 3.0).abs() < 0.1);
}

#[test]
fn shadowed_point_gets_only_ambient_light() {
    let scene = test_scene(
        r#"<scene output_file="x.png">
            <camera>
                <position x="0.0" y="0.0" z="6.0"/>
                <lookat x="0.0" y="0.0" z="0.0"/>
                <up x="0.0" y="1.0" z="0.0"/>
                <horizontal_fov angle="30"/>
                <resolution horizontal="17" vertical="17"/>
                <max_bounces n="4"/>
            </camera>
            <lights>
                <point_light>
                    <color r="1.0" g="1.0" b="1.0"/>
                    <position x="0.0" y="0.0" z="3.0"/>
                </point_light>
            </lights>
            <surfaces>
                <sphere radius="0.5">
                    <position x="0.0" y="0.0" z="2.0"/>
                    <material_solid>
                        <color r="1.0" g="1.0" b="1.0"/>
                        <phong ka="0.0" kd="1.0" ks="0.0" exponent="1.0"/>
                    </material_solid>
                </sphere>
                <sphere radius="1.0">
                    <position x="0.0" y="0.0" z="0.0"/>
                    <material_solid>
                        <color r="1.0" g="1.0" b="1.0"/>
                        <phong ka="0.0" kd="1.0" ks="0.0" exponent="1.0"/>
                    </material_solid>
                </sphere>
            </surfaces>
        </scene>"#,
    );
    let picture = raytrace(&scene);
    // the small sphere occludes the light for the big one behind it: the
    // center pixel shows the small sphere lit, pixels just past its rim
    // show the big sphere in shadow
    let center = picture.get(8, 8);
    assert!(center.x > 0.5);
    let shadowed = picture.get(8, 6);
    assert!(shadowed.x < 1e-3);
}

#[test]
fn camera_inside_opaque_sphere_sees_the_background() {
    let scene = test_scene(
        r#"<scene output_file="x.png">
            <background_color r="0.2" g="0.4" b="0.6"/>
            <camera>
                <resolution horizontal="8" vertical="8"/>
            </camera>
            <lights></lights>
            <surfaces>
                <sphere radius="2.0">
                    <position x="0.0" y="0.0" z="0.0"/>
                    <material_solid>
                        <color r="1.0" g="0.0" b="0.0"/>
                        <phong ka="1.0" kd="0.0" ks="0.0" exponent="1.0"/>
                    </material_solid>
                </sphere>
            </surfaces>
        </scene>"#,
    );
    let picture = raytrace(&scene);
    // back-faces of opaque objects never replace the background
    assert_eq!(picture.get(4, 4), Vec4::new(0.2, 0.4, 0.6, 1.0));
}

#[test]
fn textured_sphere_samples_its_texture() {
    let dir = tempfile::tempdir().unwrap();
    let texture_path = dir.path().join("tex.png");
    {
        let mut texture = Picture::new(UVec2::new(4, 4));
        for y in 0..4 {
            for x in 0..4 {
                texture.set(x, y, Vec4::new(0.0, 1.0, 0.0, 1.0));
            }
        }
        crate::output::save_picture(&texture, &texture_path, 1.0).unwrap();
    }
    let xml = format!(
        r#"<scene output_file="x.png">
            <camera>
                <position x="0.0" y="0.0" z="4.0"/>
                <lookat x="0.0" y="0.0" z="0.0"/>
                <up x="0.0" y="1.0" z="0.0"/>
                <horizontal_fov angle="30"/>
                <resolution horizontal="9" vertical="9"/>
            </camera>
            <lights>
                <ambient_light>
                    <color r="1.0" g="1.0" b="1.0"/>
                </ambient_light>
            </lights>
            <surfaces>
                <sphere radius="1.0">
                    <position x="0.0" y="0.0" z="0.0"/>
                    <material_textured>
                        <color r="1.0" g="0.0" b="0.0"/>
                        <texture name="{}"/>
                        <phong ka="1.0" kd="0.0" ks="0.0" exponent="1.0"/>
                    </material_textured>
                </sphere>
            </surfaces>
        </scene>"#,
        texture_path.file_name().unwrap().to_str().unwrap()
    );
    let scene = Scene::read(xml.as_bytes(), &dir.path().join("scene.xml"), 0.0).unwrap();
    let picture = raytrace(&scene);
    let center = picture.get(4, 4);
    // texture overrides the solid color: green, not red
    assert!(center.y > 0.9);
    assert!(center.x < 0.1);
}

#[test]
fn lens_sampling_blurs_an_out_of_focus_edge() {
    let xml = |lens: f32| {
        format!(
            r#"<scene output_file="x.png">
            <camera>
                <position x="0.0" y="0.0" z="4.0"/>
                <lookat x="0.0" y="0.0" z="0.0"/>
                <up x="0.0" y="1.0" z="0.0"/>
                <horizontal_fov angle="30"/>
                <resolution horizontal="33" vertical="33"/>
                <max_bounces n="2"/>
                <supersampling subpixels_peraxis="2"/>
                <dof x="0.0" y="0.0" z="-100.0" lenssize="{lens}"/>
            </camera>
            <lights>
                <ambient_light>
                    <color r="1.0" g="1.0" b="1.0"/>
                </ambient_light>
            </lights>
            <surfaces>
                <sphere radius="1.0">
                    <position x="0.0" y="0.0" z="0.0"/>
                    <material_solid>
                        <color r="1.0" g="1.0" b="1.0"/>
                        <phong ka="1.0" kd="0.0" ks="0.0" exponent="1.0"/>
                    </material_solid>
                </sphere>
            </surfaces>
        </scene>"#
        )
    };
    let sharp = raytrace(&test_scene(&xml(0.0)));
    let blurred = raytrace(&test_scene(&xml(0.5)));
    let mut difference = 0.0;
    for y in 0..33 {
        for x in 0..33 {
            difference += (sharp.get(x, y) - blurred.get(x, y)).abs().element_sum();
        }
    }
    // the sphere sits far off the focus plane, so its edge must smear
    assert!(difference > 0.01);
}
