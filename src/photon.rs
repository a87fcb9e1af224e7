//! Photon-mapping pre-pass for caustics.
//!
//! Before a frame renders, sample rays are cast from every point light
//! through all reflective and transparent objects until they hit a diffuse
//! surface, where their radiance is summed into that object's photon
//! texture. The renderer later adds the baked texture to its direct
//! lighting, which is what makes caustics show up. The pass runs single
//! threaded, strictly before any render workers start.

use std::f32::consts::PI;

use glam::{Vec3A, Vec4};

use crate::light::LightType;
use crate::math::{hsv_to_rgb, INFINITE};
use crate::object::Intersection;
use crate::ray::Ray;
use crate::raytracer::{fresnel, reflection_ray, refraction_ray};
use crate::scene::Scene;

/// Runs the pre-pass, depositing photons on the scene's objects.
pub fn generate(scene: &mut Scene) {
    let lights = scene.lights().to_vec();
    for light in lights {
        if light.kind() == LightType::Parallel {
            // parallel lights would have to be projected onto the scene's
            // objects instead of scanned over a direction sphere; they are
            // skipped
            continue;
        }
        let scan_step_angle = 2.0 * PI / scene.photon_map_scan_steps();
        let mut phi = 0.0f32;
        while phi < 2.0 * PI {
            let mut theta = 0.0f32;
            while theta < PI {
                let direction = Vec3A::new(
                    theta.sin() * phi.cos(),
                    theta.sin() * phi.sin(),
                    theta.cos(),
                );
                let light_ray = Ray::new(light.position(), direction);

                if scene.dispersion_mode() {
                    let mut hue = 0.0f32;
                    while hue < 360.0 {
                        let rad = hsv_to_rgb(hue, 100.0, 100.0) * scene.photon_map_factor() / 4.0;
                        cast_ray(scene, &light_ray, 0, hue / 180.0 - 1.0, rad);
                        hue += 45.0;
                    }
                } else {
                    // TODO: fold the light color into the photon radiance
                    cast_ray(
                        scene,
                        &light_ray,
                        0,
                        0.0,
                        Vec4::ONE * scene.photon_map_factor(),
                    );
                }
                theta += scan_step_angle;
            }
            phi += scan_step_angle;
        }
    }
}

/// Follows one photon ray through the scene.
///
/// On a diffuse hit the radiance is deposited and the ray ends, but only
/// from depth 1 onward: first hits are direct lighting, which the renderer
/// computes itself. On a specular hit the ray splits by the Fresnel
/// coefficient into a refracted and a reflected continuation.
fn cast_ray(scene: &mut Scene, ray: &Ray, recursion: u32, wavelength: f32, rad: Vec4) {
    if recursion > scene.camera().max_bounces() {
        return;
    }

    let mut max_distance = INFINITE;
    let mut nearest: Option<(usize, Intersection)> = None;
    for (index, object) in scene.objects().iter().enumerate() {
        if let Some(intersection) = object.intersect(ray, max_distance) {
            max_distance = intersection.distance;
            nearest = Some((index, intersection));
        }
    }
    let Some((index, intersection)) = nearest else {
        return;
    };

    if scene.objects()[index].material().refraction.norm_sqr() <= 0.0 {
        // diffuse surface: the light ray ends here
        if recursion > 0 {
            let texture_size = scene.photon_map_texture_size();
            scene.objects_mut()[index].add_photon(texture_size, intersection.photon_uv, rad);
        }
        return;
    }

    let material = scene.objects()[index].material();
    let cos_ray_normal = ray
        .direction()
        .dot(intersection.normal)
        .clamp(-1.0, 1.0);
    let kr = fresnel(material, cos_ray_normal, wavelength);
    let refraction = if kr < 1.0 {
        refraction_ray(ray, &intersection, material, cos_ray_normal, wavelength)
    } else {
        None
    };
    let reflection = reflection_ray(ray, &intersection, cos_ray_normal);

    if let Some(refraction) = refraction {
        cast_ray(scene, &refraction, recursion + 1, wavelength, rad * (1.0 - kr));
    }
    cast_ray(scene, &reflection, recursion + 1, wavelength, rad * kr);
}

#[cfg(test)]
fn caustic_scene(with_glass: bool) -> Scene {
    let glass = if with_glass {
        r#"<sphere radius="1.0">
            <position x="0.0" y="0.0" z="2.0"/>
            <material_solid>
                <color r="1.0" g="1.0" b="1.0"/>
                <phong ka="0.0" kd="0.0" ks="0.0" exponent="1.0"/>
                <transmittance t="1.0"/>
                <refraction iof="1.5"/>
            </material_solid>
        </sphere>"#
    } else {
        ""
    };
    let xml = format!(
        r#"<scene output_file="x.png">
            <caustic steps="24" texture_size="16" factor="0.1"/>
            <camera>
                <resolution horizontal="8" vertical="8"/>
                <max_bounces n="6"/>
            </camera>
            <lights>
                <point_light>
                    <color r="1.0" g="1.0" b="1.0"/>
                    <position x="0.0" y="0.0" z="5.0"/>
                </point_light>
            </lights>
            <surfaces>
                {glass}
                <sphere radius="2.0">
                    <position x="0.0" y="0.0" z="-3.0"/>
                    <material_solid>
                        <color r="1.0" g="1.0" b="1.0"/>
                        <phong ka="0.0" kd="1.0" ks="0.0" exponent="1.0"/>
                    </material_solid>
                </sphere>
            </surfaces>
        </scene>"#
    );
    Scene::read(xml.as_bytes(), std::path::Path::new("scene.xml"), 0.0).unwrap()
}

#[cfg(test)]
fn photon_total(scene: &Scene, object: usize) -> f32 {
    let mut total = 0.0;
    for y in 0..16 {
        for x in 0..16 {
            let uv = glam::Vec2::new(x as f32 / 15.0, y as f32 / 15.0);
            let rad = scene.objects()[object].photon(uv);
            total += rad.x + rad.y + rad.z;
        }
    }
    total
}

#[test]
fn photons_reach_diffuse_surfaces_through_glass() {
    let mut scene = caustic_scene(true);
    generate(&mut scene);
    // the diffuse sphere behind the glass received focused radiance
    assert!(photon_total(&scene, 1) > 0.0);
    // the glass itself is specular and never receives photons
    assert!(photon_total(&scene, 0) == 0.0);
}

#[test]
fn direct_hits_deposit_nothing() {
    let mut scene = caustic_scene(false);
    generate(&mut scene);
    // without a specular path every hit is at depth 0
    assert_eq!(photon_total(&scene, 0), 0.0);
}

#[test]
fn parallel_lights_are_skipped() {
    let xml = r#"<scene output_file="x.png">
        <caustic steps="8" texture_size="8" factor="1.0"/>
        <camera>
            <resolution horizontal="4" vertical="4"/>
        </camera>
        <lights>
            <parallel_light>
                <color r="1.0" g="1.0" b="1.0"/>
                <direction x="0.0" y="0.0" z="-1.0"/>
            </parallel_light>
        </lights>
        <surfaces>
            <sphere radius="1.0">
                <position x="0.0" y="0.0" z="0.0"/>
                <material_solid>
                    <color r="1.0" g="1.0" b="1.0"/>
                    <phong ka="0.0" kd="1.0" ks="0.0" exponent="1.0"/>
                </material_solid>
            </sphere>
        </surfaces>
    </scene>"#;
    let mut scene = Scene::read(xml.as_bytes(), std::path::Path::new("scene.xml"), 0.0).unwrap();
    generate(&mut scene);
    let mut total = 0.0;
    for y in 0..8 {
        for x in 0..8 {
            let uv = glam::Vec2::new(x as f32 / 7.0, y as f32 / 7.0);
            let rad = scene.objects()[0].photon(uv);
            total += rad.x + rad.y + rad.z;
        }
    }
    assert_eq!(total, 0.0);
}
