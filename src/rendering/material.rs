use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Surface look of the spheres, including the thickness terms of the
/// subsurface scattering approximation in the fragment shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParameters {
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub thickness_distortion: f32,
    pub thickness_ambient: f32,
    pub thickness_attenuation: f32,
    pub thickness_power: f32,
    pub thickness_scale: f32,
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self {
            metalness: 0.5,
            roughness: 0.5,
            clearcoat: 1.0,
            clearcoat_roughness: 0.15,
            thickness_distortion: 0.1,
            thickness_ambient: 0.0,
            thickness_attenuation: 0.1,
            thickness_power: 2.0,
            thickness_scale: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParameters {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub light_intensity: f32,
}

impl Default for LightParameters {
    fn default() -> Self {
        Self {
            ambient_color: 0xffffff,
            ambient_intensity: 1.0,
            light_intensity: 200.0,
        }
    }
}

// Uniform block shared by the vertex and fragment stages
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_projection: [f32; 16],
    pub camera_position: [f32; 4],
    pub light_position: [f32; 4], // w = intensity
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],  // rgb = color, w = intensity
    pub surface: [f32; 4],  // metalness, roughness, clearcoat, clearcoat roughness
    pub thickness: [f32; 4], // distortion, ambient, attenuation, power
    pub thickness_scale: [f32; 4],
}

impl SceneUniforms {
    pub fn new(
        view_projection: Mat4,
        camera_position: Vec3,
        light_position: Vec3,
        light_color: Vec3,
        ambient_color: Vec3,
        lights: &LightParameters,
        material: &MaterialParameters,
    ) -> Self {
        Self {
            view_projection: view_projection.to_cols_array(),
            camera_position: camera_position.extend(1.0).to_array(),
            light_position: light_position.extend(lights.light_intensity).to_array(),
            light_color: light_color.extend(1.0).to_array(),
            ambient: ambient_color.extend(lights.ambient_intensity).to_array(),
            surface: [
                material.metalness,
                material.roughness,
                material.clearcoat,
                material.clearcoat_roughness,
            ],
            thickness: [
                material.thickness_distortion,
                material.thickness_ambient,
                material.thickness_attenuation,
                material.thickness_power,
            ],
            thickness_scale: [material.thickness_scale, 0.0, 0.0, 0.0],
        }
    }
}
