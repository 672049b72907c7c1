use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::simulation::ParticleField;

// Per-instance data uploaded to the vertex stage
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // model matrix columns
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 32,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 48,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // color
                wgpu::VertexAttribute {
                    offset: 64,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }

    pub fn scale(&self) -> f32 {
        self.model[0][0]
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}

/// One transform per sphere, refreshed from the particle buffers every frame.
///
/// The attractor (index 0) is drawn at zero scale when the cursor sphere is
/// hidden; it still collides.
pub struct InstancedView {
    instances: Vec<InstanceRaw>,
    light_position: Vec3,
    light_color: Vec3,
}

impl InstancedView {
    pub fn new(count: usize, colors: &[u32]) -> Self {
        let mut view = Self {
            instances: vec![
                InstanceRaw {
                    model: Mat4::IDENTITY.to_cols_array_2d(),
                    color: [1.0; 4],
                };
                count
            ],
            light_position: Vec3::ZERO,
            light_color: Vec3::ONE,
        };
        view.set_colors(colors);
        view
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    pub fn light_position(&self) -> Vec3 {
        self.light_position
    }

    pub fn light_color(&self) -> Vec3 {
        self.light_color
    }

    /// Tints instances along the gradient formed by `colors`. Fewer than two
    /// stops leaves the current colors alone.
    pub fn set_colors(&mut self, colors: &[u32]) {
        if colors.len() < 2 {
            return;
        }
        let stops: Vec<Vec3> = colors.iter().map(|&hex| color_from_hex(hex)).collect();
        let count = self.instances.len();
        for (i, instance) in self.instances.iter_mut().enumerate() {
            let color = gradient_at(&stops, i as f32 / count as f32);
            instance.color = color.extend(1.0).to_array();
        }
        self.light_color = gradient_at(&stops, 0.0);
    }

    pub fn update(&mut self, field: &ParticleField, follow_cursor: bool) {
        let positions = field.positions();
        let radii = field.radii();
        for (i, instance) in self.instances.iter_mut().enumerate() {
            let position = positions[i];
            let scale = if i == 0 && !follow_cursor { 0.0 } else { radii[i] };
            instance.model =
                Mat4::from_scale_rotation_translation(Vec3::splat(scale), glam::Quat::IDENTITY, position)
                    .to_cols_array_2d();
        }
        if let Some(&first) = positions.first() {
            self.light_position = first;
        }
    }
}

/// Linear color at `ratio` along evenly spaced gradient stops.
pub fn gradient_at(stops: &[Vec3], ratio: f32) -> Vec3 {
    let Some(&last) = stops.last() else {
        return Vec3::ONE;
    };
    let scaled = ratio.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
    let index = scaled.floor() as usize;
    if index >= stops.len() - 1 {
        return last;
    }
    let alpha = scaled - index as f32;
    stops[index].lerp(stops[index + 1], alpha)
}

/// Converts a 0xRRGGBB sRGB color into linear components.
pub fn color_from_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
