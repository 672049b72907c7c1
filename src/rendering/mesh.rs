use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Unit sphere as a latitude/longitude grid.
pub struct SphereMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn new(width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for y in 0..=height_segments {
            let v = y as f32 / height_segments as f32;
            let theta = v * PI;
            for x in 0..=width_segments {
                let u = x as f32 / width_segments as f32;
                let phi = u * TAU;
                let normal = [
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                ];
                vertices.push(MeshVertex {
                    position: normal,
                    normal,
                });
            }
        }

        let stride = width_segments + 1;
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
        for y in 0..height_segments {
            for x in 0..width_segments {
                let a = y * stride + x + 1;
                let b = y * stride + x;
                let c = (y + 1) * stride + x;
                let d = (y + 1) * stride + x + 1;

                // Degenerate triangles at the poles are skipped
                if y != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if y != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }
}

impl Default for SphereMesh {
    fn default() -> Self {
        Self::new(32, 16)
    }
}
