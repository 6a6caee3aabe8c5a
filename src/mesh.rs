//! Cube geometry and its GPU buffers.
//!
//! Two layouts of the same unit cube (spanning -0.5..0.5 on every axis) are
//! provided:
//!
//! - [`cube_triangles`]: 36 vertices, one per triangle corner, drawn without an
//!   index buffer.
//! - [`cube_indexed`]: the 8 shared corners plus 36 `u16` indices, wound
//!   counter-clockwise when seen from outside the cube.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | color     | Float32x3 | 12     | 1               |

use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;

/// A vertex carrying a position and an RGB color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ColorVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

const fn v(x: f32, y: f32, z: f32, r: f32, g: f32, b: f32) -> ColorVertex {
    ColorVertex::new([x, y, z], [r, g, b])
}

#[rustfmt::skip]
const CUBE_TRIANGLES: [ColorVertex; 36] = [
    // Front face
    v(-0.5, -0.5,  0.5,  1.0, 0.0, 0.0),
    v( 0.5, -0.5,  0.5,  0.0, 1.0, 0.0),
    v( 0.5,  0.5,  0.5,  0.0, 0.0, 1.0),
    v(-0.5, -0.5,  0.5,  1.0, 0.0, 0.0),
    v( 0.5,  0.5,  0.5,  0.0, 0.0, 1.0),
    v(-0.5,  0.5,  0.5,  1.0, 1.0, 0.0),
    // Back face
    v(-0.5, -0.5, -0.5,  1.0, 0.0, 1.0),
    v( 0.5,  0.5, -0.5,  0.0, 1.0, 1.0),
    v( 0.5, -0.5, -0.5,  0.0, 1.0, 0.0),
    v(-0.5, -0.5, -0.5,  1.0, 0.0, 1.0),
    v(-0.5,  0.5, -0.5,  1.0, 1.0, 1.0),
    v( 0.5,  0.5, -0.5,  0.0, 1.0, 1.0),
    // Left face
    v(-0.5, -0.5, -0.5,  1.0, 0.0, 1.0),
    v(-0.5, -0.5,  0.5,  1.0, 0.0, 0.0),
    v(-0.5,  0.5,  0.5,  1.0, 1.0, 0.0),
    v(-0.5, -0.5, -0.5,  1.0, 0.0, 1.0),
    v(-0.5,  0.5,  0.5,  1.0, 1.0, 0.0),
    v(-0.5,  0.5, -0.5,  1.0, 1.0, 1.0),
    // Right face
    v( 0.5, -0.5, -0.5,  0.0, 1.0, 0.0),
    v( 0.5,  0.5,  0.5,  0.0, 0.0, 1.0),
    v( 0.5, -0.5,  0.5,  0.0, 1.0, 0.0),
    v( 0.5, -0.5, -0.5,  0.0, 1.0, 0.0),
    v( 0.5,  0.5, -0.5,  0.0, 1.0, 1.0),
    v( 0.5,  0.5,  0.5,  0.0, 0.0, 1.0),
    // Top face
    v(-0.5,  0.5, -0.5,  1.0, 1.0, 1.0),
    v(-0.5,  0.5,  0.5,  1.0, 1.0, 0.0),
    v( 0.5,  0.5,  0.5,  0.0, 0.0, 1.0),
    v(-0.5,  0.5, -0.5,  1.0, 1.0, 1.0),
    v( 0.5,  0.5,  0.5,  0.0, 0.0, 1.0),
    v( 0.5,  0.5, -0.5,  0.0, 1.0, 1.0),
    // Bottom face
    v(-0.5, -0.5, -0.5,  1.0, 0.0, 1.0),
    v( 0.5, -0.5,  0.5,  0.0, 1.0, 0.0),
    v(-0.5, -0.5,  0.5,  1.0, 0.0, 0.0),
    v(-0.5, -0.5, -0.5,  1.0, 0.0, 1.0),
    v( 0.5, -0.5, -0.5,  0.0, 1.0, 0.0),
    v( 0.5, -0.5,  0.5,  0.0, 1.0, 0.0),
];

#[rustfmt::skip]
const CUBE_CORNERS: [ColorVertex; 8] = [
    v(-0.5, -0.5,  0.5,  1.0, 0.0, 0.0), // 0
    v( 0.5, -0.5,  0.5,  0.0, 1.0, 0.0), // 1
    v( 0.5,  0.5,  0.5,  0.0, 0.0, 1.0), // 2
    v(-0.5,  0.5,  0.5,  1.0, 1.0, 0.0), // 3
    v(-0.5, -0.5, -0.5,  1.0, 0.0, 1.0), // 4
    v( 0.5, -0.5, -0.5,  0.0, 1.0, 0.0), // 5
    v( 0.5,  0.5, -0.5,  0.0, 1.0, 1.0), // 6
    v(-0.5,  0.5, -0.5,  1.0, 1.0, 1.0), // 7
];

#[rustfmt::skip]
const CUBE_INDICES: [u16; 36] = [
    0, 1, 2,  2, 3, 0, // front
    5, 4, 7,  7, 6, 5, // back
    4, 0, 3,  3, 7, 4, // left
    1, 5, 6,  6, 2, 1, // right
    3, 2, 6,  6, 7, 3, // top
    4, 5, 1,  1, 0, 4, // bottom
];

/// The cube as a plain triangle list.
pub fn cube_triangles() -> &'static [ColorVertex] {
    &CUBE_TRIANGLES
}

/// The cube as shared corners plus a CCW index list.
pub fn cube_indexed() -> (&'static [ColorVertex], &'static [u16]) {
    (&CUBE_CORNERS, &CUBE_INDICES)
}

/// How a [`CubeMesh`] is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshLayout {
    Triangles,
    Indexed,
}

/// GPU-resident cube geometry.
#[derive(Debug)]
pub struct CubeMesh {
    // Fields drop top to bottom: index buffer first, vertex buffer last.
    index_buffer: Option<wgpu::Buffer>,
    vertex_buffer: wgpu::Buffer,
    count: u32,
}

impl CubeMesh {
    /// Uploads the cube in the requested layout.
    pub fn new(gpu: &GpuContext, layout: MeshLayout) -> Self {
        match layout {
            MeshLayout::Triangles => Self::upload(gpu, cube_triangles(), None),
            MeshLayout::Indexed => {
                let (vertices, indices) = cube_indexed();
                Self::upload(gpu, vertices, Some(indices))
            }
        }
    }

    fn upload(gpu: &GpuContext, vertices: &[ColorVertex], indices: Option<&[u16]>) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = indices.map(|indices| {
            gpu.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cube Index Buffer"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });

        let count = indices.map_or(vertices.len(), <[u16]>::len) as u32;

        Self {
            index_buffer,
            vertex_buffer,
            count,
        }
    }

    pub fn layout(&self) -> MeshLayout {
        if self.index_buffer.is_some() {
            MeshLayout::Indexed
        } else {
            MeshLayout::Triangles
        }
    }

    /// Number of vertices (or indices) drawn per frame.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Binds the buffers and issues the draw.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..self.count, 0, 0..1);
            }
            None => render_pass.draw(0..self.count, 0..1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn pos(v: &ColorVertex) -> Vec3 {
        Vec3::from_array(v.position)
    }

    #[test]
    fn layout_matches_struct() {
        assert_eq!(std::mem::size_of::<ColorVertex>(), 24);
        assert_eq!(ColorVertex::LAYOUT.array_stride, 24);
        assert_eq!(ColorVertex::LAYOUT.attributes[1].offset, 12);
    }

    #[test]
    fn triangle_list_has_twelve_triangles() {
        assert_eq!(cube_triangles().len(), 36);
        assert!(
            cube_triangles()
                .iter()
                .all(|v| v.position.iter().all(|c| c.abs() == 0.5))
        );
    }

    #[test]
    fn indexed_cube_covers_each_face_twice() {
        let (vertices, indices) = cube_indexed();
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));

        // each corner touches three faces of two triangles, minus shared diagonals
        for corner in 0..8u16 {
            let uses = indices.iter().filter(|&&i| i == corner).count();
            assert!((3..=6).contains(&uses), "corner {corner} used {uses} times");
        }
    }

    #[test]
    fn indexed_triangles_face_outward() {
        let (vertices, indices) = cube_indexed();
        for tri in indices.chunks(3) {
            let a = pos(&vertices[tri[0] as usize]);
            let b = pos(&vertices[tri[1] as usize]);
            let c = pos(&vertices[tri[2] as usize]);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn both_layouts_share_the_same_corners() {
        let (corners, _) = cube_indexed();
        for vertex in cube_triangles() {
            assert!(corners.iter().any(|c| c.position == vertex.position));
        }
    }
}
