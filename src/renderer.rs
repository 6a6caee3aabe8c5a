//! Cube rendering with depth testing and a letterboxed viewport.
//!
//! [`CubeRenderer`] owns everything the draw needs beyond the device itself:
//! the two compiled shader stages, the `u_MVP` uniform buffer and its bind
//! group, a depth buffer that follows the surface size, the cube mesh, and one
//! render pipeline per (polygon mode, cull mode) combination, built on first
//! use.
//!
//! # Bind groups
//!
//! - **Group 0, binding 0**: `u_MVP`, a column-major `mat4x4<f32>`, vertex stage
//!
//! # Failure handling
//!
//! A shader stage that failed to compile under
//! [`CompileFailure::LogAndContinue`] leaves the renderer without a pipeline.
//! Frames are still cleared and presented; the cube is simply not drawn.

use std::collections::{HashMap, HashSet};

use glam::Mat4;

use crate::error::CubeError;
use crate::gpu::GpuContext;
use crate::mesh::{ColorVertex, CubeMesh, MeshLayout};
use crate::render_mode::PolygonMode;
use crate::shader::{self, CompileFailure, CompiledShader, ShaderFile, ShaderStage};
use crate::viewport::Letterbox;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The single uniform block uploaded each frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MvpUniform {
    pub mvp: [[f32; 4]; 4],
}

impl From<Mat4> for MvpUniform {
    fn from(mvp: Mat4) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
        }
    }
}

/// Rasterizer state for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterState {
    pub mode: PolygonMode,
    pub cull: Option<wgpu::Face>,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub mvp: Mat4,
    pub raster: RasterState,
    pub viewport: Letterbox,
}

/// Owns the cube's GPU resources.
///
/// Fields are declared in reverse creation order so that dropping the
/// renderer releases them last-created first. Pipelines are built lazily
/// after everything else, so they go first.
pub struct CubeRenderer {
    pipelines: HashMap<RasterState, Option<wgpu::RenderPipeline>>,
    warned_modes: HashSet<PolygonMode>,
    depth_size: (u32, u32),
    depth_view: wgpu::TextureView,
    mesh: CubeMesh,
    pipeline_layout: wgpu::PipelineLayout,
    mvp_bind_group: wgpu::BindGroup,
    mvp_buffer: wgpu::Buffer,
    fragment: Option<CompiledShader>,
    vertex: Option<CompiledShader>,
}

impl CubeRenderer {
    /// Compiles both shader stages and uploads the cube.
    ///
    /// Returns an error when a shader file could not be read, or when a stage
    /// failed to compile under [`CompileFailure::Fatal`].
    pub fn new(
        gpu: &GpuContext,
        vertex_file: &ShaderFile,
        fragment_file: &ShaderFile,
        on_failure: CompileFailure,
        layout: MeshLayout,
    ) -> Result<Self, CubeError> {
        let device = &gpu.device;

        let vertex = shader::compile(device, vertex_file, ShaderStage::Vertex, on_failure)?;
        let fragment = shader::compile(device, fragment_file, ShaderStage::Fragment, on_failure)?;
        shader::check_mvp_uniform(vertex_file);

        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MVP Uniform"),
            size: std::mem::size_of::<MvpUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mvp_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("MVP Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let mvp_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MVP Bind Group"),
            layout: &mvp_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: mvp_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&mvp_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh = CubeMesh::new(gpu, layout);
        log::debug!("uploaded {:?} cube, {} elements", mesh.layout(), mesh.count());

        let depth_view = Self::create_depth_view(gpu);

        Ok(Self {
            pipelines: HashMap::new(),
            warned_modes: HashSet::new(),
            depth_size: (gpu.width(), gpu.height()),
            depth_view,
            mesh,
            pipeline_layout,
            mvp_bind_group,
            mvp_buffer,
            fragment,
            vertex,
        })
    }

    /// The view keeps its texture alive, so only the view is stored.
    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreates the depth buffer if the surface changed size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Whether both shader stages compiled.
    pub fn has_program(&self) -> bool {
        self.vertex.is_some() && self.fragment.is_some()
    }

    /// Falls back to fill when the device cannot rasterize in `raster.mode`.
    fn effective_raster(&mut self, gpu: &GpuContext, raster: RasterState) -> RasterState {
        if gpu.supports(raster.mode) {
            return raster;
        }
        if self.warned_modes.insert(raster.mode) {
            log::warn!(
                "{:?} polygon mode is not supported by this device, drawing filled",
                raster.mode
            );
        }
        RasterState {
            mode: PolygonMode::Fill,
            ..raster
        }
    }

    fn ensure_pipeline(&mut self, gpu: &GpuContext, raster: RasterState) {
        if self.pipelines.contains_key(&raster) {
            return;
        }
        let pipeline = match (&self.vertex, &self.fragment) {
            (Some(vertex), Some(fragment)) => {
                Self::build_pipeline(gpu, &self.pipeline_layout, vertex, fragment, raster)
            }
            _ => None,
        };
        self.pipelines.insert(raster, pipeline);
    }

    fn build_pipeline(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        vertex: &CompiledShader,
        fragment: &CompiledShader,
        raster: RasterState,
    ) -> Option<wgpu::RenderPipeline> {
        let label = format!("Cube Pipeline ({:?}, cull {:?})", raster.mode, raster.cull);

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(vertex.entry_point),
                    buffers: &[ColorVertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(fragment.entry_point),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: raster.cull,
                    polygon_mode: raster.mode.to_wgpu(),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        match pollster::block_on(gpu.device.pop_error_scope()) {
            None => {
                log::debug!("built {}", label);
                Some(pipeline)
            }
            Some(error) => {
                log::error!(
                    "failed to link {}: {}",
                    label,
                    shader::bounded_log(&error.to_string())
                );
                None
            }
        }
    }

    /// Uploads the MVP, clears, and draws the cube into the surface.
    ///
    /// Lost or outdated surfaces are reconfigured and the frame is skipped.
    pub fn render(&mut self, gpu: &GpuContext, frame: FrameParams) -> Result<(), CubeError> {
        self.ensure_depth_size(gpu);
        let raster = self.effective_raster(gpu, frame.raster);
        self.ensure_pipeline(gpu, raster);

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(CubeError::OutOfMemory),
            Err(e) => {
                log::warn!("skipping frame: {}", e);
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.queue.write_buffer(
            &self.mvp_buffer,
            0,
            bytemuck::cast_slice(&[MvpUniform::from(frame.mvp)]),
        );

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cube Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cube Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let pipeline = self.pipelines.get(&raster).and_then(Option::as_ref);
            if let Some(pipeline) = pipeline {
                if !frame.viewport.is_empty() {
                    frame.viewport.apply(&mut render_pass);
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(0, &self.mvp_bind_group, &[]);
                    self.mesh.draw(&mut render_pass);
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mvp_uniform_is_column_major() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let uniform = MvpUniform::from(m);
        assert_eq!(uniform.mvp[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<MvpUniform>(), 64);
    }

    #[test]
    fn raster_states_are_distinct_cache_keys() {
        let mut keys = HashSet::new();
        for mode in PolygonMode::ALL {
            for cull in [None, Some(wgpu::Face::Back)] {
                keys.insert(RasterState { mode, cull });
            }
        }
        assert_eq!(keys.len(), 6);
    }
}
