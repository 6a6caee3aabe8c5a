use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::CubeError;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::mesh::MeshLayout;
use crate::render_mode::{PolygonMode, RenderToggles, ToggleKeys};
use crate::renderer::{CubeRenderer, FrameParams, RasterState};
use crate::shader::{CompileFailure, ShaderFile};
use crate::transform::{KeyBindings, ScaleOrder, TransformPipeline};
use crate::viewport::{RefreshPolicy, ViewportMapper, VirtualResolution};

/// Default vertex shader path, relative to the working directory.
pub const VERTEX_SHADER_PATH: &str = "shaders/vertex.wgsl";
/// Default fragment shader path, relative to the working directory.
pub const FRAGMENT_SHADER_PATH: &str = "shaders/fragment.wgsl";

/// Which of the two demos to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Variant {
    /// Unindexed triangles, wireframe, no vsync, fatal shader errors.
    #[default]
    Arrays,
    /// Indexed cube with mode/culling toggles and scale keys, vsync.
    Indexed,
}

/// Every per-variant policy in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantProfile {
    pub layout: MeshLayout,
    pub scale_order: ScaleOrder,
    pub refresh: RefreshPolicy,
    pub vsync: bool,
    pub on_compile_failure: CompileFailure,
    pub bindings: KeyBindings,
    pub initial_mode: PolygonMode,
    /// `None` keeps the initial mode and culling for the whole run.
    pub toggle_keys: Option<ToggleKeys>,
}

impl Variant {
    pub fn profile(self) -> VariantProfile {
        match self {
            Variant::Arrays => VariantProfile {
                layout: MeshLayout::Triangles,
                scale_order: ScaleOrder::BeforeRotation,
                refresh: RefreshPolicy::EveryFrame,
                vsync: false,
                on_compile_failure: CompileFailure::Fatal,
                bindings: KeyBindings::arrows(),
                initial_mode: PolygonMode::Line,
                toggle_keys: None,
            },
            Variant::Indexed => VariantProfile {
                layout: MeshLayout::Indexed,
                scale_order: ScaleOrder::AfterRotation,
                refresh: RefreshPolicy::OnResize,
                vsync: true,
                on_compile_failure: CompileFailure::LogAndContinue,
                bindings: KeyBindings::arrows_with_scale(),
                initial_mode: PolygonMode::Fill,
                toggle_keys: Some(ToggleKeys {
                    cycle_mode: KeyCode::KeyW,
                    toggle_culling: KeyCode::KeyC,
                }),
            },
        }
    }
}

/// Configuration for the demo window.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub virtual_width: u32,
    pub virtual_height: u32,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub variant: Variant,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "spincube".to_string(),
            width: 800,
            height: 600,
            virtual_width: 1600,
            virtual_height: 900,
            vertex_shader: PathBuf::from(VERTEX_SHADER_PATH),
            fragment_shader: PathBuf::from(FRAGMENT_SHADER_PATH),
            variant: Variant::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn virtual_size(mut self, width: u32, height: u32) -> Self {
        self.virtual_width = width;
        self.virtual_height = height;
        self
    }

    pub fn shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }
}

/// Opens the window and runs until it is closed.
///
/// Returns an error if anything fails during startup, or if the GPU runs out
/// of memory mid-run.
pub fn run(config: AppConfig) -> Result<(), CubeError> {
    let virtual_res = VirtualResolution::new(config.virtual_width, config.virtual_height)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    log::info!("starting {:?} variant", config.variant);
    let mut app = CubeApp::Pending {
        config,
        virtual_res,
    };
    event_loop.run_app(&mut app)?;

    match app {
        CubeApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum CubeApp {
    Pending {
        config: AppConfig,
        virtual_res: VirtualResolution,
    },
    Running(Box<Running>),
    Failed(CubeError),
}

/// Live state while the window is open.
///
/// The GPU resources are the first three fields, in reverse creation order, so
/// the renderer is dropped before the device and the device before the window.
struct Running {
    renderer: CubeRenderer,
    gpu: GpuContext,
    window: Arc<Window>,
    input: Input,
    viewport: ViewportMapper,
    transform: TransformPipeline,
    toggles: RenderToggles,
    toggle_keys: Option<ToggleKeys>,
}

impl Running {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        virtual_res: VirtualResolution,
    ) -> Result<Self, CubeError> {
        let profile = config.variant.profile();

        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone(), profile.vsync)?;

        let vertex_file = ShaderFile::load(&config.vertex_shader)?;
        let fragment_file = ShaderFile::load(&config.fragment_shader)?;
        let renderer = CubeRenderer::new(
            &gpu,
            &vertex_file,
            &fragment_file,
            profile.on_compile_failure,
            profile.layout,
        )?;
        if !renderer.has_program() {
            log::warn!("running without a usable shader program, nothing will be drawn");
        }

        let viewport = ViewportMapper::new(virtual_res, profile.refresh, gpu.width(), gpu.height());
        let transform =
            TransformPipeline::new(profile.scale_order, profile.bindings, virtual_res.aspect());

        Ok(Self {
            renderer,
            gpu,
            window,
            input: Input::new(),
            viewport,
            transform,
            toggles: RenderToggles::new(profile.initial_mode),
            toggle_keys: profile.toggle_keys,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        if self.viewport.policy() == RefreshPolicy::OnResize {
            self.viewport.resize(width, height);
        }
    }

    fn redraw(&mut self) -> Result<(), CubeError> {
        self.viewport.begin_frame(self.gpu.width(), self.gpu.height());
        self.transform.update(&self.input);
        if let Some(keys) = self.toggle_keys {
            self.toggles.handle_input(&self.input, keys);
        }

        let frame = FrameParams {
            mvp: self.transform.mvp(),
            raster: RasterState {
                mode: self.toggles.mode(),
                cull: self.toggles.cull_mode(),
            },
            viewport: self.viewport.current(),
        };
        let result = self.renderer.render(&self.gpu, frame);

        self.input.begin_frame();
        self.window.request_redraw();
        result
    }
}

impl ApplicationHandler for CubeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let CubeApp::Pending {
            config,
            virtual_res,
        } = self
        else {
            return;
        };

        match Running::start(event_loop, config, *virtual_res) {
            Ok(running) => *self = CubeApp::Running(Box::new(running)),
            Err(err) => {
                *self = CubeApp::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let CubeApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => {
                app.resize(size.width, size.height);
                Ok(())
            }
            WindowEvent::RedrawRequested => app.redraw(),
            _ => Ok(()),
        };

        if let Err(err) = result {
            *self = CubeApp::Failed(err);
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_differ_where_they_should() {
        let arrays = Variant::Arrays.profile();
        let indexed = Variant::Indexed.profile();

        assert_eq!(arrays.layout, MeshLayout::Triangles);
        assert_eq!(indexed.layout, MeshLayout::Indexed);
        assert_eq!(arrays.scale_order, ScaleOrder::BeforeRotation);
        assert_eq!(indexed.scale_order, ScaleOrder::AfterRotation);
        assert_eq!(arrays.refresh, RefreshPolicy::EveryFrame);
        assert_eq!(indexed.refresh, RefreshPolicy::OnResize);
        assert!(!arrays.vsync && indexed.vsync);
        assert_eq!(arrays.on_compile_failure, CompileFailure::Fatal);
        assert_eq!(indexed.on_compile_failure, CompileFailure::LogAndContinue);
    }

    #[test]
    fn only_indexed_variant_has_toggles_and_scale_keys() {
        assert!(Variant::Arrays.profile().toggle_keys.is_none());
        assert!(Variant::Arrays.profile().bindings.scale_keys.is_none());
        assert_eq!(Variant::Arrays.profile().initial_mode, PolygonMode::Line);

        let indexed = Variant::Indexed.profile();
        let keys = indexed.toggle_keys.unwrap();
        assert_eq!(keys.cycle_mode, KeyCode::KeyW);
        assert_eq!(keys.toggle_culling, KeyCode::KeyC);
        assert_eq!(indexed.bindings.scale_keys, Some((KeyCode::KeyI, KeyCode::KeyK)));
    }

    #[test]
    fn config_defaults_match_demo_constants() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!((config.virtual_width, config.virtual_height), (1600, 900));
        assert_eq!(config.vertex_shader, PathBuf::from(VERTEX_SHADER_PATH));
        assert_eq!(config.variant, Variant::Arrays);
    }

    #[test]
    fn config_builder_overrides() {
        let config = AppConfig::new()
            .title("cube")
            .size(1024, 768)
            .virtual_size(320, 240)
            .shaders("a.wgsl", "b.wgsl")
            .variant(Variant::Indexed);
        assert_eq!(config.title, "cube");
        assert_eq!(config.virtual_width, 320);
        assert_eq!(config.fragment_shader, PathBuf::from("b.wgsl"));
        assert_eq!(config.variant, Variant::Indexed);
    }
}
