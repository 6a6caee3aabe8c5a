//! # spincube
//!
//! A keyboard-driven spinning cube drawn inside a letterboxed viewport.
//!
//! The scene is authored for a fixed virtual resolution (1600x900). Whatever
//! size the window takes, the cube is drawn into the largest centred rectangle
//! with that aspect ratio. Arrow keys rotate the cube; the `indexed` variant
//! also scales it with `I`/`K`, cycles fill/line/point with `W`, and toggles
//! back-face culling with `C`.
//!
//! ```no_run
//! use spincube::{AppConfig, Variant};
//!
//! fn main() -> Result<(), spincube::CubeError> {
//!     spincube::run(AppConfig::new().variant(Variant::Indexed))
//! }
//! ```
//!
//! The pure parts, [`Letterbox`] and [`TransformPipeline`], can be used
//! without a window.

mod app;
mod error;
mod gpu;
mod input;
pub mod logging;
mod mesh;
mod render_mode;
mod renderer;
mod shader;
mod transform;
mod viewport;

pub use app::{
    AppConfig, FRAGMENT_SHADER_PATH, VERTEX_SHADER_PATH, Variant, VariantProfile, run,
};
pub use error::CubeError;
pub use gpu::GpuContext;
pub use input::Input;
pub use mesh::{ColorVertex, CubeMesh, MeshLayout, cube_indexed, cube_triangles};
pub use render_mode::{PolygonMode, RenderToggles, ToggleKeys};
pub use renderer::{CubeRenderer, FrameParams, MvpUniform, RasterState};
pub use shader::{
    CompileFailure, CompiledShader, MAX_LOG_LEN, MVP_UNIFORM, ShaderFile, ShaderStage,
};
pub use transform::{
    Camera, KeyBindings, ModelState, ROTATION_STEP, SCALE_STEP, ScaleOrder, TransformPipeline,
};
pub use viewport::{Letterbox, RefreshPolicy, ViewportError, ViewportMapper, VirtualResolution};

// Re-export commonly used winit and glam types for convenience
pub use glam::{Mat4, Vec3};
pub use winit::keyboard::KeyCode;
