use std::path::PathBuf;

use crate::viewport::ViewportError;

/// Errors that stop the demo before or while it runs.
///
/// Every variant maps to process exit code 1 in the binary.
#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats or alpha modes for this adapter")]
    SurfaceUnsupported,

    #[error("cannot open {}: {source}", .path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader compile failed ({}):\n{log}", .path.display())]
    ShaderCompile { path: PathBuf, log: String },

    #[error(transparent)]
    Viewport(#[from] ViewportError),

    #[error("GPU ran out of memory while acquiring a frame")]
    OutOfMemory,
}
