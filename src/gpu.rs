//! Core GPU context and device management.
//!
//! [`GpuContext`] holds the wgpu objects every other part of the demo needs:
//! the surface for the window, the device and queue, and the surface
//! configuration. It is created once when the window appears and dropped
//! after every resource created from it.

use std::sync::Arc;

use winit::window::Window;

use crate::error::CubeError;
use crate::render_mode::PolygonMode;

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
/// They are declared in reverse creation order: the queue and device are
/// released before the surface they were requested for.
pub struct GpuContext {
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// `vsync` selects `Fifo` presentation; otherwise `AutoNoVsync` is used,
    /// which falls back to `Fifo` on platforms without a tearing mode.
    /// The polygon-mode features are requested whenever the adapter offers
    /// them; missing ones are reported through [`GpuContext::supports`].
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, CubeError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let wanted = PolygonMode::ALL
            .iter()
            .fold(wgpu::Features::empty(), |acc, mode| {
                acc | mode.required_feature()
            });
        let required_features = adapter.features() & wanted;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Spincube Device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, alpha_mode) = pick_surface_format(&surface_caps)?;

        let present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        log::info!("present mode {:?}, format {:?}", present_mode, surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            config,
            queue,
            device,
            surface,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions (a minimized window) to avoid wgpu
    /// validation errors.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapplies the current configuration after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Whether the device can rasterize in `mode`.
    pub fn supports(&self, mode: PolygonMode) -> bool {
        self.device.features().contains(mode.required_feature())
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }
}

/// Prefers an sRGB format; fails if the surface cannot be presented to at all.
fn pick_surface_format(
    caps: &wgpu::SurfaceCapabilities,
) -> Result<(wgpu::TextureFormat, wgpu::CompositeAlphaMode), CubeError> {
    let format = caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first())
        .copied()
        .ok_or(CubeError::SurfaceUnsupported)?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .ok_or(CubeError::SurfaceUnsupported)?;
    Ok((format, alpha_mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(
        formats: Vec<wgpu::TextureFormat>,
        alpha_modes: Vec<wgpu::CompositeAlphaMode>,
    ) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes,
            ..Default::default()
        }
    }

    #[test]
    fn srgb_format_is_preferred() {
        let caps = caps(
            vec![
                wgpu::TextureFormat::Bgra8Unorm,
                wgpu::TextureFormat::Bgra8UnormSrgb,
            ],
            vec![wgpu::CompositeAlphaMode::Opaque],
        );
        let (format, alpha) = pick_surface_format(&caps).unwrap();
        assert_eq!(format, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(alpha, wgpu::CompositeAlphaMode::Opaque);
    }

    #[test]
    fn first_format_is_used_without_srgb() {
        let caps = caps(
            vec![wgpu::TextureFormat::Rgba16Float],
            vec![wgpu::CompositeAlphaMode::Auto],
        );
        let (format, _) = pick_surface_format(&caps).unwrap();
        assert_eq!(format, wgpu::TextureFormat::Rgba16Float);
    }

    #[test]
    fn empty_capabilities_are_an_error() {
        let no_formats = caps(vec![], vec![wgpu::CompositeAlphaMode::Opaque]);
        assert!(matches!(
            pick_surface_format(&no_formats),
            Err(CubeError::SurfaceUnsupported)
        ));

        let no_alpha = caps(vec![wgpu::TextureFormat::Bgra8UnormSrgb], vec![]);
        assert!(matches!(
            pick_surface_format(&no_alpha),
            Err(CubeError::SurfaceUnsupported)
        ));
    }
}
