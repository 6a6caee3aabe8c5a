//! Letterboxed viewport mapping.
//!
//! The cube is designed for a fixed virtual resolution. [`ViewportMapper`] fits
//! that resolution inside whatever the window currently measures, keeping the
//! aspect ratio and centring the result, so the unused area shows up as bars on
//! the long axis.
//!
//! ```
//! use spincube::{Letterbox, VirtualResolution};
//!
//! let virtual_res = VirtualResolution::new(1600, 900).unwrap();
//! let rect = Letterbox::fit(virtual_res, 800, 600);
//! assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 75, 800, 450));
//! ```

/// Errors produced when describing a virtual resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ViewportError {
    #[error("virtual resolution must be non-zero, got {width}x{height}")]
    ZeroVirtualSize { width: u32, height: u32 },
}

/// The fixed design resolution the scene is authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualResolution {
    width: u32,
    height: u32,
}

impl VirtualResolution {
    /// Creates a virtual resolution, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, ViewportError> {
        if width == 0 || height == 0 {
            return Err(ViewportError::ZeroVirtualSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// A render rectangle inside the physical framebuffer, in pixels.
///
/// `x`/`y` are offsets from the framebuffer origin. The rectangle is
/// symmetric, so it does not matter whether the backend counts `y` from the
/// top or the bottom edge (up to one pixel of rounding).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Factor applied to the virtual resolution to obtain `width`/`height`.
    pub scale: f32,
}

impl Letterbox {
    /// Fits `virtual_res` into a `physical_width` x `physical_height` framebuffer.
    pub fn fit(virtual_res: VirtualResolution, physical_width: u32, physical_height: u32) -> Self {
        let scale_x = physical_width as f32 / virtual_res.width as f32;
        let scale_y = physical_height as f32 / virtual_res.height as f32;
        let scale = scale_x.min(scale_y);

        // Truncation toward zero, never exceeding the framebuffer.
        let width = ((virtual_res.width as f32 * scale) as u32).min(physical_width);
        let height = ((virtual_res.height as f32 * scale) as u32).min(physical_height);

        Self {
            x: (physical_width - width) / 2,
            y: (physical_height - height) / 2,
            width,
            height,
            scale,
        }
    }

    /// Returns true if nothing can be drawn into this rectangle.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sets this rectangle as the viewport of `render_pass`.
    pub fn apply(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_viewport(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            0.0,
            1.0,
        );
    }
}

/// When the letterbox is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Recompute from the surface size on every frame.
    EveryFrame,
    /// Recompute only when the window reports a resize.
    OnResize,
}

/// Keeps the current letterbox for a fixed virtual resolution.
#[derive(Debug, Clone)]
pub struct ViewportMapper {
    virtual_res: VirtualResolution,
    policy: RefreshPolicy,
    current: Letterbox,
}

impl ViewportMapper {
    pub fn new(
        virtual_res: VirtualResolution,
        policy: RefreshPolicy,
        physical_width: u32,
        physical_height: u32,
    ) -> Self {
        Self {
            virtual_res,
            policy,
            current: Letterbox::fit(virtual_res, physical_width, physical_height),
        }
    }

    /// Per-frame hook. Only recomputes under [`RefreshPolicy::EveryFrame`].
    pub fn begin_frame(&mut self, physical_width: u32, physical_height: u32) {
        if self.policy == RefreshPolicy::EveryFrame {
            self.current = Letterbox::fit(self.virtual_res, physical_width, physical_height);
        }
    }

    /// Resize hook. Always recomputes.
    pub fn resize(&mut self, physical_width: u32, physical_height: u32) {
        self.current = Letterbox::fit(self.virtual_res, physical_width, physical_height);
        log::debug!(
            "letterbox {}x{} at ({}, {}) for {}x{}",
            self.current.width,
            self.current.height,
            self.current.x,
            self.current.y,
            physical_width,
            physical_height
        );
    }

    pub fn current(&self) -> Letterbox {
        self.current
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hd() -> VirtualResolution {
        VirtualResolution::new(1600, 900).unwrap()
    }

    #[test]
    fn fits_wide_design_into_4_3_window() {
        let rect = Letterbox::fit(hd(), 800, 600);
        assert_eq!(rect.scale, 0.5);
        assert_eq!((rect.width, rect.height), (800, 450));
        assert_eq!((rect.x, rect.y), (0, 75));
    }

    #[test]
    fn pillarboxes_tall_windows_sideways() {
        let rect = Letterbox::fit(hd(), 3200, 900);
        assert_eq!(rect.scale, 1.0);
        assert_eq!((rect.width, rect.height), (1600, 900));
        assert_eq!((rect.x, rect.y), (800, 0));
    }

    #[test]
    fn scale_is_min_of_axis_ratios() {
        let sizes = [(800, 600), (1920, 1080), (1024, 768), (333, 1000), (1, 1)];
        for (w, h) in sizes {
            let rect = Letterbox::fit(hd(), w, h);
            let expected = (w as f32 / 1600.0).min(h as f32 / 900.0);
            assert_eq!(rect.scale, expected, "{w}x{h}");
        }
    }

    #[test]
    fn rectangle_is_centred_and_inside() {
        for w in (1..2000).step_by(37) {
            for h in (1..1500).step_by(41) {
                let rect = Letterbox::fit(hd(), w, h);
                assert!(rect.x + rect.width <= w);
                assert!(rect.y + rect.height <= h);
                assert!(w - (rect.x * 2 + rect.width) <= 1, "{w}x{h}: {rect:?}");
                assert!(h - (rect.y * 2 + rect.height) <= 1, "{w}x{h}: {rect:?}");
            }
        }
    }

    #[test]
    fn zero_virtual_size_is_rejected() {
        assert_eq!(
            VirtualResolution::new(0, 900),
            Err(ViewportError::ZeroVirtualSize {
                width: 0,
                height: 900
            })
        );
        assert!(VirtualResolution::new(1600, 0).is_err());
    }

    #[test]
    fn minimized_window_gives_empty_rect() {
        let rect = Letterbox::fit(hd(), 0, 0);
        assert!(rect.is_empty());
        assert_eq!((rect.x, rect.y), (0, 0));
    }

    #[test]
    fn on_resize_policy_ignores_frame_size() {
        let mut mapper = ViewportMapper::new(hd(), RefreshPolicy::OnResize, 800, 600);
        mapper.begin_frame(1600, 900);
        assert_eq!(mapper.current().width, 800);

        mapper.resize(1600, 900);
        assert_eq!(mapper.current().width, 1600);
    }

    #[test]
    fn every_frame_policy_tracks_frame_size() {
        let mut mapper = ViewportMapper::new(hd(), RefreshPolicy::EveryFrame, 800, 600);
        mapper.begin_frame(1600, 1200);
        assert_eq!((mapper.current().width, mapper.current().height), (1600, 900));
        assert_eq!(mapper.current().y, 150);
    }
}
