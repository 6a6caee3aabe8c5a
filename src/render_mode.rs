use winit::keyboard::KeyCode;

use crate::input::Input;

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

impl PolygonMode {
    pub const ALL: [PolygonMode; 3] = [PolygonMode::Fill, PolygonMode::Line, PolygonMode::Point];

    /// Maps a press counter onto a mode, cycling Fill, Line, Point.
    pub fn from_counter(counter: u32) -> Self {
        Self::ALL[(counter % 3) as usize]
    }

    /// The device feature needed to rasterize in this mode.
    pub fn required_feature(self) -> wgpu::Features {
        match self {
            PolygonMode::Fill => wgpu::Features::empty(),
            PolygonMode::Line => wgpu::Features::POLYGON_MODE_LINE,
            PolygonMode::Point => wgpu::Features::POLYGON_MODE_POINT,
        }
    }

    pub fn to_wgpu(self) -> wgpu::PolygonMode {
        match self {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
            PolygonMode::Point => wgpu::PolygonMode::Point,
        }
    }
}

/// Keys that flip render state on press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleKeys {
    pub cycle_mode: KeyCode,
    pub toggle_culling: KeyCode,
}

/// Render-mode counter and back-face culling flag.
///
/// [`handle_input`](Self::handle_input) applies each key press edge once, so a
/// held key changes the state a single time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderToggles {
    counter: u32,
    culling: bool,
}

impl RenderToggles {
    /// Starts at `mode` with culling disabled.
    pub fn new(mode: PolygonMode) -> Self {
        let counter = PolygonMode::ALL
            .iter()
            .position(|m| *m == mode)
            .unwrap_or(0) as u32;
        Self {
            counter,
            culling: false,
        }
    }

    /// Applies this frame's toggle key presses.
    pub fn handle_input(&mut self, input: &Input, keys: ToggleKeys) {
        if input.key_pressed(keys.cycle_mode) {
            let mode = self.advance_mode();
            log::debug!("polygon mode {:?}", mode);
        }
        if input.key_pressed(keys.toggle_culling) {
            let culling = self.toggle_culling();
            log::debug!("culling {}", if culling { "on" } else { "off" });
        }
    }

    pub fn advance_mode(&mut self) -> PolygonMode {
        self.counter = self.counter.wrapping_add(1);
        self.mode()
    }

    pub fn toggle_culling(&mut self) -> bool {
        self.culling = !self.culling;
        self.culling
    }

    pub fn mode(&self) -> PolygonMode {
        PolygonMode::from_counter(self.counter)
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn culling(&self) -> bool {
        self.culling
    }

    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        self.culling.then_some(wgpu::Face::Back)
    }
}

impl Default for RenderToggles {
    fn default() -> Self {
        Self::new(PolygonMode::Fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wc() -> ToggleKeys {
        ToggleKeys {
            cycle_mode: KeyCode::KeyW,
            toggle_culling: KeyCode::KeyC,
        }
    }

    #[test]
    fn mode_cycles_fill_line_point() {
        let mut toggles = RenderToggles::default();
        assert_eq!(toggles.mode(), PolygonMode::Fill);
        assert_eq!(toggles.advance_mode(), PolygonMode::Line);
        assert_eq!(toggles.advance_mode(), PolygonMode::Point);
        assert_eq!(toggles.advance_mode(), PolygonMode::Fill);
        assert_eq!(toggles.counter(), 3);
    }

    #[test]
    fn counter_wraps_without_breaking_the_cycle() {
        let mut toggles = RenderToggles {
            counter: u32::MAX,
            culling: false,
        };
        assert_eq!(toggles.mode(), PolygonMode::from_counter(u32::MAX));
        assert_eq!(toggles.advance_mode(), PolygonMode::Fill);
    }

    #[test]
    fn starting_mode_is_respected() {
        assert_eq!(RenderToggles::new(PolygonMode::Line).mode(), PolygonMode::Line);
        assert_eq!(RenderToggles::new(PolygonMode::Point).counter(), 2);
    }

    #[test]
    fn held_mode_key_advances_once() {
        let mut toggles = RenderToggles::default();
        let mut input = Input::new();
        let keys = wc();

        input.press(KeyCode::KeyW);
        for _ in 0..10 {
            toggles.handle_input(&input, keys);
            input.begin_frame();
            // held, with auto-repeat
            input.press(KeyCode::KeyW);
        }
        assert_eq!(toggles.counter(), 1);
        assert_eq!(toggles.mode(), PolygonMode::Line);
        assert!(!toggles.culling());

        input.release(KeyCode::KeyW);
        input.press(KeyCode::KeyW);
        toggles.handle_input(&input, keys);
        assert_eq!(toggles.mode(), PolygonMode::Point);
    }

    #[test]
    fn held_culling_key_flips_once() {
        let mut toggles = RenderToggles::default();
        let mut input = Input::new();
        let keys = wc();

        input.press(KeyCode::KeyC);
        for _ in 0..10 {
            toggles.handle_input(&input, keys);
            input.begin_frame();
            input.press(KeyCode::KeyC);
        }
        assert!(toggles.culling());
        assert_eq!(toggles.cull_mode(), Some(wgpu::Face::Back));
        assert_eq!(toggles.counter(), 0);

        input.release(KeyCode::KeyC);
        input.press(KeyCode::KeyC);
        toggles.handle_input(&input, keys);
        assert!(!toggles.culling());
        assert_eq!(toggles.cull_mode(), None);
    }

    #[test]
    fn other_keys_change_nothing() {
        let mut toggles = RenderToggles::new(PolygonMode::Line);
        let mut input = Input::new();
        input.press(KeyCode::ArrowUp);
        input.press(KeyCode::KeyI);
        toggles.handle_input(&input, wc());
        assert_eq!(toggles, RenderToggles::new(PolygonMode::Line));
    }

    #[test]
    fn only_fill_needs_no_feature() {
        assert!(PolygonMode::Fill.required_feature().is_empty());
        assert!(!PolygonMode::Line.required_feature().is_empty());
        assert!(!PolygonMode::Point.required_feature().is_empty());
    }
}
