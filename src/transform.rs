//! Keyboard-driven model transform and MVP composition.
//!
//! [`TransformPipeline`] owns the accumulated rotation angles and uniform
//! scale, a fixed [`Camera`], and the projection parameters. Each frame it
//! reads held keys, nudges the accumulators by a fixed step, and produces the
//! `projection * view * model` matrix that ends up in the `u_MVP` uniform.
//!
//! Accumulation is per frame, not per second: holding a key for N frames moves
//! the angle by exactly `N * ROTATION_STEP`, with no clamping or wraparound.

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::input::Input;

/// Radians added or removed per frame while a rotation key is held.
pub const ROTATION_STEP: f32 = 0.02;

/// Scale added or removed per frame while a scale key is held.
pub const SCALE_STEP: f32 = 0.01;

/// Vertical field of view, in degrees.
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Where the uniform scale sits relative to the rotations in the model matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOrder {
    /// `S * Rx * Ry * Rz`
    BeforeRotation,
    /// `Rx * Ry * Rz * S`
    AfterRotation,
}

/// Accumulated model state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelState {
    pub angle_x: f32,
    pub angle_y: f32,
    pub angle_z: f32,
    pub scale: f32,
}

impl Default for ModelState {
    fn default() -> Self {
        Self {
            angle_x: 0.0,
            angle_y: 0.0,
            angle_z: 0.0,
            scale: 1.0,
        }
    }
}

impl ModelState {
    /// Builds the model matrix with the scale placed according to `order`.
    pub fn matrix(&self, order: ScaleOrder) -> Mat4 {
        let rotation = Mat4::from_rotation_x(self.angle_x)
            * Mat4::from_rotation_y(self.angle_y)
            * Mat4::from_rotation_z(self.angle_z);
        let scale = Mat4::from_scale(Vec3::splat(self.scale));

        match order {
            ScaleOrder::BeforeRotation => scale * rotation,
            ScaleOrder::AfterRotation => rotation * scale,
        }
    }
}

/// A fixed look-at camera.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Which keys drive the model state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub pitch_up: KeyCode,
    pub pitch_down: KeyCode,
    pub yaw_left: KeyCode,
    pub yaw_right: KeyCode,
    /// `None` disables keyboard scaling.
    pub scale_keys: Option<(KeyCode, KeyCode)>,
}

impl KeyBindings {
    /// Arrow keys only.
    pub fn arrows() -> Self {
        Self {
            pitch_up: KeyCode::ArrowUp,
            pitch_down: KeyCode::ArrowDown,
            yaw_left: KeyCode::ArrowLeft,
            yaw_right: KeyCode::ArrowRight,
            scale_keys: None,
        }
    }

    /// Arrow keys plus `I` (grow) and `K` (shrink).
    pub fn arrows_with_scale() -> Self {
        Self {
            scale_keys: Some((KeyCode::KeyI, KeyCode::KeyK)),
            ..Self::arrows()
        }
    }
}

/// Accumulates input into a model transform and composes the MVP matrix.
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    model: ModelState,
    camera: Camera,
    order: ScaleOrder,
    bindings: KeyBindings,
    aspect: f32,
}

impl TransformPipeline {
    pub fn new(order: ScaleOrder, bindings: KeyBindings, aspect: f32) -> Self {
        Self {
            model: ModelState::default(),
            camera: Camera::default(),
            order,
            bindings,
            aspect,
        }
    }

    /// Applies one frame of held keys to the model state.
    pub fn update(&mut self, input: &Input) {
        let keys = self.bindings;

        if input.key_down(keys.pitch_up) {
            self.model.angle_x -= ROTATION_STEP;
        }
        if input.key_down(keys.pitch_down) {
            self.model.angle_x += ROTATION_STEP;
        }
        if input.key_down(keys.yaw_left) {
            self.model.angle_y += ROTATION_STEP;
        }
        if input.key_down(keys.yaw_right) {
            self.model.angle_y -= ROTATION_STEP;
        }
        if let Some((grow, shrink)) = keys.scale_keys {
            if input.key_down(grow) {
                self.model.scale += SCALE_STEP;
            }
            if input.key_down(shrink) {
                self.model.scale -= SCALE_STEP;
            }
        }
    }

    pub fn model(&self) -> &ModelState {
        &self.model
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, Z_NEAR, Z_FAR)
    }

    /// `projection * view * model` for the current state.
    pub fn mvp(&self) -> Mat4 {
        self.projection_matrix() * self.camera.view_matrix() * self.model.matrix(self.order)
    }
}
