//! Orbit-style navigation controls
//!
//! Rotate, pan and dolly around the camera target, driven by pointer input.
//! The controls never own the camera; every operation takes it by `&mut` so
//! the scatter plot can rebuild one without touching the other.

use std::f32::consts::PI;

use crate::camera::{
    vec_add, vec_cross, vec_length, vec_normalize, vec_scale, vec_sub, Camera, CUBE_LENGTH, MAX_ZOOM, MIN_ZOOM,
};
use crate::input::MouseButton;
use crate::types::ScreenPoint;

pub const ORBIT_MOUSE_ROTATION_SPEED: f32 = 1.0;
pub const ORBIT_ANIMATION_ROTATION_CYCLE_IN_SECONDS: f32 = 7.0;
pub const ORBIT_ZOOM_SPEED: f32 = 0.125;

/// Keeps the polar angle away from the poles
const POLAR_EPSILON: f32 = 1e-6;

/// Lifecycle notifications emitted while the user drives the controls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// The user started interacting
    Start,
    /// The camera moved
    Change,
    /// The user stopped interacting
    End,
}

/// What a mouse button does while navigating
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlAction {
    Rotate,
    Pan,
}

/// Which physical button orbits and which pans
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseButtonRoles {
    pub orbit: MouseButton,
    pub pan: MouseButton,
}

impl MouseButtonRoles {
    /// Default 3D scheme: left orbits, right pans
    pub fn orbit_left() -> Self {
        Self {
            orbit: MouseButton::Left,
            pan: MouseButton::Right,
        }
    }

    /// Swapped scheme used while the modifier key is held (and in 2D, where
    /// the left button pans and rotation is disabled)
    pub fn orbit_right() -> Self {
        Self {
            orbit: MouseButton::Right,
            pan: MouseButton::Left,
        }
    }

    pub fn action_for(&self, button: MouseButton) -> Option<ControlAction> {
        if button == self.orbit {
            Some(ControlAction::Rotate)
        } else if button == self.pan {
            Some(ControlAction::Pan)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct DragState {
    action: ControlAction,
    last: ScreenPoint,
}

/// Orbit controls for the scatter plot camera
#[derive(Clone, Debug)]
pub struct OrbitControls {
    /// Whether pointer input drives the camera at all
    pub enabled: bool,

    /// Rotation is only meaningful in 3D
    pub enable_rotate: bool,

    pub mouse_buttons: MouseButtonRoles,

    /// Perspective distance limits
    pub min_distance: f32,
    pub max_distance: f32,

    /// Orthographic zoom limits
    pub min_zoom: f32,
    pub max_zoom: f32,

    pub rotate_speed: f32,
    pub zoom_speed: f32,

    /// Continuous rotation driven by [`OrbitControls::update`]
    pub auto_rotate: bool,
    pub auto_rotate_cycle_seconds: f32,

    drag: Option<DragState>,
}

impl OrbitControls {
    /// Controls for a freshly built camera
    pub fn new(camera_is_3d: bool) -> Self {
        Self {
            enabled: true,
            enable_rotate: camera_is_3d,
            mouse_buttons: if camera_is_3d {
                MouseButtonRoles::orbit_left()
            } else {
                MouseButtonRoles::orbit_right()
            },
            min_distance: MIN_ZOOM,
            max_distance: MAX_ZOOM,
            min_zoom: CUBE_LENGTH / MAX_ZOOM,
            max_zoom: CUBE_LENGTH / MIN_ZOOM,
            rotate_speed: ORBIT_MOUSE_ROTATION_SPEED,
            zoom_speed: ORBIT_ZOOM_SPEED,
            auto_rotate: false,
            auto_rotate_cycle_seconds: ORBIT_ANIMATION_ROTATION_CYCLE_IN_SECONDS,
            drag: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Make the button roles match the modifier state.
    ///
    /// Returns `true` when the roles had drifted and were corrected.
    pub fn sync_button_roles(&mut self, modifier_held: bool) -> bool {
        if !self.enable_rotate {
            return false;
        }
        let expected = if modifier_held {
            MouseButtonRoles::orbit_right()
        } else {
            MouseButtonRoles::orbit_left()
        };
        if self.mouse_buttons == expected {
            return false;
        }
        self.mouse_buttons = expected;
        true
    }

    /// Begin a drag with `button`
    pub fn pointer_down(&mut self, button: MouseButton, at: ScreenPoint) -> Option<ControlEvent> {
        if !self.enabled {
            return None;
        }
        let action = self.mouse_buttons.action_for(button)?;
        if action == ControlAction::Rotate && !self.enable_rotate {
            return None;
        }
        self.drag = Some(DragState { action, last: at });
        Some(ControlEvent::Start)
    }

    /// Continue a drag, moving the camera
    pub fn pointer_move(&mut self, at: ScreenPoint, camera: &mut Camera, viewport: (u32, u32)) -> Option<ControlEvent> {
        if !self.enabled {
            return None;
        }
        let drag = self.drag.as_mut()?;
        let dx = at.x - drag.last.x;
        let dy = at.y - drag.last.y;
        drag.last = at;
        let action = drag.action;

        let height = viewport.1.max(1) as f32;
        match action {
            ControlAction::Rotate => {
                let azimuth = 2.0 * PI * dx / height * self.rotate_speed;
                let polar = 2.0 * PI * dy / height * self.rotate_speed;
                self.rotate(camera, azimuth, polar);
            }
            ControlAction::Pan => self.pan(camera, dx, dy, viewport),
        }
        Some(ControlEvent::Change)
    }

    /// Finish a drag
    pub fn pointer_up(&mut self) -> Option<ControlEvent> {
        self.drag.take().map(|_| ControlEvent::End)
    }

    /// Zoom from a wheel event. Negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f32, camera: &mut Camera) -> Vec<ControlEvent> {
        if !self.enabled || delta_y == 0.0 {
            return Vec::new();
        }
        let scale = self.zoom_scale();
        if delta_y < 0.0 {
            self.dolly(camera, scale);
        } else {
            self.dolly(camera, 1.0 / scale);
        }
        vec![ControlEvent::Start, ControlEvent::Change, ControlEvent::End]
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Orbit the camera around its target (radians)
    pub fn rotate(&self, camera: &mut Camera, azimuth: f32, polar: f32) {
        if !self.enable_rotate {
            return;
        }
        let offset = vec_sub(camera.position, camera.target);
        let radius = vec_length(offset);
        if radius <= f32::EPSILON {
            return;
        }

        let theta = offset[0].atan2(offset[2]) - azimuth;
        let phi = ((offset[1] / radius).clamp(-1.0, 1.0).acos() - polar).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let rotated = [
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        ];
        camera.position = vec_add(camera.target, rotated);
    }

    /// Translate camera and target together by a pixel delta
    pub fn pan(&self, camera: &mut Camera, dx: f32, dy: f32, viewport: (u32, u32)) {
        let (width, height) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        let right = camera.right();
        let up = vec_normalize(vec_cross(right, camera.forward()));

        let (move_x, move_y) = if camera.is_orthographic() {
            let zoom = camera.zoom.max(f32::EPSILON);
            (
                dx * (camera.frustum.right - camera.frustum.left) / zoom / width,
                dy * (camera.frustum.top - camera.frustum.bottom) / zoom / height,
            )
        } else {
            let target_distance = camera.distance() * (camera.fov.to_radians() / 2.0).tan();
            (
                2.0 * dx * target_distance / height,
                2.0 * dy * target_distance / height,
            )
        };

        let delta = vec_add(vec_scale(right, -move_x), vec_scale(up, move_y));
        camera.position = vec_add(camera.position, delta);
        camera.target = vec_add(camera.target, delta);
    }

    /// Scale the view. `factor < 1` zooms in.
    pub fn dolly(&self, camera: &mut Camera, factor: f32) {
        if camera.is_orthographic() {
            camera.zoom = (camera.zoom / factor).clamp(self.min_zoom, self.max_zoom);
        } else {
            let distance = camera.distance() * factor;
            camera.set_distance(distance);
            self.clamp_distance(camera);
        }
    }

    /// Keep a perspective camera within the distance limits.
    ///
    /// Orthographic zoom is only limited while dollying, so a stored zoom
    /// survives a camera rebuild untouched.
    pub fn clamp_distance(&self, camera: &mut Camera) {
        if camera.is_orthographic() {
            return;
        }
        let distance = camera.distance();
        let clamped = distance.clamp(self.min_distance, self.max_distance);
        if clamped != distance {
            camera.set_distance(clamped);
        }
    }

    /// Advance auto-rotation by `dt` seconds and re-apply the limits.
    ///
    /// Returns `true` if the camera moved.
    pub fn update(&self, camera: &mut Camera, dt: f32) -> bool {
        let before = (camera.position, camera.zoom);
        if self.auto_rotate && self.enable_rotate && self.auto_rotate_cycle_seconds > 0.0 {
            let angle = 2.0 * PI * dt / self.auto_rotate_cycle_seconds;
            self.rotate(camera, angle, 0.0);
        }
        self.clamp_distance(camera);
        before != (camera.position, camera.zoom)
    }
}
