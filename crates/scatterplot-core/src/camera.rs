//! Camera system for the scatter plot
//!
//! Provides the perspective (3D) and orthographic (2D) cameras, the plain-data
//! [`CameraDescriptor`] used to build and snapshot them, and the small vector
//! math shared with the orbit controls.

use serde::{Deserialize, Serialize};

use crate::dataset::Dimensions;
use crate::types::{Mat4, Vec3};

/// Length of the cube (diameter of the circumscribing sphere) where all the
/// points live.
pub const CUBE_LENGTH: f32 = 2.0;
pub const MAX_ZOOM: f32 = 5.0 * CUBE_LENGTH;
pub const MIN_ZOOM: f32 = 0.025 * CUBE_LENGTH;

pub const PERSP_CAMERA_FOV_VERTICAL: f32 = 70.0;
pub const PERSP_CAMERA_NEAR_CLIP_PLANE: f32 = 0.01;
pub const PERSP_CAMERA_FAR_CLIP_PLANE: f32 = 100.0;
pub const ORTHO_CAMERA_FRUSTUM_HALF_EXTENT: f32 = 1.2;
pub const ORTHO_CAMERA_NEAR_CLIP_PLANE: f32 = -1000.0;
pub const ORTHO_CAMERA_FAR_CLIP_PLANE: f32 = 1000.0;

pub const START_CAMERA_POS_3D: Vec3 = [0.45, 0.9, 1.6];
pub const START_CAMERA_TARGET_3D: Vec3 = [0.0, 0.0, 0.0];
pub const START_CAMERA_POS_2D: Vec3 = [0.0, 0.0, 4.0];
pub const START_CAMERA_TARGET_2D: Vec3 = [0.0, 0.0, 0.0];

const CAMERA_UP: Vec3 = [0.0, 1.0, 0.0];

/// Camera projection mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

/// Serializable camera definition.
///
/// Building a camera from the same descriptor always yields the same view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub orthographic: bool,
    pub position: Vec3,
    pub target: Vec3,
    pub zoom: f32,
}

impl CameraDescriptor {
    /// Default camera for the given dimensionality with optional overrides
    pub fn default_for(dimensions: Dimensions, params: &CameraParams) -> Self {
        let orthographic = dimensions == Dimensions::Two;
        let (position, target) = if orthographic {
            (START_CAMERA_POS_2D, START_CAMERA_TARGET_2D)
        } else {
            (START_CAMERA_POS_3D, START_CAMERA_TARGET_3D)
        };

        Self {
            orthographic,
            position: params.position.unwrap_or(position),
            target: params.target.unwrap_or(target),
            zoom: params.zoom.unwrap_or(1.0),
        }
    }
}

/// Partial camera overrides
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f32>,
}

impl CameraParams {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.target.is_none() && self.zoom.is_none()
    }
}

/// Orthographic frustum planes
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Frustum {
    /// Symmetric frustum sized to the fixed half extent, aspect-corrected so the
    /// longer viewport side is widened rather than cropped.
    pub fn for_aspect(aspect: f32) -> Self {
        let mut half_width = ORTHO_CAMERA_FRUSTUM_HALF_EXTENT;
        let mut half_height = ORTHO_CAMERA_FRUSTUM_HALF_EXTENT;
        if aspect > 1.0 {
            half_width *= aspect;
        } else {
            half_height /= aspect;
        }
        Self::symmetric(half_width, half_height)
    }

    pub fn symmetric(half_width: f32, half_height: f32) -> Self {
        Self {
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
        }
    }

    pub fn half_width(&self) -> f32 {
        (self.right - self.left) / 2.0
    }

    pub fn half_height(&self) -> f32 {
        (self.top - self.bottom) / 2.0
    }
}

/// Camera configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Look-at target
    pub target: Vec3,

    /// Up vector
    pub up: Vec3,

    /// Vertical field of view in degrees (for perspective)
    pub fov: f32,

    /// Near clipping plane
    pub near: f32,

    /// Far clipping plane
    pub far: f32,

    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,

    /// Zoom factor applied on top of the projection
    pub zoom: f32,

    /// Frustum planes (only used if orthographic)
    pub frustum: Frustum,

    /// Projection mode
    pub projection: ProjectionMode,
}

impl Camera {
    /// Create the 3D perspective camera described by `descriptor`
    pub fn perspective(descriptor: &CameraDescriptor, aspect: f32) -> Self {
        Self {
            position: descriptor.position,
            target: descriptor.target,
            up: CAMERA_UP,
            fov: PERSP_CAMERA_FOV_VERTICAL,
            near: PERSP_CAMERA_NEAR_CLIP_PLANE,
            far: PERSP_CAMERA_FAR_CLIP_PLANE,
            aspect_ratio: aspect,
            zoom: descriptor.zoom,
            frustum: Frustum::default(),
            projection: ProjectionMode::Perspective,
        }
    }

    /// Create the 2D orthographic camera described by `descriptor`
    pub fn orthographic(descriptor: &CameraDescriptor, aspect: f32) -> Self {
        Self {
            position: descriptor.position,
            target: descriptor.target,
            up: CAMERA_UP,
            fov: PERSP_CAMERA_FOV_VERTICAL,
            near: ORTHO_CAMERA_NEAR_CLIP_PLANE,
            far: ORTHO_CAMERA_FAR_CLIP_PLANE,
            aspect_ratio: aspect,
            zoom: descriptor.zoom,
            frustum: Frustum::for_aspect(aspect),
            projection: ProjectionMode::Orthographic,
        }
    }

    /// Build whichever camera the descriptor asks for, sized to the viewport
    pub fn from_descriptor(descriptor: &CameraDescriptor, width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        if descriptor.orthographic {
            Self::orthographic(descriptor, aspect)
        } else {
            Self::perspective(descriptor, aspect)
        }
    }

    pub fn is_orthographic(&self) -> bool {
        self.projection == ProjectionMode::Orthographic
    }

    /// Snapshot the camera as a descriptor
    pub fn descriptor(&self) -> CameraDescriptor {
        CameraDescriptor {
            orthographic: self.is_orthographic(),
            position: self.position,
            target: self.target,
            zoom: self.zoom,
        }
    }

    /// Move the camera to the descriptor's pose, keeping its projection
    pub fn update_from_descriptor(&mut self, descriptor: &CameraDescriptor) {
        self.position = descriptor.position;
        self.target = descriptor.target;
        self.zoom = descriptor.zoom;
    }

    /// Rescale after the viewport changed from `old` to `new` (width, height).
    ///
    /// Perspective cameras only track the aspect ratio. Orthographic cameras
    /// scale each frustum half extent by the matching size ratio so the
    /// apparent zoom level is preserved.
    pub fn resize(&mut self, old: (u32, u32), new: (u32, u32)) {
        let (old_w, old_h) = (old.0.max(1) as f32, old.1.max(1) as f32);
        let (new_w, new_h) = (new.0.max(1) as f32, new.1.max(1) as f32);
        self.aspect_ratio = new_w / new_h;

        if self.is_orthographic() {
            let half_width = self.frustum.half_width() * (new_w / old_w);
            let half_height = self.frustum.half_height() * (new_h / old_h);
            self.frustum = Frustum::symmetric(half_width, half_height);
        }
    }

    /// Get the view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        look_at(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        let zoom = self.zoom.max(f32::EPSILON);
        match self.projection {
            ProjectionMode::Perspective => {
                let fov = 2.0 * ((self.fov.to_radians() / 2.0).tan() / zoom).atan();
                perspective(fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => orthographic(
                self.frustum.left / zoom,
                self.frustum.right / zoom,
                self.frustum.top / zoom,
                self.frustum.bottom / zoom,
                self.near,
                self.far,
            ),
        }
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        mat4_multiply(self.projection_matrix(), self.view_matrix())
    }

    /// Project a world-space point into normalized device coordinates
    pub fn project(&self, point: Vec3) -> Vec3 {
        let m = self.view_projection_matrix();
        let [x, y, z] = point;
        let w = m[0][3] * x + m[1][3] * y + m[2][3] * z + m[3][3];
        let w = if w.abs() < f32::EPSILON { f32::EPSILON } else { w };
        [
            (m[0][0] * x + m[1][0] * y + m[2][0] * z + m[3][0]) / w,
            (m[0][1] * x + m[1][1] * y + m[2][1] * z + m[3][1]) / w,
            (m[0][2] * x + m[1][2] * y + m[2][2] * z + m[3][2]) / w,
        ]
    }

    /// Project a world-space point into viewport pixels (origin top-left)
    pub fn project_to_screen(&self, point: Vec3, width: u32, height: u32) -> [f32; 2] {
        let ndc = self.project(point);
        [
            (ndc[0] + 1.0) / 2.0 * width as f32,
            (1.0 - ndc[1]) / 2.0 * height as f32,
        ]
    }

    /// Get camera forward direction
    pub fn forward(&self) -> Vec3 {
        vec_normalize(vec_sub(self.target, self.position))
    }

    /// Get camera right direction
    pub fn right(&self) -> Vec3 {
        vec_normalize(vec_cross(self.forward(), self.up))
    }

    /// Get distance from camera to target
    pub fn distance(&self) -> f32 {
        vec_length(vec_sub(self.target, self.position))
    }

    /// Set distance while maintaining direction
    pub fn set_distance(&mut self, distance: f32) {
        let direction = vec_normalize(vec_sub(self.position, self.target));
        self.position = vec_add(self.target, vec_scale(direction, distance));
    }
}

// MARK: - Math utilities

pub(crate) fn vec_add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn vec_sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn vec_scale(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub(crate) fn vec_dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn vec_cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn vec_length(v: Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub(crate) fn vec_normalize(v: Vec3) -> Vec3 {
    let len = vec_length(v);
    if len > 0.0001 {
        vec_scale(v, 1.0 / len)
    } else {
        v
    }
}

fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let mut f = vec_normalize(vec_sub(target, eye));
    if vec_length(vec_cross(f, up)) < 1e-6 {
        // Looking straight along `up`: nudge so the basis stays defined
        f = vec_normalize(vec_add(f, [0.0, 0.0, 1e-4]));
        if vec_length(vec_cross(f, up)) < 1e-6 {
            f = vec_normalize(vec_add(f, [1e-4, 0.0, 0.0]));
        }
    }
    let s = vec_normalize(vec_cross(f, up));
    let u = vec_cross(s, f);

    [
        [s[0], u[0], -f[0], 0.0],
        [s[1], u[1], -f[1], 0.0],
        [s[2], u[2], -f[2], 0.0],
        [-vec_dot(s, eye), -vec_dot(u, eye), vec_dot(f, eye), 1.0],
    ]
}

fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let tan_half_fov = (fov / 2.0).tan();

    let mut m = [[0.0; 4]; 4];
    m[0][0] = 1.0 / (aspect * tan_half_fov);
    m[1][1] = 1.0 / tan_half_fov;
    m[2][2] = -(far + near) / (far - near);
    m[2][3] = -1.0;
    m[3][2] = -(2.0 * far * near) / (far - near);

    m
}

fn orthographic(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Mat4 {
    let mut m = [[0.0; 4]; 4];
    m[0][0] = 2.0 / (right - left);
    m[1][1] = 2.0 / (top - bottom);
    m[2][2] = -2.0 / (far - near);
    m[3][0] = -(right + left) / (right - left);
    m[3][1] = -(top + bottom) / (top - bottom);
    m[3][2] = -(far + near) / (far - near);
    m[3][3] = 1.0;

    m
}

fn mat4_multiply(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor_2d() -> CameraDescriptor {
        CameraDescriptor::default_for(Dimensions::Two, &CameraParams::default())
    }

    fn descriptor_3d() -> CameraDescriptor {
        CameraDescriptor::default_for(Dimensions::Three, &CameraParams::default())
    }

    #[test]
    fn test_default_descriptors() {
        let d2 = descriptor_2d();
        assert!(d2.orthographic);
        assert_eq!(d2.position, START_CAMERA_POS_2D);
        assert_eq!(d2.zoom, 1.0);

        let d3 = descriptor_3d();
        assert!(!d3.orthographic);
        assert_eq!(d3.position, START_CAMERA_POS_3D);
    }

    #[test]
    fn test_descriptor_overrides() {
        let params = CameraParams {
            zoom: Some(2.0),
            target: Some([1.0, 0.0, 0.0]),
            ..Default::default()
        };
        let d = CameraDescriptor::default_for(Dimensions::Three, &params);
        assert_eq!(d.zoom, 2.0);
        assert_eq!(d.target, [1.0, 0.0, 0.0]);
        assert_eq!(d.position, START_CAMERA_POS_3D);
    }

    #[test]
    fn test_descriptor_round_trip() {
        let camera = Camera::from_descriptor(&descriptor_3d(), 800, 600);
        let snapshot = camera.descriptor();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: CameraDescriptor = serde_json::from_str(&json).unwrap();
        let rebuilt = Camera::from_descriptor(&restored, 800, 600);

        assert_eq!(restored, snapshot);
        assert_eq!(rebuilt.view_projection_matrix(), camera.view_projection_matrix());
    }

    #[test]
    fn test_ortho_frustum_wide_viewport() {
        let camera = Camera::from_descriptor(&descriptor_2d(), 800, 400);
        assert!((camera.frustum.half_width() - ORTHO_CAMERA_FRUSTUM_HALF_EXTENT * 2.0).abs() < 1e-6);
        assert!((camera.frustum.half_height() - ORTHO_CAMERA_FRUSTUM_HALF_EXTENT).abs() < 1e-6);
    }

    #[test]
    fn test_ortho_frustum_tall_viewport() {
        let camera = Camera::from_descriptor(&descriptor_2d(), 400, 800);
        assert!((camera.frustum.half_width() - ORTHO_CAMERA_FRUSTUM_HALF_EXTENT).abs() < 1e-6);
        assert!((camera.frustum.half_height() - ORTHO_CAMERA_FRUSTUM_HALF_EXTENT * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_ortho_resize_is_pure_ratio() {
        let mut camera = Camera::from_descriptor(&descriptor_2d(), 800, 600);
        let before = camera.frustum;
        camera.resize((800, 600), (1600, 600));

        assert_eq!(camera.frustum.half_width(), before.half_width() * 2.0);
        assert_eq!(camera.frustum.half_height(), before.half_height());
    }

    #[test]
    fn test_perspective_resize_updates_aspect_only() {
        let mut camera = Camera::from_descriptor(&descriptor_3d(), 800, 600);
        camera.resize((800, 600), (1200, 600));
        assert!((camera.aspect_ratio - 2.0).abs() < 1e-6);
        assert_eq!(camera.frustum, Frustum::default());
    }

    #[test]
    fn test_project_target_to_center() {
        let camera = Camera::from_descriptor(&descriptor_3d(), 800, 600);
        let ndc = camera.project(camera.target);
        assert!(ndc[0].abs() < 1e-4);
        assert!(ndc[1].abs() < 1e-4);

        let [sx, sy] = camera.project_to_screen(camera.target, 800, 600);
        assert!((sx - 400.0).abs() < 0.1);
        assert!((sy - 300.0).abs() < 0.1);
    }

    #[test]
    fn test_2d_camera_keeps_axes_upright() {
        let camera = Camera::from_descriptor(&descriptor_2d(), 600, 600);
        let right = camera.project([1.0, 0.0, 0.0]);
        let up = camera.project([0.0, 1.0, 0.0]);
        assert!(right[0] > 0.0 && right[1].abs() < 1e-3);
        assert!(up[1] > 0.0 && up[0].abs() < 1e-3);
    }

    #[test]
    fn test_zoom_scales_orthographic_projection() {
        let mut d = descriptor_2d();
        let base = Camera::from_descriptor(&d, 600, 600).project([1.0, 0.0, 0.0]);
        d.zoom = 2.0;
        let zoomed = Camera::from_descriptor(&d, 600, 600).project([1.0, 0.0, 0.0]);
        assert!((zoomed[0] - base[0] * 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_camera_distance() {
        let camera = Camera::from_descriptor(&descriptor_2d(), 100, 100);
        assert!((camera.distance() - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_vec_operations() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];

        assert_eq!(vec_add(a, b), [5.0, 7.0, 9.0]);
        assert_eq!(vec_sub(b, a), [3.0, 3.0, 3.0]);
        assert!((vec_dot(a, b) - 32.0).abs() < 0.001);
    }
}
