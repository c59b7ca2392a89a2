//! Render composition contract
//!
//! Everything a rendering layer gets to see for one frame:
//!
//! - **RenderContext**: the read-only frame bundle, borrowed for a single
//!   `on_render` call
//! - **LabelRenderParams**: which labels are visible and how they are styled
//! - **Scene**: named scene objects (the 3D axes helper) and the point light
//! - **DrawSurface**: the final draw target, owned by the scatter plot

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, ProjectionMode};
use crate::types::{ColorRgb, Vec3};

/// Name under which the axes helper is stored in the scene
pub const AXES_OBJECT_NAME: &str = "axes";

/// Color of the light that follows the camera
pub const LIGHT_COLOR: u32 = 0xffecbf;

/// Offset of the light from the camera position
pub const LIGHT_OFFSET: Vec3 = [1.0, 1.0, 0.0];

/// Visible labels and their styling, parallel arrays indexed by label slot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelRenderParams {
    /// Point index each label belongs to
    pub point_indices: Vec<usize>,
    pub label_strings: Vec<String>,
    pub scale_factors: Vec<f32>,
    /// Whether the label fades with scene opacity
    pub use_scene_opacity_flags: Vec<bool>,
    pub default_font_size: f32,
    pub fill_colors: Vec<ColorRgb>,
    pub stroke_colors: Vec<ColorRgb>,
}

impl LabelRenderParams {
    pub fn len(&self) -> usize {
        self.point_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_indices.is_empty()
    }
}

/// The per-frame bundle handed to every active layer.
///
/// Rebuilt from the scatter plot's state on every render; layers cannot keep
/// it past the call that produced it.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub camera: &'a Camera,
    pub camera_type: ProjectionMode,
    /// Navigation target the camera looks at
    pub camera_target: Vec3,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Nearest and farthest point distance from the camera
    pub near_far_point_extent: (f32, f32),
    pub background_color: ColorRgb,
    /// Packed RGB, 3 per point
    pub point_colors: &'a [f32],
    /// One per point
    pub point_scale_factors: &'a [f32],
    pub labels: Option<&'a LabelRenderParams>,
    /// Packed RGB per polyline vertex pair, keyed by sequence index
    pub polyline_colors: &'a BTreeMap<usize, Vec<f32>>,
    pub polyline_opacities: &'a [f32],
    pub polyline_widths: &'a [f32],
}

impl<'a> RenderContext<'a> {
    pub fn point_count(&self) -> usize {
        self.point_scale_factors.len()
    }

    /// Project a world-space point to viewport pixels
    pub fn project_to_screen(&self, point: Vec3) -> [f32; 2] {
        self.camera.project_to_screen(point, self.screen_width, self.screen_height)
    }
}

// MARK: - Scene

/// Axis lines from the origin along +X, +Y and +Z
#[derive(Clone, Debug, PartialEq)]
pub struct AxesHelper {
    pub size: f32,
}

impl AxesHelper {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    /// Line vertices for rendering (6 vertices = 3 axes × 2)
    pub fn line_vertices(&self) -> Vec<[f32; 3]> {
        let s = self.size;
        vec![
            [0.0, 0.0, 0.0],
            [s, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [0.0, s, 0.0],
            [0.0, 0.0, 0.0],
            [0.0, 0.0, s],
        ]
    }

    /// One color per vertex: X red, Y green, Z blue
    pub fn line_colors(&self) -> Vec<ColorRgb> {
        let red = ColorRgb::new(1.0, 0.0, 0.0);
        let green = ColorRgb::new(0.0, 1.0, 0.0);
        let blue = ColorRgb::new(0.0, 0.0, 1.0);
        vec![red, red, green, green, blue, blue]
    }
}

impl Default for AxesHelper {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// What a named scene object is
#[derive(Clone, Debug, PartialEq)]
pub enum SceneObjectKind {
    Axes(AxesHelper),
    /// Anything a layer adds that the core does not interpret
    Layer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: SceneObjectKind,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: SceneObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub color: ColorRgb,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: ColorRgb::from_hex(LIGHT_COLOR),
            intensity: 1.0,
            position: [0.0, 0.0, 0.0],
        }
    }
}

/// Scene graph shared by the scatter plot and its layers
#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    pub light: PointLight,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Remove the first object named `name`
    pub fn remove_by_name(&mut self, name: &str) -> Option<SceneObject> {
        let position = self.objects.iter().position(|o| o.name == name)?;
        Some(self.objects.remove(position))
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Place the light relative to the camera
    pub fn follow_camera(&mut self, camera_position: Vec3) {
        self.light.position = [
            camera_position[0] + LIGHT_OFFSET[0],
            camera_position[1] + LIGHT_OFFSET[1],
            camera_position[2] + LIGHT_OFFSET[2],
        ];
    }
}

// MARK: - Draw surface

/// Final draw target for a frame
pub trait DrawSurface {
    fn set_clear_color(&mut self, color: ColorRgb);

    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f32);

    /// Draw the scene from `camera`, after every layer has rendered
    fn draw(&mut self, scene: &Scene, camera: &Camera);
}

/// Headless surface that only records what it was asked to do
#[derive(Clone, Debug, Default)]
pub struct NullSurface {
    pub clear_color: Option<ColorRgb>,
    pub size: (u32, u32),
    pub pixel_ratio: f32,
    pub draw_count: usize,
    /// Camera position used by the last draw
    pub last_camera_position: Option<Vec3>,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawSurface for NullSurface {
    fn set_clear_color(&mut self, color: ColorRgb) {
        self.clear_color = Some(color);
    }

    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.size = (width, height);
        self.pixel_ratio = pixel_ratio;
    }

    fn draw(&mut self, _scene: &Scene, camera: &Camera) {
        self.draw_count += 1;
        self.last_camera_position = Some(camera.position);
    }
}

/// Lets the host keep a handle on a surface it lends to the scatter plot
impl<S: DrawSurface> DrawSurface for Rc<RefCell<S>> {
    fn set_clear_color(&mut self, color: ColorRgb) {
        self.borrow_mut().set_clear_color(color);
    }

    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.borrow_mut().set_size(width, height, pixel_ratio);
    }

    fn draw(&mut self, scene: &Scene, camera: &Camera) {
        self.borrow_mut().draw(scene, camera);
    }
}
