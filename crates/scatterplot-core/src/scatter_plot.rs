//! Scene, camera and interaction coordinator
//!
//! [`ScatterPlot`] owns everything that is independent of how points are
//! actually drawn:
//!
//! - the camera and its orbit controls, rebuilt on 2D/3D switches
//! - the optional orbit animation, driven one frame at a time
//! - the interaction state machine and modifier-key button remapping
//! - the active rendering layers and the per-frame [`RenderContext`]
//! - hover, selection and camera-move listeners
//!
//! It is single-threaded. Each instance owns its state outright, so several
//! plots can coexist.

use std::collections::BTreeMap;

use tracing::debug;

use crate::animation::{FrameId, FrameScheduler};
use crate::camera::{Camera, CameraDescriptor, CameraParams};
use crate::config::ScatterPlotConfig;
use crate::controls::{ControlEvent, OrbitControls};
use crate::dataset::Dimensions;
use crate::error::ScatterResult;
use crate::input::{Key, KeyEvent, MouseEvent};
use crate::interaction::{InteractionMode, InteractionOutcome, InteractionState};
use crate::render::{
    AxesHelper, DrawSurface, LabelRenderParams, RenderContext, Scene, SceneObject, SceneObjectKind,
    AXES_OBJECT_NAME,
};
use crate::selector::{SelectionRegion, SelectionTool};
use crate::types::{ScreenPoint, Vec3};
use crate::util::get_near_far_point_distances;
use crate::visualizer::{VisualizerHandle, VisualizerRegistry};

/// Called with the raw pointer position, or `None` when the pointer leaves
pub type HoverListener = Box<dyn FnMut(Option<ScreenPoint>)>;

/// Called with a finished selection region
pub type SelectListener = Box<dyn FnMut(&SelectionRegion)>;

/// Called with the camera position and target when the user starts moving it
pub type CameraMoveListener = Box<dyn FnMut(Vec3, Vec3)>;

pub struct ScatterPlot {
    config: ScatterPlotConfig,
    width: u32,
    height: u32,
    dimensions: Dimensions,

    camera: Camera,
    controls: OrbitControls,
    next_camera: Option<CameraDescriptor>,
    orbit_animation_on_next_camera_creation: bool,
    orbit_animation: Option<FrameId>,

    scene: Scene,
    surface: Box<dyn DrawSurface>,
    scheduler: Box<dyn FrameScheduler>,
    visualizers: VisualizerRegistry,
    interaction: InteractionState,

    point_colors: Vec<f32>,
    point_scale_factors: Vec<f32>,
    labels: Option<LabelRenderParams>,
    polyline_colors: BTreeMap<usize, Vec<f32>>,
    polyline_opacities: Vec<f32>,
    polyline_widths: Vec<f32>,

    hover_listeners: Vec<HoverListener>,
    select_listeners: Vec<SelectListener>,
    camera_move_listeners: Vec<CameraMoveListener>,
}

impl ScatterPlot {
    /// Create a 3D scatter plot drawing into `surface`.
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        config: ScatterPlotConfig,
        width: u32,
        height: u32,
        mut surface: Box<dyn DrawSurface>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> ScatterResult<Self> {
        config.validate()?;

        let (width, height) = (width.max(1), height.max(1));
        let dimensions = Dimensions::Three;
        let descriptor = CameraDescriptor::default_for(dimensions, &config.camera);
        let (camera, controls) = build_camera(&descriptor, width, height);

        surface.set_clear_color(config.styles.background_color);
        surface.set_size(width, height, config.styles.pixel_ratio);

        let interaction = InteractionState::new(config.select_enabled, config.selection_tool);
        let mut visualizers = VisualizerRegistry::new();
        visualizers.resize(width, height);

        let mut plot = Self {
            config,
            width,
            height,
            dimensions,
            camera,
            controls,
            next_camera: None,
            orbit_animation_on_next_camera_creation: false,
            orbit_animation: None,
            scene: Scene::new(),
            surface,
            scheduler,
            visualizers,
            interaction,
            point_colors: Vec::new(),
            point_scale_factors: Vec::new(),
            labels: None,
            polyline_colors: BTreeMap::new(),
            polyline_opacities: Vec::new(),
            polyline_widths: Vec::new(),
            hover_listeners: Vec::new(),
            select_listeners: Vec::new(),
            camera_move_listeners: Vec::new(),
        };
        plot.sync_axes();
        plot.scene.follow_camera(plot.camera.position);
        Ok(plot)
    }

    pub fn config(&self) -> &ScatterPlotConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    // MARK: - Camera

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn scene_is_3d(&self) -> bool {
        self.dimensions.is_3d()
    }

    /// Switch between 2D and 3D. Setting the current value again is a no-op.
    pub fn set_dimensions(&mut self, dimensions: usize) -> ScatterResult<()> {
        let dimensions = Dimensions::try_from(dimensions)?;
        if dimensions == self.dimensions {
            return Ok(());
        }
        debug!(from = self.dimensions.count(), to = dimensions.count(), "switching dimensions");
        self.dimensions = dimensions;
        self.make_camera(&CameraParams::default());
        Ok(())
    }

    fn make_camera(&mut self, params: &CameraParams) {
        let descriptor = self
            .next_camera
            .take()
            .unwrap_or_else(|| CameraDescriptor::default_for(self.dimensions, params));
        self.recreate_camera(&descriptor);
        self.sync_axes();
    }

    fn sync_axes(&mut self) {
        if self.dimensions.is_3d() && self.config.styles.axes_visible {
            if !self.scene.contains(AXES_OBJECT_NAME) {
                self.scene.add(SceneObject::new(
                    AXES_OBJECT_NAME,
                    SceneObjectKind::Axes(AxesHelper::default()),
                ));
            }
        } else {
            self.scene.remove_by_name(AXES_OBJECT_NAME);
        }
    }

    /// Rebuild the camera and its controls from a descriptor
    pub fn recreate_camera(&mut self, descriptor: &CameraDescriptor) {
        self.stop_orbit_animation();
        let (camera, controls) = build_camera(descriptor, self.width, self.height);
        self.camera = camera;
        self.controls = controls;
        self.controls.enabled = !self.interaction.is_selecting();
        debug!(
            orthographic = descriptor.orthographic,
            position = ?self.camera.position,
            zoom = self.camera.zoom,
            "camera created"
        );
        if self.orbit_animation_on_next_camera_creation {
            self.start_orbit_animation();
        }
    }

    /// Snapshot of the current camera
    pub fn camera_descriptor(&self) -> CameraDescriptor {
        self.camera.descriptor()
    }

    /// Rebuild the camera from `descriptor` and render
    pub fn set_camera_parameters(&mut self, descriptor: &CameraDescriptor) {
        self.recreate_camera(descriptor);
        self.sync_axes();
        self.render();
    }

    /// Use `descriptor` for the next camera rebuild and optionally start
    /// orbiting once it exists
    pub fn set_camera_parameters_for_next_camera_creation(
        &mut self,
        descriptor: Option<CameraDescriptor>,
        orbit_animation: bool,
    ) {
        self.next_camera = descriptor;
        self.orbit_animation_on_next_camera_creation = orbit_animation;
    }

    /// Move the current camera to the descriptor's pose without rebuilding it
    pub fn update_from_camera_descriptor(&mut self, descriptor: &CameraDescriptor) {
        self.camera.update_from_descriptor(descriptor);
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position
    }

    pub fn camera_target(&self) -> Vec3 {
        self.camera.target
    }

    pub fn set_camera_position_and_target(&mut self, position: Vec3, target: Vec3) {
        self.stop_orbit_animation();
        self.camera.position = position;
        self.camera.target = target;
        self.controls.clamp_distance(&mut self.camera);
        self.render();
    }

    /// Back to the default camera for the current dimensionality
    pub fn reset_zoom(&mut self) {
        let descriptor = CameraDescriptor::default_for(self.dimensions, &CameraParams::default());
        self.recreate_camera(&descriptor);
        self.render();
    }

    // MARK: - Orbit animation

    /// Start orbiting around the target. Only available in 3D.
    pub fn start_orbit_animation(&mut self) {
        if !self.scene_is_3d() {
            return;
        }
        if self.orbit_animation.is_some() {
            self.stop_orbit_animation();
        }
        debug!("starting orbit animation");
        self.controls.auto_rotate = true;
        self.controls.update(&mut self.camera, 0.0);
        self.orbit_animation = Some(self.scheduler.request_frame());
    }

    /// Stop orbiting. Safe to call at any time.
    pub fn stop_orbit_animation(&mut self) {
        self.controls.auto_rotate = false;
        if let Some(id) = self.orbit_animation.take() {
            debug!("stopping orbit animation");
            self.scheduler.cancel_frame(id);
        }
    }

    pub fn orbit_is_animating(&self) -> bool {
        self.orbit_animation.is_some()
    }

    /// Advance the orbit animation for frame `id`, `dt` seconds after the
    /// previous one. Frames that are not the one most recently requested
    /// are ignored. Returns `true` if the frame was used.
    pub fn on_animation_frame(&mut self, id: FrameId, dt: f32) -> bool {
        if self.orbit_animation != Some(id) {
            return false;
        }
        if self.controls.update(&mut self.camera, dt) {
            self.render();
        }
        self.orbit_animation = Some(self.scheduler.request_frame());
        true
    }

    // MARK: - Visualizers

    pub fn active_visualizers(&self) -> &[VisualizerHandle] {
        self.visualizers.layers()
    }

    /// Replace the active layers, disposing those that drop out
    pub fn set_active_visualizers(&mut self, layers: Vec<VisualizerHandle>) {
        self.visualizers.set_active(layers, &mut self.scene);
    }

    pub fn add_visualizer(&mut self, layer: VisualizerHandle) -> bool {
        self.visualizers.add(layer, &mut self.scene)
    }

    pub fn remove_visualizer(&mut self, layer: &VisualizerHandle) -> bool {
        self.visualizers.remove(layer)
    }

    pub fn dispose_all_visualizers(&mut self) {
        self.visualizers.dispose_all();
    }

    // MARK: - Visual attributes

    /// Packed xyz world-space positions, 3 per point
    pub fn set_point_positions(&mut self, positions: Vec<f32>) {
        self.visualizers.set_point_positions(positions);
    }

    pub fn point_positions(&self) -> &[f32] {
        self.visualizers.point_positions()
    }

    /// Packed RGB, 3 per point
    pub fn set_point_colors(&mut self, colors: Vec<f32>) {
        self.point_colors = colors;
    }

    pub fn point_colors(&self) -> &[f32] {
        &self.point_colors
    }

    pub fn set_point_scale_factors(&mut self, scale_factors: Vec<f32>) {
        self.point_scale_factors = scale_factors;
    }

    pub fn point_scale_factors(&self) -> &[f32] {
        &self.point_scale_factors
    }

    pub fn set_labels(&mut self, labels: Option<LabelRenderParams>) {
        self.labels = labels;
    }

    pub fn labels(&self) -> Option<&LabelRenderParams> {
        self.labels.as_ref()
    }

    pub fn set_polyline_colors(&mut self, colors: BTreeMap<usize, Vec<f32>>) {
        self.polyline_colors = colors;
    }

    pub fn polyline_colors(&self) -> &BTreeMap<usize, Vec<f32>> {
        &self.polyline_colors
    }

    pub fn set_polyline_opacities(&mut self, opacities: Vec<f32>) {
        self.polyline_opacities = opacities;
    }

    pub fn polyline_opacities(&self) -> &[f32] {
        &self.polyline_opacities
    }

    pub fn set_polyline_widths(&mut self, widths: Vec<f32>) {
        self.polyline_widths = widths;
    }

    pub fn polyline_widths(&self) -> &[f32] {
        &self.polyline_widths
    }

    // MARK: - Rendering

    fn render_context(&self) -> RenderContext<'_> {
        let near_far_point_extent =
            get_near_far_point_distances(self.visualizers.point_positions(), self.camera.position, self.camera.target);
        RenderContext {
            camera: &self.camera,
            camera_type: self.camera.projection,
            camera_target: self.camera.target,
            screen_width: self.width,
            screen_height: self.height,
            near_far_point_extent,
            background_color: self.config.styles.background_color,
            point_colors: &self.point_colors,
            point_scale_factors: &self.point_scale_factors,
            labels: self.labels.as_ref(),
            polyline_colors: &self.polyline_colors,
            polyline_opacities: &self.polyline_opacities,
            polyline_widths: &self.polyline_widths,
        }
    }

    /// Render one frame: every layer in order, then the surface
    pub fn render(&mut self) {
        self.scene.follow_camera(self.camera.position);
        let context = self.render_context();
        self.visualizers.render(&context);
        self.surface.draw(&self.scene, &self.camera);
    }

    /// Run the picking pass on every layer
    pub fn picking_render(&mut self) {
        let context = self.render_context();
        self.visualizers.picking_render(&context);
    }

    /// The viewport changed size
    pub fn resize(&mut self, width: u32, height: u32) {
        let old = (self.width, self.height);
        let new = (width.max(1), height.max(1));
        self.camera.resize(old, new);
        (self.width, self.height) = new;

        self.surface.set_size(new.0, new.1, self.config.styles.pixel_ratio);
        self.visualizers.resize(new.0, new.1);
        self.render();
    }

    // MARK: - Interaction

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        if self.interaction.set_mode(mode) {
            self.apply_mode(mode);
        }
    }

    pub fn set_select_enabled(&mut self, enabled: bool) {
        self.interaction.select_enabled = enabled;
    }

    pub fn set_selection_tool(&mut self, tool: SelectionTool) {
        self.interaction.set_selection_tool(tool);
    }

    fn apply_mode(&mut self, mode: InteractionMode) {
        self.controls.enabled = mode == InteractionMode::Navigate;
        if mode == InteractionMode::Navigate {
            self.render();
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) {
        if event.key == Key::Control && self.scene_is_3d() {
            self.controls.sync_button_roles(event.pressed);
        }
        if let Some(mode) = self.interaction.handle_key(event) {
            self.apply_mode(mode);
        }
    }

    /// Feed a pointer event through the controls and the state machine.
    ///
    /// Hover and selection listeners are notified here; the outcome is also
    /// returned so a caller can resolve it further.
    pub fn handle_mouse(&mut self, event: &MouseEvent) -> Option<InteractionOutcome> {
        let outcome = match *event {
            MouseEvent::Press { button, x, y, modifiers } => {
                let at = ScreenPoint::new(x, y);
                self.interaction.mouse_down(at);
                if !self.interaction.is_selecting() {
                    if self.controls.sync_button_roles(modifiers.ctrl) {
                        debug!(ctrl = modifiers.ctrl, "mouse button roles were out of sync, corrected");
                    }
                    if let Some(control_event) = self.controls.pointer_down(button, at) {
                        self.dispatch_control_event(control_event);
                    }
                }
                None
            }
            MouseEvent::Move { x, y, .. } => {
                let at = ScreenPoint::new(x, y);
                let outcome = self.interaction.mouse_move(at);
                if self.controls.is_dragging() {
                    let viewport = (self.width, self.height);
                    if let Some(control_event) = self.controls.pointer_move(at, &mut self.camera, viewport) {
                        self.dispatch_control_event(control_event);
                    }
                }
                outcome
            }
            MouseEvent::Release { x, y, .. } => {
                if let Some(control_event) = self.controls.pointer_up() {
                    self.dispatch_control_event(control_event);
                }
                self.interaction.mouse_up(ScreenPoint::new(x, y))
            }
            MouseEvent::Scroll { delta_y, .. } => {
                for control_event in self.controls.wheel(delta_y, &mut self.camera) {
                    self.dispatch_control_event(control_event);
                }
                None
            }
            MouseEvent::Enter { .. } | MouseEvent::Leave => self.interaction.mouse_leave(),
        };

        match &outcome {
            Some(InteractionOutcome::Hover(point)) => {
                for listener in self.hover_listeners.iter_mut() {
                    listener(*point);
                }
            }
            Some(InteractionOutcome::Select(region)) => {
                for listener in self.select_listeners.iter_mut() {
                    listener(region);
                }
            }
            _ => {}
        }
        outcome
    }

    fn dispatch_control_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Start => {
                self.stop_orbit_animation();
                let (position, target) = (self.camera.position, self.camera.target);
                for listener in self.camera_move_listeners.iter_mut() {
                    listener(position, target);
                }
            }
            ControlEvent::Change => self.render(),
            ControlEvent::End => {}
        }
    }

    /// Indices of the points whose screen projection falls inside `region`
    pub fn points_in_region(&self, region: &SelectionRegion) -> Vec<usize> {
        self.visualizers
            .point_positions()
            .chunks_exact(3)
            .enumerate()
            .filter_map(|(index, p)| {
                let ndc = self.camera.project([p[0], p[1], p[2]]);
                if !(-1.0..=1.0).contains(&ndc[2]) {
                    return None;
                }
                let screen = ScreenPoint::new(
                    (ndc[0] + 1.0) / 2.0 * self.width as f32,
                    (1.0 - ndc[1]) / 2.0 * self.height as f32,
                );
                region.contains(screen).then_some(index)
            })
            .collect()
    }

    // MARK: - Listeners

    pub fn on_hover(&mut self, listener: impl FnMut(Option<ScreenPoint>) + 'static) {
        self.hover_listeners.push(Box::new(listener));
    }

    pub fn on_select(&mut self, listener: impl FnMut(&SelectionRegion) + 'static) {
        self.select_listeners.push(Box::new(listener));
    }

    pub fn on_camera_move(&mut self, listener: impl FnMut(Vec3, Vec3) + 'static) {
        self.camera_move_listeners.push(Box::new(listener));
    }
}

impl Drop for ScatterPlot {
    fn drop(&mut self) {
        self.stop_orbit_animation();
    }
}

fn build_camera(descriptor: &CameraDescriptor, width: u32, height: u32) -> (Camera, OrbitControls) {
    let mut camera = Camera::from_descriptor(descriptor, width, height);
    let controls = OrbitControls::new(!descriptor.orthographic);
    controls.clamp_distance(&mut camera);
    (camera, controls)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::FrameQueue;
    use crate::input::{Modifiers, MouseButton};
    use crate::render::NullSurface;

    fn plot() -> (ScatterPlot, Rc<RefCell<NullSurface>>, Rc<RefCell<FrameQueue>>) {
        let surface = Rc::new(RefCell::new(NullSurface::new()));
        let frames = Rc::new(RefCell::new(FrameQueue::new()));
        let plot = ScatterPlot::new(
            ScatterPlotConfig::default(),
            800,
            600,
            Box::new(surface.clone()),
            Box::new(frames.clone()),
        )
        .unwrap();
        (plot, surface, frames)
    }

    #[test]
    fn test_new_plot_is_3d_with_axes() {
        let (plot, surface, _) = plot();
        assert_eq!(plot.dimensions(), Dimensions::Three);
        assert!(!plot.camera().is_orthographic());
        assert!(plot.scene().contains(AXES_OBJECT_NAME));
        assert_eq!(surface.borrow().size, (800, 600));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScatterPlotConfig::default();
        config.styles.pixel_ratio = 0.0;
        let result = ScatterPlot::new(
            config,
            10,
            10,
            Box::new(NullSurface::new()),
            Box::new(FrameQueue::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_set_dimensions_switches_camera() {
        let (mut plot, _, _) = plot();
        plot.set_dimensions(2).unwrap();
        assert!(plot.camera().is_orthographic());
        assert!(!plot.scene().contains(AXES_OBJECT_NAME));
        assert!(plot.set_dimensions(4).is_err());
        assert_eq!(plot.dimensions(), Dimensions::Two);
    }

    #[test]
    fn test_orbit_animation_only_in_3d() {
        let (mut plot, _, frames) = plot();
        plot.set_dimensions(2).unwrap();
        plot.start_orbit_animation();
        assert!(!plot.orbit_is_animating());
        assert!(frames.borrow().pending().is_empty());
    }

    #[test]
    fn test_stale_frame_ignored() {
        let (mut plot, _, frames) = plot();
        plot.start_orbit_animation();
        let first = frames.borrow_mut().take_pending()[0];
        assert!(plot.on_animation_frame(first, 0.1));

        // The first id is spent; only the freshly requested one advances
        assert!(!plot.on_animation_frame(first, 0.1));
        let pending = frames.borrow().pending();
        assert_eq!(pending.len(), 1);
        assert!(plot.on_animation_frame(pending[0], 0.1));
    }

    #[test]
    fn test_render_draws_surface_and_moves_light() {
        let (mut plot, surface, _) = plot();
        plot.render();
        assert_eq!(surface.borrow().draw_count, 1);
        let position = plot.camera_position();
        assert_eq!(plot.scene().light.position[0], position[0] + 1.0);
    }

    #[test]
    fn test_control_start_stops_animation_before_listeners() {
        let (mut plot, _, _) = plot();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        plot.on_camera_move(move |position, _target| sink.borrow_mut().push(position));

        plot.start_orbit_animation();
        plot.handle_mouse(&MouseEvent::press(MouseButton::Left, 10.0, 10.0));
        assert!(!plot.orbit_is_animating());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_ctrl_key_swaps_roles_in_3d() {
        let (mut plot, _, _) = plot();
        plot.handle_key(&KeyEvent::pressed(Key::Control, Modifiers::new().with_ctrl()));
        assert_eq!(plot.controls().mouse_buttons.orbit, MouseButton::Right);
        plot.handle_key(&KeyEvent::released(Key::Control, Modifiers::new()));
        assert_eq!(plot.controls().mouse_buttons.orbit, MouseButton::Left);
    }

    #[test]
    fn test_shift_disables_navigation() {
        let (mut plot, _, _) = plot();
        plot.handle_key(&KeyEvent::pressed(Key::Shift, Modifiers::new().with_shift()));
        assert_eq!(plot.interaction_mode(), InteractionMode::RectSelect);
        assert!(!plot.controls().enabled);

        plot.handle_key(&KeyEvent::released(Key::Shift, Modifiers::new()));
        assert!(plot.controls().enabled);
    }

    #[test]
    fn test_points_in_region() {
        let (mut plot, _, _) = plot();
        plot.set_dimensions(2).unwrap();
        // Origin lands in the viewport center, the other point far right
        plot.set_point_positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let region = SelectionRegion::BoundingBox(crate::selector::ScreenBoundingBox {
            x: 390.0,
            y: 290.0,
            width: 20.0,
            height: 20.0,
        });
        assert_eq!(plot.points_in_region(&region), vec![0]);
    }
}
