//! Data to visual mapping
//!
//! [`Projector`] turns the current [`Projection`] plus the selection and
//! hover state into the arrays the scatter plot renders with:
//!
//! - **Positions**: every axis mapped into the render cube, z = 0 in 2D
//! - **Colors**: base or legend color, then unselected, selected and hover
//! - **Scale factors**: default, selected boost, hover boost
//! - **Labels and polylines**: visible label params, per-sequence colors,
//!   opacities and widths
//!
//! Every generator allocates a fresh array sized for the current point
//! count. Extents are recomputed from the projection on each call.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::CUBE_LENGTH;
use crate::dataset::{Dimensions, Projection};
use crate::error::{ScatterError, ScatterResult};
use crate::input::{KeyEvent, MouseEvent};
use crate::interaction::InteractionOutcome;
use crate::render::LabelRenderParams;
use crate::scatter_plot::ScatterPlot;
use crate::selector::SelectionRegion;
use crate::types::ColorRgb;
use crate::util::{extent, scale_linear};

/// Caller-supplied color policy, evaluated per point index
pub type LegendPointColorer = Box<dyn Fn(usize) -> ColorRgb>;

/// Called with the hovered point index, or `None`
pub type HoverCallback = Box<dyn FnMut(Option<usize>)>;

/// Called with the selected indices and the region that produced them.
/// A clearing click reports no indices and no region.
pub type SelectCallback = Box<dyn FnMut(&[usize], Option<&SelectionRegion>)>;

/// What a sprite layer needs to draw the projection's images
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteAtlas {
    pub sprite_image: String,
    pub single_sprite_size: [u32; 2],
    /// Atlas cell for each projected point
    pub sprite_indices: Vec<usize>,
}

pub struct Projector {
    scatter_plot: ScatterPlot,
    projection: Option<Rc<Projection>>,
    label_point_accessor: Option<String>,
    render_labels_in_3d: bool,
    legend_point_colorer: Option<LegendPointColorer>,
    selected_point_indices: Vec<usize>,
    hover_point_index: Option<usize>,
    hover_callbacks: Vec<HoverCallback>,
    select_callbacks: Vec<SelectCallback>,
}

impl Projector {
    pub fn new(scatter_plot: ScatterPlot) -> Self {
        Self {
            scatter_plot,
            projection: None,
            label_point_accessor: None,
            render_labels_in_3d: false,
            legend_point_colorer: None,
            selected_point_indices: Vec::new(),
            hover_point_index: None,
            hover_callbacks: Vec::new(),
            select_callbacks: Vec::new(),
        }
    }

    pub fn scatter_plot(&self) -> &ScatterPlot {
        &self.scatter_plot
    }

    pub fn scatter_plot_mut(&mut self) -> &mut ScatterPlot {
        &mut self.scatter_plot
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_deref()
    }

    fn point_count(&self) -> usize {
        self.projection.as_ref().map_or(0, |p| p.len())
    }

    /// Swap in a new projection.
    ///
    /// Selection and hover are cleared when they no longer fit the new
    /// point count.
    pub fn set_projection(&mut self, projection: Option<Rc<Projection>>) {
        self.projection = projection;
        let count = self.point_count();
        let stale = self.selected_point_indices.iter().any(|&i| i >= count)
            || self.hover_point_index.is_some_and(|i| i >= count);
        if stale {
            debug!(count, "selection no longer fits projection, clearing");
            self.selected_point_indices.clear();
            self.hover_point_index = None;
        }
    }

    /// Install `projection` and bring the scatter plot fully up to date
    pub fn update_scatter_plot_with_new_projection(
        &mut self,
        projection: Option<Rc<Projection>>,
        can_be_rendered: bool,
    ) -> ScatterResult<()> {
        let Some(projection) = projection else {
            self.set_projection(None);
            self.scatter_plot.set_point_positions(Vec::new());
            self.scatter_plot.set_point_colors(Vec::new());
            self.scatter_plot.set_point_scale_factors(Vec::new());
            self.scatter_plot.set_labels(None);
            self.scatter_plot.render();
            return Ok(());
        };

        let dimensions = projection.components;
        self.set_projection(Some(projection));
        self.scatter_plot.set_dimensions(dimensions.count())?;
        if can_be_rendered {
            self.update_scatter_plot_attributes();
            self.update_scatter_plot_positions();
            self.scatter_plot.render();
        }
        self.scatter_plot.set_camera_parameters_for_next_camera_creation(None, false);
        Ok(())
    }

    pub fn set_legend_point_colorer(&mut self, colorer: Option<LegendPointColorer>) {
        self.legend_point_colorer = colorer;
    }

    /// Metadata key used for label text
    pub fn set_label_point_accessor(&mut self, accessor: Option<String>) {
        self.label_point_accessor = accessor;
    }

    pub fn label_point_accessor(&self) -> Option<&str> {
        self.label_point_accessor.as_deref()
    }

    pub fn set_3d_label_mode(&mut self, render_labels_in_3d: bool) {
        self.render_labels_in_3d = render_labels_in_3d;
        self.update_scatter_plot_attributes();
        self.scatter_plot.render();
    }

    pub fn is_3d_label_mode(&self) -> bool {
        self.render_labels_in_3d
    }

    /// True when the projection carries a sprite image
    pub fn sprite_image_mode(&self) -> bool {
        self.projection
            .as_ref()
            .and_then(|p| p.sprite_and_metadata_info.as_ref())
            .is_some_and(|info| info.sprite_image.is_some())
    }

    /// Sprite atlas for the current projection, if it has a complete one
    pub fn sprite_atlas(&self) -> Option<SpriteAtlas> {
        let projection = self.projection.as_ref()?;
        let info = projection.sprite_and_metadata_info.as_ref()?;
        let sprite_image = info.sprite_image.clone()?;
        let metadata = info.sprite_metadata.as_ref()?;
        Some(SpriteAtlas {
            sprite_image,
            single_sprite_size: metadata.single_sprite_size,
            sprite_indices: projection.points.iter().map(|p| p.index).collect(),
        })
    }

    // MARK: - Selection and hover

    pub fn selected_point_indices(&self) -> &[usize] {
        &self.selected_point_indices
    }

    pub fn hover_point_index(&self) -> Option<usize> {
        self.hover_point_index
    }

    fn check_index(&self, index: usize) -> ScatterResult<()> {
        let count = self.point_count();
        if index >= count {
            return Err(ScatterError::PointIndexOutOfRange { index, count });
        }
        Ok(())
    }

    /// Replace the selection wholesale, then refresh and render
    pub fn set_selected_point_indices(&mut self, indices: Vec<usize>) -> ScatterResult<()> {
        for &index in &indices {
            self.check_index(index)?;
        }
        self.selected_point_indices = indices;
        self.update_scatter_plot_attributes();
        self.scatter_plot.render();
        Ok(())
    }

    /// Set the hovered point. Hover callbacks run when the index changes.
    pub fn set_hover_point_index(&mut self, index: Option<usize>) -> ScatterResult<()> {
        if let Some(index) = index {
            self.check_index(index)?;
        }
        if self.hover_point_index == index {
            return Ok(());
        }
        self.hover_point_index = index;
        for callback in self.hover_callbacks.iter_mut() {
            callback(index);
        }
        self.update_scatter_plot_attributes();
        self.scatter_plot.render();
        Ok(())
    }

    pub fn on_hover(&mut self, callback: impl FnMut(Option<usize>) + 'static) {
        self.hover_callbacks.push(Box::new(callback));
    }

    pub fn on_select(&mut self, callback: impl FnMut(&[usize], Option<&SelectionRegion>) + 'static) {
        self.select_callbacks.push(Box::new(callback));
    }

    fn notify_select(&mut self, region: Option<&SelectionRegion>) {
        let indices = &self.selected_point_indices;
        for callback in self.select_callbacks.iter_mut() {
            callback(indices, region);
        }
    }

    // MARK: - Input

    pub fn handle_key(&mut self, event: &KeyEvent) {
        self.scatter_plot.handle_key(event);
    }

    /// Route a pointer event through the scatter plot and resolve the result
    /// to point indices.
    ///
    /// Raw hover positions are handed back unresolved; leaving the viewport
    /// clears the hovered index.
    pub fn handle_mouse(&mut self, event: &MouseEvent) -> Option<InteractionOutcome> {
        let outcome = self.scatter_plot.handle_mouse(event);
        match &outcome {
            Some(InteractionOutcome::Hover(None)) => {
                if self.hover_point_index.is_some() {
                    self.hover_point_index = None;
                    for callback in self.hover_callbacks.iter_mut() {
                        callback(None);
                    }
                    self.update_scatter_plot_attributes();
                    self.scatter_plot.render();
                }
            }
            Some(InteractionOutcome::Select(region)) => {
                self.selected_point_indices = self.scatter_plot.points_in_region(region);
                self.update_scatter_plot_attributes();
                self.scatter_plot.render();
                self.notify_select(Some(region));
            }
            Some(InteractionOutcome::Click(_)) => {
                if !self.selected_point_indices.is_empty() {
                    self.selected_point_indices.clear();
                    self.update_scatter_plot_attributes();
                    self.scatter_plot.render();
                }
                self.notify_select(None);
            }
            Some(InteractionOutcome::Hover(Some(_))) | None => {}
        }
        outcome
    }

    // MARK: - Pushing arrays to the scatter plot

    pub fn update_scatter_plot_positions(&mut self) {
        let positions = self.generate_point_position_array();
        self.scatter_plot.set_point_positions(positions);
    }

    pub fn update_scatter_plot_attributes(&mut self) {
        if self.projection.is_none() {
            return;
        }
        let selected = &self.selected_point_indices;
        let hover = self.hover_point_index;
        let colorer = self.legend_point_colorer.as_deref();

        let colors =
            self.generate_point_color_array(colorer, selected, hover, self.render_labels_in_3d, self.sprite_image_mode());
        let scale_factors = self.generate_point_scale_factor_array(selected, hover);
        let labels = self.generate_visible_label_render_params(selected, hover);
        let polyline_colors = self.generate_line_segment_color_map(colorer);
        let polyline_opacities = self.generate_line_segment_opacity_array(selected);
        let polyline_widths = self.generate_line_segment_width_array(selected);

        self.scatter_plot.set_point_colors(colors);
        self.scatter_plot.set_point_scale_factors(scale_factors);
        self.scatter_plot.set_labels((!labels.is_empty()).then_some(labels));
        self.scatter_plot.set_polyline_colors(polyline_colors);
        self.scatter_plot.set_polyline_opacities(polyline_opacities);
        self.scatter_plot.set_polyline_widths(polyline_widths);
    }

    pub fn render(&mut self) {
        self.scatter_plot.render();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scatter_plot.resize(width, height);
    }

    // MARK: - Generators

    /// Packed xyz positions inside the render cube
    pub fn generate_point_position_array(&self) -> Vec<f32> {
        let Some(projection) = self.projection.as_ref() else {
            return Vec::new();
        };
        let half = f64::from(CUBE_LENGTH) / 2.0;
        let range = [-half, half];
        let is_3d = projection.components == Dimensions::Three;

        let axis_extent = |axis: usize| extent((0..projection.len()).map(|i| projection.coordinate(i, axis)));
        let x_extent = axis_extent(0);
        let y_extent = axis_extent(1);
        let z_extent = if is_3d { axis_extent(2) } else { Default::default() };

        let mut positions = Vec::with_capacity(projection.len() * 3);
        for i in 0..projection.len() {
            positions.push(scale_linear(projection.coordinate(i, 0), x_extent, range) as f32);
            positions.push(scale_linear(projection.coordinate(i, 1), y_extent, range) as f32);
            if is_3d {
                positions.push(scale_linear(projection.coordinate(i, 2), z_extent, range) as f32);
            } else {
                positions.push(0.0);
            }
        }
        positions
    }

    /// One scale factor per point. Hover overrides the selected boost.
    pub fn generate_point_scale_factor_array(&self, selected: &[usize], hover: Option<usize>) -> Vec<f32> {
        let style = &self.scatter_plot.config().points;
        let mut scale = vec![style.scale_default; self.point_count()];

        for &index in selected {
            if let Some(s) = scale.get_mut(index) {
                *s = style.scale_selected;
            }
        }
        if let Some(s) = hover.and_then(|index| scale.get_mut(index)) {
            *s = style.scale_hover;
        }
        scale
    }

    /// Packed RGB per point.
    ///
    /// Precedence, lowest first: base color (legend colorer if set), the
    /// unselected color whenever anything is selected, the selected color,
    /// the hover color. Label and sprite modes only swap the two base colors.
    pub fn generate_point_color_array(
        &self,
        legend_point_colorer: Option<&dyn Fn(usize) -> ColorRgb>,
        selected: &[usize],
        hover: Option<usize>,
        label_3d_mode: bool,
        sprite_image_mode: bool,
    ) -> Vec<f32> {
        let style = &self.scatter_plot.config().points;
        let n = self.point_count();
        let mut colors = vec![0.0; n * 3];

        let (mut unselected, mut no_selection) = (style.unselected, style.no_selection);
        if label_3d_mode {
            (unselected, no_selection) = (style.labels_3d_unselected, style.labels_3d_no_selection);
        }
        if sprite_image_mode {
            (unselected, no_selection) = (style.sprite_unselected, style.sprite_no_selection);
        }

        if !selected.is_empty() {
            for i in 0..n {
                unselected.write_to(&mut colors, i);
            }
        } else if let Some(colorer) = legend_point_colorer {
            for i in 0..n {
                colorer(i).write_to(&mut colors, i);
            }
        } else {
            for i in 0..n {
                no_selection.write_to(&mut colors, i);
            }
        }

        for &index in selected {
            style.selected.write_to(&mut colors, index);
        }
        if let Some(index) = hover {
            style.hover.write_to(&mut colors, index);
        }
        colors
    }

    fn label_text(&self, projection: &Projection, index: usize, accessor: Option<&str>) -> String {
        accessor
            .and_then(|key| projection.points.get(index)?.metadata.get(key))
            .map(|value| value.to_string())
            .unwrap_or_else(|| index.to_string())
    }

    /// Label text for every point, read from the metadata key `accessor`
    pub fn generate_3d_labels_array(&self, accessor: Option<&str>) -> Vec<String> {
        match (self.projection.as_ref(), accessor) {
            (Some(projection), Some(_)) => (0..projection.len())
                .map(|i| self.label_text(projection, i, accessor))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Labels for the hovered point and the selection, hover first
    pub fn generate_visible_label_render_params(&self, selected: &[usize], hover: Option<usize>) -> LabelRenderParams {
        let style = &self.scatter_plot.config().labels;
        let mut params = LabelRenderParams {
            default_font_size: style.font_size,
            ..Default::default()
        };
        let Some(projection) = self.projection.as_ref() else {
            return params;
        };
        let accessor = self.label_point_accessor.as_deref();
        let count = projection.len();

        let mut push = |index: usize, scale: f32, fill: ColorRgb, stroke: ColorRgb, scene_opacity: bool| {
            if index >= count || params.len() >= style.max_visible {
                return;
            }
            params.point_indices.push(index);
            params.label_strings.push(self.label_text(projection, index, accessor));
            params.scale_factors.push(scale);
            params.use_scene_opacity_flags.push(scene_opacity);
            params.fill_colors.push(fill);
            params.stroke_colors.push(stroke);
        };

        if let Some(index) = hover {
            push(index, style.scale_large, style.fill_hover, style.stroke_hover, false);
        }

        let lone = selected.len() == 1;
        let scale = if lone { style.scale_large } else { style.scale_default };
        for &index in selected.iter().filter(|&&i| Some(i) != hover) {
            push(index, scale, style.fill_selected, style.stroke_selected, !lone);
        }
        params
    }

    /// Colors for every polyline vertex pair, keyed by sequence index.
    ///
    /// Uses the legend colorer when set, otherwise a hue gradient along the
    /// sequence.
    pub fn generate_line_segment_color_map(
        &self,
        legend_point_colorer: Option<&dyn Fn(usize) -> ColorRgb>,
    ) -> BTreeMap<usize, Vec<f32>> {
        let mut map = BTreeMap::new();
        let Some(projection) = self.projection.as_ref() else {
            return map;
        };
        let style = &self.scatter_plot.config().polylines;

        for (sequence_index, sequence) in projection.sequences.iter().enumerate() {
            let indices = &sequence.point_indices;
            let total = indices.len();
            let mut colors = vec![0.0; sequence.segment_count() * 2 * 3];

            for j in 0..sequence.segment_count() {
                let (c1, c2) = match legend_point_colorer {
                    Some(colorer) => (colorer(indices[j]), colorer(indices[j + 1])),
                    None => {
                        let hue = |k: usize| {
                            style.start_hue + (style.end_hue - style.start_hue) * k as f32 / total as f32
                        };
                        (
                            ColorRgb::from_hsl(hue(j), style.saturation, style.lightness),
                            ColorRgb::from_hsl(hue(j + 1), style.saturation, style.lightness),
                        )
                    }
                };
                c1.write_to(&mut colors, 2 * j);
                c2.write_to(&mut colors, 2 * j + 1);
            }
            map.insert(sequence_index, colors);
        }
        map
    }

    fn sequences_touching(&self, selected: &[usize]) -> Vec<bool> {
        self.projection.as_ref().map_or_else(Vec::new, |projection| {
            projection
                .sequences
                .iter()
                .map(|s| s.point_indices.iter().any(|i| selected.contains(i)))
                .collect()
        })
    }

    /// One opacity per sequence; sequences through a selected point stand out
    pub fn generate_line_segment_opacity_array(&self, selected: &[usize]) -> Vec<f32> {
        let style = &self.scatter_plot.config().polylines;
        let any_selected = !selected.is_empty();
        self.sequences_touching(selected)
            .into_iter()
            .map(|touched| match (any_selected, touched) {
                (false, _) => style.default_opacity,
                (true, true) => style.selected_opacity,
                (true, false) => style.deselected_opacity,
            })
            .collect()
    }

    /// One line width per sequence
    pub fn generate_line_segment_width_array(&self, selected: &[usize]) -> Vec<f32> {
        let style = &self.scatter_plot.config().polylines;
        self.sequences_touching(selected)
            .into_iter()
            .map(|touched| if touched { style.selected_width } else { style.default_width })
            .collect()
    }
}
