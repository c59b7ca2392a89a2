//! Configuration for scatterplot-core
//!
//! Styling and behavior knobs for one scatter plot: point colors and scale
//! boosts, polyline styling, label styling and the starting camera. Every
//! section has defaults, so a config file only lists what it changes.

use serde::{Deserialize, Serialize};

use crate::camera::CameraParams;
use crate::error::{ConfigError, ConfigResult};
use crate::selector::SelectionTool;
use crate::types::ColorRgb;

/// Complete scatter plot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterPlotConfig {
    /// Whether holding shift arms the selection tool
    pub select_enabled: bool,
    /// Shape produced by a selection drag
    pub selection_tool: SelectionTool,
    /// Canvas styling
    pub styles: Styles,
    /// Point colors and scale factors
    pub points: PointStyle,
    /// Sequence (polyline) styling
    pub polylines: PolylineStyle,
    /// Visible label styling
    pub labels: LabelStyle,
    /// Overrides for the first camera
    pub camera: CameraParams,
}

impl Default for ScatterPlotConfig {
    fn default() -> Self {
        Self {
            select_enabled: true,
            selection_tool: SelectionTool::Rectangle,
            styles: Styles::default(),
            points: PointStyle::default(),
            polylines: PolylineStyle::default(),
            labels: LabelStyle::default(),
            camera: CameraParams::default(),
        }
    }
}

/// Canvas styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Styles {
    pub background_color: ColorRgb,
    /// Show the axes helper in 3D
    pub axes_visible: bool,
    /// Device pixels per CSS pixel
    pub pixel_ratio: f32,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            background_color: ColorRgb::from_hex(0xffffff),
            axes_visible: true,
            pixel_ratio: 1.0,
        }
    }
}

/// Point colors and scale factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// Every point while a selection exists
    pub unselected: ColorRgb,
    /// Every point when nothing is selected and no legend colorer is set
    pub no_selection: ColorRgb,
    pub selected: ColorRgb,
    pub hover: ColorRgb,
    pub labels_3d_unselected: ColorRgb,
    pub labels_3d_no_selection: ColorRgb,
    pub sprite_unselected: ColorRgb,
    pub sprite_no_selection: ColorRgb,
    pub scale_default: f32,
    pub scale_selected: f32,
    pub scale_hover: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            unselected: ColorRgb::from_hex(0xe3e3e3),
            no_selection: ColorRgb::from_hex(0x7575d9),
            selected: ColorRgb::from_hex(0xfa6666),
            hover: ColorRgb::from_hex(0x760b4f),
            labels_3d_unselected: ColorRgb::from_hex(0xffffff),
            labels_3d_no_selection: ColorRgb::from_hex(0xffffff),
            sprite_unselected: ColorRgb::from_hex(0xffffff),
            sprite_no_selection: ColorRgb::from_hex(0xffffff),
            scale_default: 1.0,
            scale_selected: 1.2,
            scale_hover: 1.2,
        }
    }
}

/// Polyline styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolylineStyle {
    /// Hue (degrees) at the first vertex of the default gradient
    pub start_hue: f32,
    /// Hue (degrees) the gradient approaches at the last vertex
    pub end_hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub default_opacity: f32,
    pub default_width: f32,
    pub selected_opacity: f32,
    pub selected_width: f32,
    pub deselected_opacity: f32,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            start_hue: 60.0,
            end_hue: 360.0,
            saturation: 1.0,
            lightness: 0.3,
            default_opacity: 0.2,
            default_width: 2.0,
            selected_opacity: 0.9,
            selected_width: 3.0,
            deselected_opacity: 0.05,
        }
    }
}

/// Visible label styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub font_size: f32,
    pub scale_default: f32,
    /// Scale for the hover label and a lone selected label
    pub scale_large: f32,
    pub fill_selected: ColorRgb,
    pub fill_hover: ColorRgb,
    pub stroke_selected: ColorRgb,
    pub stroke_hover: ColorRgb,
    /// Upper bound on labels drawn in one frame
    pub max_visible: usize,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            scale_default: 1.0,
            scale_large: 2.0,
            fill_selected: ColorRgb::from_hex(0x000000),
            fill_hover: ColorRgb::from_hex(0x000000),
            stroke_selected: ColorRgb::from_hex(0xffffff),
            stroke_hover: ColorRgb::from_hex(0xffffff),
            max_visible: 10_000,
        }
    }
}

impl ScatterPlotConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.styles.pixel_ratio > 0.0) {
            return Err(ConfigError::OutOfRange("pixel_ratio must be positive".to_string()));
        }

        let scales = [
            ("points.scale_default", self.points.scale_default),
            ("points.scale_selected", self.points.scale_selected),
            ("points.scale_hover", self.points.scale_hover),
            ("labels.scale_default", self.labels.scale_default),
            ("labels.scale_large", self.labels.scale_large),
            ("labels.font_size", self.labels.font_size),
            ("polylines.default_width", self.polylines.default_width),
            ("polylines.selected_width", self.polylines.selected_width),
        ];
        for (name, value) in scales {
            if !(value > 0.0) {
                return Err(ConfigError::OutOfRange(format!("{} must be positive", name)));
            }
        }

        let unit = [
            ("polylines.default_opacity", self.polylines.default_opacity),
            ("polylines.selected_opacity", self.polylines.selected_opacity),
            ("polylines.deselected_opacity", self.polylines.deselected_opacity),
            ("polylines.saturation", self.polylines.saturation),
            ("polylines.lightness", self.polylines.lightness),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(format!("{} must be between 0.0 and 1.0", name)));
            }
        }

        if self.polylines.start_hue > self.polylines.end_hue {
            return Err(ConfigError::OutOfRange(
                "polylines.start_hue must not exceed end_hue".to_string(),
            ));
        }

        if let Some(zoom) = self.camera.zoom {
            if !(zoom > 0.0) {
                return Err(ConfigError::OutOfRange("camera.zoom must be positive".to_string()));
            }
        }

        Ok(())
    }
}
