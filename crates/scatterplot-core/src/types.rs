//! Common types for scatterplot-core
//!
//! Small value types shared by the camera, interaction and mapping layers.
//! World-space vectors stay as plain `[f32; 3]` arrays so they can be packed
//! straight into render buffers.

use serde::{Deserialize, Serialize};

/// 3D vector type
pub type Vec3 = [f32; 3];

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// A pointer position in viewport pixels (origin top-left)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_array(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl From<[f32; 2]> for ScreenPoint {
    fn from(arr: [f32; 2]) -> Self {
        Self { x: arr[0], y: arr[1] }
    }
}

impl From<(f32, f32)> for ScreenPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// An RGB color represented as three f32 values (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Create from hex color (e.g., 0x1a1a1a)
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Create from hue (degrees), saturation and lightness (0-1)
    pub fn from_hsl(hue_degrees: f32, saturation: f32, lightness: f32) -> Self {
        let h = (hue_degrees / 360.0).rem_euclid(1.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::new(l, l, l);
        }

        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Self {
            r: hue_to_rgb(p, q, h + 1.0 / 3.0),
            g: hue_to_rgb(p, q, h),
            b: hue_to_rgb(p, q, h - 1.0 / 3.0),
        }
    }

    /// Write the three channels into slot `index` of a packed color buffer
    pub fn write_to(&self, buffer: &mut [f32], index: usize) {
        if let Some(slot) = buffer.get_mut(index * 3..index * 3 + 3) {
            slot.copy_from_slice(&self.to_array());
        }
    }

    /// Common colors
    pub fn black() -> Self { Self { r: 0.0, g: 0.0, b: 0.0 } }
    pub fn white() -> Self { Self { r: 1.0, g: 1.0, b: 1.0 } }
}

impl Default for ColorRgb {
    fn default() -> Self {
        Self::white()
    }
}

impl From<[f32; 3]> for ColorRgb {
    fn from(arr: [f32; 3]) -> Self {
        Self { r: arr[0], g: arr[1], b: arr[2] }
    }
}

impl From<ColorRgb> for [f32; 3] {
    fn from(c: ColorRgb) -> Self {
        [c.r, c.g, c.b]
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
