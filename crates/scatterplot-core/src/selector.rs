//! Screen-space selection regions
//!
//! The rectangle selector tracks one drag at a time and turns it into a
//! [`SelectionRegion`] when the pointer is released:
//!
//! - **Rectangle**: the normalized bounding box of the drag
//! - **Lasso**: the polygon traced by the pointer

use serde::{Deserialize, Serialize};

use crate::types::ScreenPoint;

/// Which shape a selection drag produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionTool {
    #[default]
    Rectangle,
    Lasso,
}

/// Axis-aligned box in screen pixels, origin at the top-left corner.
///
/// Width and height are never negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenBoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenBoundingBox {
    /// Box spanned by two opposite corners, in any order
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.x && point.x <= self.x + self.width && point.y >= self.y && point.y <= self.y + self.height
    }
}

/// A finished selection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectionRegion {
    BoundingBox(ScreenBoundingBox),
    Lasso(Vec<ScreenPoint>),
}

impl SelectionRegion {
    /// Test if a screen point falls inside the region
    pub fn contains(&self, point: ScreenPoint) -> bool {
        match self {
            SelectionRegion::BoundingBox(bbox) => bbox.contains(point),
            SelectionRegion::Lasso(vertices) => {
                if vertices.len() < 3 {
                    return false;
                }
                // Even-odd rule
                let n = vertices.len();
                let mut inside = false;
                let mut j = n - 1;
                for i in 0..n {
                    let (xi, yi) = (vertices[i].x, vertices[i].y);
                    let (xj, yj) = (vertices[j].x, vertices[j].y);
                    if ((yi > point.y) != (yj > point.y)) && (point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi) {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }
}

#[derive(Clone, Debug)]
struct ActiveDrag {
    start: ScreenPoint,
    current: ScreenPoint,
    path: Vec<ScreenPoint>,
}

/// Tracks a selection drag from press to release
#[derive(Clone, Debug, Default)]
pub struct RectangleSelector {
    tool: SelectionTool,
    active: Option<ActiveDrag>,
}

impl RectangleSelector {
    pub fn new(tool: SelectionTool) -> Self {
        Self { tool, active: None }
    }

    pub fn tool(&self) -> SelectionTool {
        self.tool
    }

    /// Switch tools. Any drag in progress is discarded.
    pub fn set_tool(&mut self, tool: SelectionTool) {
        self.tool = tool;
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn begin(&mut self, at: ScreenPoint) {
        self.active = Some(ActiveDrag {
            start: at,
            current: at,
            path: vec![at],
        });
    }

    pub fn extend(&mut self, to: ScreenPoint) {
        if let Some(drag) = self.active.as_mut() {
            drag.current = to;
            if self.tool == SelectionTool::Lasso && drag.path.last() != Some(&to) {
                drag.path.push(to);
            }
        }
    }

    /// The region the current drag would produce, for live feedback
    pub fn current_region(&self) -> Option<SelectionRegion> {
        self.active.as_ref().map(|drag| self.region_for(drag))
    }

    /// End the drag and hand back its region
    pub fn finish(&mut self) -> Option<SelectionRegion> {
        let drag = self.active.take()?;
        Some(self.region_for(&drag))
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    fn region_for(&self, drag: &ActiveDrag) -> SelectionRegion {
        match self.tool {
            SelectionTool::Rectangle => {
                SelectionRegion::BoundingBox(ScreenBoundingBox::from_corners(drag.start, drag.current))
            }
            SelectionTool::Lasso => SelectionRegion::Lasso(drag.path.clone()),
        }
    }
}
