//! scatterplot-core - Interactive scatter plot engine for embedding projections
//!
//! This crate provides everything between a projected point set and a draw
//! call: camera handling, orbit navigation, selection interaction and the
//! mapping from data to per-point visual attributes. Actual drawing is left
//! to pluggable layers and a host-supplied draw surface.
//!
//! # Key Components
//!
//! - **ScatterPlot**: Owns the camera, controls, scene and layer registry, and
//!   routes keyboard and pointer input
//! - **Projector**: Maps a projection plus selection and hover state to
//!   positions, colors, scale factors, labels and polyline styling
//! - **Camera / OrbitControls**: Perspective (3D) or orthographic (2D) camera
//!   with rotate, pan, dolly and auto-rotate
//! - **InteractionState**: Navigate / select mode machine with rectangle and
//!   lasso selection
//! - **VisualizerRegistry**: Active rendering layers and their lifecycle
//!
//! # Modes
//!
//! - **Navigate**: Pointer drags move the camera, hover is reported
//! - **RectSelect**: Entered while shift is held; a drag produces a selection
//!   region

pub mod animation;
pub mod camera;
pub mod config;
pub mod controls;
pub mod dataset;
pub mod error;
pub mod input;
pub mod interaction;
pub mod projector;
pub mod render;
pub mod scatter_plot;
pub mod selector;
pub mod types;
pub mod util;
pub mod visualizer;

pub use animation::{FrameId, FrameQueue, FrameScheduler};
pub use camera::*;
pub use config::{LabelStyle, PointStyle, PolylineStyle, ScatterPlotConfig, Styles};
pub use controls::{ControlAction, ControlEvent, MouseButtonRoles, OrbitControls};
pub use dataset::*;
pub use error::*;
pub use input::*;
pub use interaction::{InteractionMode, InteractionOutcome, InteractionState};
pub use projector::{Projector, SpriteAtlas};
pub use scatter_plot::ScatterPlot;
pub use selector::*;
pub use types::*;
pub use util::*;
pub use visualizer::{ScatterPlotVisualizer, VisualizerHandle, VisualizerRegistry};

// render module exports the frame contract, access via render:: prefix
