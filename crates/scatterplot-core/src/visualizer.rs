//! Rendering layers and the registry that drives them
//!
//! Concrete layers (sprites, labels, polylines) live outside this crate. The
//! registry only knows the [`ScatterPlotVisualizer`] capability set and
//! guarantees each layer sees attach → resize → positions → render, in that
//! order, and is disposed exactly once.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::render::{RenderContext, Scene};

/// A pluggable rendering layer
pub trait ScatterPlotVisualizer {
    /// Stable identifier, used in logs
    fn id(&self) -> &str;

    /// Add whatever the layer draws to the scene
    fn attach_scene(&mut self, scene: &mut Scene);

    fn on_resize(&mut self, width: u32, height: u32);

    /// New packed xyz world-space positions, 3 per point
    fn on_point_positions_changed(&mut self, positions: &[f32]);

    fn on_render(&mut self, context: &RenderContext<'_>);

    /// Optional picking pass
    fn on_picking_render(&mut self, _context: &RenderContext<'_>) {}

    /// Release everything the layer holds. Called exactly once.
    fn dispose(&mut self);
}

/// Shared handle to a layer; the caller may keep a clone to talk to it
pub type VisualizerHandle = Rc<RefCell<dyn ScatterPlotVisualizer>>;

/// Handles are compared by identity, never by value
fn same_layer(a: &VisualizerHandle, b: &VisualizerHandle) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// Ordered set of active layers
#[derive(Default)]
pub struct VisualizerRegistry {
    layers: Vec<VisualizerHandle>,
    size: Option<(u32, u32)>,
    positions: Option<Vec<f32>>,
}

impl VisualizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[VisualizerHandle] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn contains(&self, layer: &VisualizerHandle) -> bool {
        self.layers.iter().any(|l| same_layer(l, layer))
    }

    /// Last positions pushed to the layers
    pub fn point_positions(&self) -> &[f32] {
        self.positions.as_deref().unwrap_or(&[])
    }

    /// Last viewport size pushed to the layers
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Replace the active set.
    ///
    /// Layers that drop out are disposed; layers that join are attached and
    /// brought up to date. Layers present in both sets are left alone. Order
    /// follows `layers`; repeated handles keep their first position.
    pub fn set_active(&mut self, layers: Vec<VisualizerHandle>, scene: &mut Scene) {
        let mut next: Vec<VisualizerHandle> = Vec::with_capacity(layers.len());
        for layer in layers {
            if next.iter().any(|l| same_layer(l, &layer)) {
                warn!(id = layer.borrow().id(), "duplicate visualizer ignored");
                continue;
            }
            next.push(layer);
        }

        for old in &self.layers {
            if !next.iter().any(|l| same_layer(l, old)) {
                Self::dispose_layer(old);
            }
        }

        let previous = std::mem::replace(&mut self.layers, next);
        for layer in &self.layers {
            if !previous.iter().any(|l| same_layer(l, layer)) {
                self.replay(layer, scene);
            }
        }
    }

    /// Append a layer. Returns `false` if it was already active.
    pub fn add(&mut self, layer: VisualizerHandle, scene: &mut Scene) -> bool {
        if self.contains(&layer) {
            warn!(id = layer.borrow().id(), "duplicate visualizer ignored");
            return false;
        }
        self.replay(&layer, scene);
        self.layers.push(layer);
        true
    }

    /// Remove and dispose a layer. Returns `false` if it was not active.
    pub fn remove(&mut self, layer: &VisualizerHandle) -> bool {
        let Some(index) = self.layers.iter().position(|l| same_layer(l, layer)) else {
            return false;
        };
        let removed = self.layers.remove(index);
        Self::dispose_layer(&removed);
        true
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
        for layer in &self.layers {
            layer.borrow_mut().on_resize(width, height);
        }
    }

    pub fn set_point_positions(&mut self, positions: Vec<f32>) {
        for layer in &self.layers {
            layer.borrow_mut().on_point_positions_changed(&positions);
        }
        self.positions = Some(positions);
    }

    pub fn render(&self, context: &RenderContext<'_>) {
        for layer in &self.layers {
            layer.borrow_mut().on_render(context);
        }
    }

    pub fn picking_render(&self, context: &RenderContext<'_>) {
        for layer in &self.layers {
            layer.borrow_mut().on_picking_render(context);
        }
    }

    /// Dispose every layer and empty the registry
    pub fn dispose_all(&mut self) {
        for layer in self.layers.drain(..) {
            Self::dispose_layer(&layer);
        }
    }

    fn replay(&self, layer: &VisualizerHandle, scene: &mut Scene) {
        let mut layer = layer.borrow_mut();
        debug!(id = layer.id(), "visualizer attached");
        layer.attach_scene(scene);
        if let Some((width, height)) = self.size {
            layer.on_resize(width, height);
        }
        if let Some(positions) = &self.positions {
            layer.on_point_positions_changed(positions);
        }
    }

    fn dispose_layer(layer: &VisualizerHandle) {
        let mut layer = layer.borrow_mut();
        debug!(id = layer.id(), "visualizer disposed");
        layer.dispose();
    }
}

impl Drop for VisualizerRegistry {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
