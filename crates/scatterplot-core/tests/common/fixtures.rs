//! Shared builders for integration tests

use std::cell::RefCell;
use std::rc::Rc;

use scatterplot_core::render::{NullSurface, RenderContext, Scene};
use scatterplot_core::{
    Dataset, FrameQueue, Projection, Projector, ScatterPlot, ScatterPlotConfig, ScatterPlotVisualizer,
    VisualizerHandle,
};

pub type Log = Rc<RefCell<Vec<String>>>;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A scatter plot on a headless surface, plus handles to inspect both
pub fn plot(width: u32, height: u32) -> (ScatterPlot, Rc<RefCell<NullSurface>>, Rc<RefCell<FrameQueue>>) {
    init_tracing();
    let surface = Rc::new(RefCell::new(NullSurface::new()));
    let frames = Rc::new(RefCell::new(FrameQueue::new()));
    let plot = ScatterPlot::new(
        ScatterPlotConfig::default(),
        width,
        height,
        Box::new(surface.clone()),
        Box::new(frames.clone()),
    )
    .unwrap_or_else(|e| panic!("default config should build: {}", e));
    (plot, surface, frames)
}

#[allow(dead_code)]
pub fn projector(width: u32, height: u32) -> (Projector, Rc<RefCell<NullSurface>>) {
    let (plot, surface, _) = plot(width, height);
    (Projector::new(plot), surface)
}

/// Three 2D points on a diagonal: (0,0), (1,1), (2,2)
#[allow(dead_code)]
pub fn three_point_projection() -> Rc<Projection> {
    let dataset = Dataset::new(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]], vec![])
        .unwrap_or_else(|e| panic!("fixture dataset should validate: {}", e));
    Rc::new(Projection::from_dataset(&dataset))
}

/// Layer that writes every callback it receives into a shared log
pub struct RecordingLayer {
    id: String,
    log: Log,
}

impl RecordingLayer {
    fn record(&self, what: String) {
        self.log.borrow_mut().push(format!("{}:{}", self.id, what));
    }
}

#[allow(dead_code)]
pub fn recording_layer(id: &str, log: &Log) -> VisualizerHandle {
    Rc::new(RefCell::new(RecordingLayer {
        id: id.to_string(),
        log: log.clone(),
    }))
}

#[allow(dead_code)]
pub fn count(log: &Log, entry: &str) -> usize {
    log.borrow().iter().filter(|e| e.as_str() == entry).count()
}

impl ScatterPlotVisualizer for RecordingLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn attach_scene(&mut self, _scene: &mut Scene) {
        self.record("attach".to_string());
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.record(format!("resize {}x{}", width, height));
    }

    fn on_point_positions_changed(&mut self, positions: &[f32]) {
        self.record(format!("positions {}", positions.len()));
    }

    fn on_render(&mut self, context: &RenderContext<'_>) {
        self.record(format!("render {}", context.point_count()));
    }

    fn dispose(&mut self) {
        self.record("dispose".to_string());
    }
}
