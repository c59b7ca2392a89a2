//! Animation-frame scheduling
//!
//! The orbit animation advances one frame at a time. The host owns the real
//! frame clock; the scatter plot only asks for the next frame and cancels it
//! when the animation stops. When the host's clock fires it calls
//! `ScatterPlot::on_animation_frame` with the id it was handed.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identifier for a requested animation frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

/// Source of animation frames
pub trait FrameScheduler {
    /// Ask for a single callback on the next frame
    fn request_frame(&mut self) -> FrameId;

    /// Cancel a previously requested frame. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
}

/// Host-driven scheduler that simply records outstanding requests.
///
/// The host drains [`FrameQueue::take_pending`] from its own frame loop and
/// feeds each id back into the scatter plot.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: BTreeSet<FrameId>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding frame requests, oldest first
    pub fn pending(&self) -> Vec<FrameId> {
        self.pending.iter().copied().collect()
    }

    /// Remove and return every outstanding request
    pub fn take_pending(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.pending.insert(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.pending.remove(&id);
    }
}

/// Lets the host keep a handle on a scheduler it lends to the scatter plot
impl<S: FrameScheduler> FrameScheduler for Rc<RefCell<S>> {
    fn request_frame(&mut self) -> FrameId {
        self.borrow_mut().request_frame()
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.borrow_mut().cancel_frame(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_cancel() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        assert_ne!(a, b);
        assert_eq!(queue.pending(), vec![a, b]);

        queue.cancel_frame(a);
        assert_eq!(queue.pending(), vec![b]);

        // Cancelling twice is harmless
        queue.cancel_frame(a);
        assert_eq!(queue.take_pending(), vec![b]);
        assert!(queue.pending().is_empty());
    }

    #[test]
    fn test_shared_queue() {
        let shared = Rc::new(RefCell::new(FrameQueue::new()));
        let mut lent = shared.clone();
        let id = lent.request_frame();
        assert_eq!(shared.borrow().pending(), vec![id]);
    }
}
