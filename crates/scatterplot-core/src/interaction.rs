//! Pointer/keyboard interaction state machine
//!
//! Arbitrates between navigating the camera and drawing a selection region.
//! The state machine only interprets events; the scatter plot decides what
//! an [`InteractionOutcome`] means (render, notify listeners, clear the
//! selection).
//!
//! Drag and click are told apart by the drag-sequence flag: it becomes true
//! on the first pointer move while the button is down. Pixel displacement
//! plays no part.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::input::{Key, KeyEvent};
use crate::selector::{RectangleSelector, SelectionRegion, SelectionTool};
use crate::types::ScreenPoint;

/// Whether the pointer drives the camera or draws a selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Navigate,
    RectSelect,
}

/// What an input event resolved to
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionOutcome {
    /// The pointer hovers at a position, or left the viewport
    Hover(Option<ScreenPoint>),
    /// A selection drag finished
    Select(SelectionRegion),
    /// Button released without dragging
    Click(ScreenPoint),
}

#[derive(Clone, Debug)]
pub struct InteractionState {
    mode: InteractionMode,
    mouse_is_down: bool,
    is_drag_sequence: bool,
    hover_point: Option<ScreenPoint>,
    selector: RectangleSelector,
    /// Shift only arms selection when this is set
    pub select_enabled: bool,
}

impl InteractionState {
    pub fn new(select_enabled: bool, tool: SelectionTool) -> Self {
        Self {
            mode: InteractionMode::Navigate,
            mouse_is_down: false,
            is_drag_sequence: false,
            hover_point: None,
            selector: RectangleSelector::new(tool),
            select_enabled,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == InteractionMode::RectSelect
    }

    pub fn mouse_is_down(&self) -> bool {
        self.mouse_is_down
    }

    pub fn is_drag_sequence(&self) -> bool {
        self.is_drag_sequence
    }

    /// Last pointer position reported as a hover
    pub fn hover_point(&self) -> Option<ScreenPoint> {
        self.hover_point
    }

    pub fn selector(&self) -> &RectangleSelector {
        &self.selector
    }

    pub fn set_selection_tool(&mut self, tool: SelectionTool) {
        self.selector.set_tool(tool);
    }

    /// Switch modes. Returns `true` if the mode changed.
    ///
    /// A switch drops any half-drawn region. A button held across the switch
    /// stays down, but its press can no longer end in a click or a region.
    pub fn set_mode(&mut self, mode: InteractionMode) -> bool {
        if self.mode == mode {
            return false;
        }
        trace!(from = ?self.mode, to = ?mode, "interaction mode change");
        self.mode = mode;
        self.is_drag_sequence = self.mouse_is_down;
        self.selector.cancel();
        true
    }

    /// Shift arms and disarms selection. Returns the new mode on a switch.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<InteractionMode> {
        if event.key != Key::Shift || !self.select_enabled {
            return None;
        }
        let mode = if event.pressed {
            InteractionMode::RectSelect
        } else {
            InteractionMode::Navigate
        };
        self.set_mode(mode).then_some(mode)
    }

    pub fn mouse_down(&mut self, at: ScreenPoint) {
        self.is_drag_sequence = false;
        self.mouse_is_down = true;
        if self.is_selecting() {
            self.selector.begin(at);
        }
    }

    pub fn mouse_move(&mut self, at: ScreenPoint) -> Option<InteractionOutcome> {
        self.is_drag_sequence = self.mouse_is_down;
        if self.mouse_is_down {
            if self.is_selecting() {
                self.selector.extend(at);
            }
            return None;
        }
        if self.is_selecting() {
            return None;
        }
        self.hover_point = Some(at);
        Some(InteractionOutcome::Hover(Some(at)))
    }

    pub fn mouse_up(&mut self, at: ScreenPoint) -> Option<InteractionOutcome> {
        let was_down = std::mem::replace(&mut self.mouse_is_down, false);
        if !was_down {
            return None;
        }

        if !self.is_drag_sequence {
            self.selector.cancel();
            return Some(InteractionOutcome::Click(at));
        }
        self.is_drag_sequence = false;

        if self.is_selecting() {
            self.selector.extend(at);
            let region = self.selector.finish()?;
            trace!(?region, "selection finished");
            return Some(InteractionOutcome::Select(region));
        }
        None
    }

    /// The pointer left (or re-entered) the viewport
    pub fn mouse_leave(&mut self) -> Option<InteractionOutcome> {
        if self.is_selecting() {
            return None;
        }
        self.hover_point = None;
        Some(InteractionOutcome::Hover(None))
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(true, SelectionTool::Rectangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::selector::ScreenBoundingBox;

    fn p(x: f32, y: f32) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    fn shift_down() -> KeyEvent {
        KeyEvent::pressed(Key::Shift, Modifiers::new().with_shift())
    }

    fn shift_up() -> KeyEvent {
        KeyEvent::released(Key::Shift, Modifiers::new())
    }

    #[test]
    fn test_shift_toggles_mode() {
        let mut state = InteractionState::default();
        assert_eq!(state.handle_key(&shift_down()), Some(InteractionMode::RectSelect));
        // Key repeat does not switch again
        assert_eq!(state.handle_key(&shift_down().with_repeat()), None);
        assert_eq!(state.handle_key(&shift_up()), Some(InteractionMode::Navigate));
        assert_eq!(state.mode(), InteractionMode::Navigate);
    }

    #[test]
    fn test_shift_ignored_when_select_disabled() {
        let mut state = InteractionState::new(false, SelectionTool::Rectangle);
        assert_eq!(state.handle_key(&shift_down()), None);
        assert!(!state.is_selecting());
    }

    #[test]
    fn test_hover_while_navigating() {
        let mut state = InteractionState::default();
        assert_eq!(state.mouse_move(p(3.0, 4.0)), Some(InteractionOutcome::Hover(Some(p(3.0, 4.0)))));
        assert_eq!(state.hover_point(), Some(p(3.0, 4.0)));
        assert_eq!(state.mouse_leave(), Some(InteractionOutcome::Hover(None)));
        assert_eq!(state.hover_point(), None);
    }

    #[test]
    fn test_no_hover_while_selecting() {
        let mut state = InteractionState::default();
        state.set_mode(InteractionMode::RectSelect);
        assert_eq!(state.mouse_move(p(3.0, 4.0)), None);
        assert_eq!(state.mouse_leave(), None);
    }

    #[test]
    fn test_click_without_drag() {
        let mut state = InteractionState::default();
        state.mouse_down(p(10.0, 10.0));
        assert_eq!(state.mouse_up(p(10.0, 10.0)), Some(InteractionOutcome::Click(p(10.0, 10.0))));
        assert!(!state.mouse_is_down());
    }

    #[test]
    fn test_drag_while_navigating_is_silent() {
        let mut state = InteractionState::default();
        state.mouse_down(p(10.0, 10.0));
        assert_eq!(state.mouse_move(p(10.0, 10.0)), None);
        assert!(state.is_drag_sequence());
        assert_eq!(state.mouse_up(p(10.0, 10.0)), None);
    }

    #[test]
    fn test_rectangle_selection() {
        let mut state = InteractionState::default();
        state.handle_key(&shift_down());
        state.mouse_down(p(10.0, 20.0));
        state.mouse_move(p(30.0, 25.0));
        let outcome = state.mouse_up(p(40.0, 60.0));
        assert_eq!(
            outcome,
            Some(InteractionOutcome::Select(SelectionRegion::BoundingBox(ScreenBoundingBox {
                x: 10.0,
                y: 20.0,
                width: 30.0,
                height: 40.0
            })))
        );
        assert!(!state.selector().is_active());
    }

    #[test]
    fn test_click_in_select_mode_clears() {
        let mut state = InteractionState::default();
        state.set_mode(InteractionMode::RectSelect);
        state.mouse_down(p(10.0, 20.0));
        assert_eq!(state.mouse_up(p(10.0, 20.0)), Some(InteractionOutcome::Click(p(10.0, 20.0))));
        assert!(!state.selector().is_active());
    }

    #[test]
    fn test_mode_switch_resets_flags() {
        let mut state = InteractionState::default();
        state.set_mode(InteractionMode::RectSelect);
        state.mouse_down(p(0.0, 0.0));
        state.mouse_move(p(5.0, 5.0));
        assert!(state.selector().is_active());

        state.handle_key(&shift_up());
        assert!(!state.selector().is_active());
        // The release after the switch no longer counts
        assert_eq!(state.mouse_up(p(5.0, 5.0)), None);
        assert!(!state.mouse_is_down());
    }

    #[test]
    fn test_held_button_survives_mode_switch() {
        let mut state = InteractionState::default();
        state.mouse_down(p(0.0, 0.0));
        state.handle_key(&shift_down());
        state.handle_key(&shift_up());

        assert!(state.mouse_is_down());
        // Still a drag, so no hover and no click
        assert_eq!(state.mouse_move(p(5.0, 5.0)), None);
        assert_eq!(state.hover_point(), None);
        assert_eq!(state.mouse_up(p(5.0, 5.0)), None);
    }

    #[test]
    fn test_unrecognized_key_keeps_mode() {
        let mut state = InteractionState::default();
        assert_eq!(state.handle_key(&KeyEvent::pressed(Key::Unknown(82), Modifiers::new())), None);
        assert_eq!(state.mode(), InteractionMode::Navigate);
    }

    #[test]
    fn test_lasso_selection() {
        let mut state = InteractionState::new(true, SelectionTool::Lasso);
        state.set_mode(InteractionMode::RectSelect);
        state.mouse_down(p(0.0, 0.0));
        state.mouse_move(p(10.0, 0.0));
        state.mouse_move(p(10.0, 10.0));
        match state.mouse_up(p(0.0, 10.0)) {
            Some(InteractionOutcome::Select(SelectionRegion::Lasso(path))) => assert_eq!(path.len(), 4),
            other => panic!("expected lasso selection, got {:?}", other),
        }
    }
}
