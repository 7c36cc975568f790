//! Collapses mouse and touch input into a single logical pointer.

use winit::event::{ElementState, MouseButton};

use crate::Pt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

impl From<winit::event::TouchPhase> for TouchPhase {
    fn from(phase: winit::event::TouchPhase) -> Self {
        match phase {
            winit::event::TouchPhase::Started => TouchPhase::Started,
            winit::event::TouchPhase::Moved => TouchPhase::Moved,
            winit::event::TouchPhase::Ended => TouchPhase::Ended,
            winit::event::TouchPhase::Cancelled => TouchPhase::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: [Pt; 2] },
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Mouse,
    Touch(u64),
}

/// Tracks which device owns the pointer.
///
/// The left mouse button or the first touch to start claims it; everything
/// else is ignored until that source releases.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    cursor: Option<[Pt; 2]>,
    active: Option<Source>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn handle_cursor_moved(&mut self, x: Pt, y: Pt) {
        self.cursor = Some([x, y]);
    }

    pub(crate) fn handle_mouse_input(
        &mut self,
        state: ElementState,
        button: MouseButton,
    ) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                let position = self.cursor?;
                self.claim(Source::Mouse, position)
            }
            ElementState::Released => self.release(Source::Mouse),
        }
    }

    pub(crate) fn handle_touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        position: [Pt; 2],
    ) -> Option<PointerEvent> {
        match phase {
            TouchPhase::Started => self.claim(Source::Touch(id), position),
            TouchPhase::Moved => None,
            TouchPhase::Ended | TouchPhase::Cancelled => self.release(Source::Touch(id)),
        }
    }

    /// Losing focus mid-press counts as a release.
    pub(crate) fn handle_focus(&mut self, focused: bool) -> Option<PointerEvent> {
        if focused {
            return None;
        }
        self.active.take().map(|_| PointerEvent::Up)
    }

    fn claim(&mut self, source: Source, position: [Pt; 2]) -> Option<PointerEvent> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(source);
        Some(PointerEvent::Down { position })
    }

    fn release(&mut self, source: Source) -> Option<PointerEvent> {
        if self.active != Some(source) {
            return None;
        }
        self.active = None;
        Some(PointerEvent::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> [Pt; 2] {
        [Pt(x), Pt(y)]
    }

    #[test]
    fn mouse_press_uses_last_cursor_position() {
        let mut p = PointerTracker::new();
        assert_eq!(
            p.handle_mouse_input(ElementState::Pressed, MouseButton::Left),
            None
        );

        p.handle_cursor_moved(Pt(12.0), Pt(34.0));
        assert_eq!(
            p.handle_mouse_input(ElementState::Pressed, MouseButton::Left),
            Some(PointerEvent::Down {
                position: at(12.0, 34.0)
            })
        );
        assert!(p.is_down());
        assert_eq!(
            p.handle_mouse_input(ElementState::Released, MouseButton::Left),
            Some(PointerEvent::Up)
        );
        assert!(!p.is_down());
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut p = PointerTracker::new();
        p.handle_cursor_moved(Pt(1.0), Pt(1.0));
        assert_eq!(
            p.handle_mouse_input(ElementState::Pressed, MouseButton::Right),
            None
        );
    }

    #[test]
    fn only_the_first_touch_drives_the_pointer() {
        let mut p = PointerTracker::new();
        assert!(matches!(
            p.handle_touch(1, TouchPhase::Started, at(5.0, 5.0)),
            Some(PointerEvent::Down { .. })
        ));
        assert_eq!(p.handle_touch(2, TouchPhase::Started, at(9.0, 9.0)), None);
        assert_eq!(p.handle_touch(2, TouchPhase::Ended, at(9.0, 9.0)), None);
        assert_eq!(p.handle_touch(1, TouchPhase::Moved, at(6.0, 6.0)), None);
        assert_eq!(
            p.handle_touch(1, TouchPhase::Cancelled, at(6.0, 6.0)),
            Some(PointerEvent::Up)
        );
    }

    #[test]
    fn touch_and_mouse_do_not_release_each_other() {
        let mut p = PointerTracker::new();
        p.handle_cursor_moved(Pt(0.0), Pt(0.0));
        p.handle_touch(7, TouchPhase::Started, at(1.0, 1.0));
        assert_eq!(
            p.handle_mouse_input(ElementState::Released, MouseButton::Left),
            None
        );
        assert!(p.is_down());
    }

    #[test]
    fn focus_loss_releases_held_pointer() {
        let mut p = PointerTracker::new();
        assert_eq!(p.handle_focus(false), None);
        p.handle_touch(3, TouchPhase::Started, at(1.0, 1.0));
        assert_eq!(p.handle_focus(true), None);
        assert_eq!(p.handle_focus(false), Some(PointerEvent::Up));
        assert!(!p.is_down());
    }
}
