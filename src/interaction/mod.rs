mod picking;

use serde::{Deserialize, Serialize};

use crate::core::{CameraState, ElementId};

pub use picking::{Aabb, PickHit, pick_element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEventKind {
    Move,
    Click(PointerButton),
    Leave,
}

/// Raw pointer input in viewport pixels, forwarded to host callbacks as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Move,
            x,
            y,
        }
    }

    #[must_use]
    pub fn clicked(x: f64, y: f64, button: PointerButton) -> Self {
        Self {
            kind: PointerEventKind::Click(button),
            x,
            y,
        }
    }

    #[must_use]
    pub fn left(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Leave,
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraChangeKind {
    Rotate,
    Zoom,
    Pan,
}

/// Camera pose after an orbit-control change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraEvent {
    pub kind: CameraChangeKind,
    pub state: CameraState,
}

/// Which element of a scene is under the pointer, if any.
///
/// Pointer-leave only clears the state for the element that was entered, so
/// a late leave from a previous element never hides the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HoverState {
    hovered: Option<ElementId>,
}

impl HoverState {
    #[must_use]
    pub fn hovered(self) -> Option<ElementId> {
        self.hovered
    }

    #[must_use]
    pub fn is_hovered(self, element: ElementId) -> bool {
        self.hovered == Some(element)
    }

    /// Returns `true` when the hovered element changed.
    pub fn pointer_enter(&mut self, element: ElementId) -> bool {
        let changed = self.hovered != Some(element);
        self.hovered = Some(element);
        changed
    }

    /// Returns `true` when the hovered element changed.
    pub fn pointer_leave(&mut self, element: ElementId) -> bool {
        if self.hovered == Some(element) {
            self.hovered = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) -> bool {
        self.hovered.take().is_some()
    }
}
