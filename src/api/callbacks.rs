use std::fmt;

use crate::interaction::{CameraEvent, PointerEvent};

pub type PointerCallback = Box<dyn FnMut(&PointerEvent)>;
pub type CameraCallback = Box<dyn FnMut(&CameraEvent)>;

/// Caller-supplied listeners; events are forwarded without interpretation.
#[derive(Default)]
pub struct HostCallbacks {
    on_hover: Option<PointerCallback>,
    on_click: Option<PointerCallback>,
    on_camera_change: Option<CameraCallback>,
}

impl fmt::Debug for HostCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCallbacks")
            .field("on_hover", &self.on_hover.is_some())
            .field("on_click", &self.on_click.is_some())
            .field("on_camera_change", &self.on_camera_change.is_some())
            .finish()
    }
}

impl HostCallbacks {
    pub fn set_on_hover(&mut self, callback: Option<PointerCallback>) {
        self.on_hover = callback;
    }

    pub fn set_on_click(&mut self, callback: Option<PointerCallback>) {
        self.on_click = callback;
    }

    pub fn set_on_camera_change(&mut self, callback: Option<CameraCallback>) {
        self.on_camera_change = callback;
    }

    pub(crate) fn emit_hover(&mut self, event: &PointerEvent) {
        if let Some(callback) = self.on_hover.as_mut() {
            callback(event);
        }
    }

    pub(crate) fn emit_click(&mut self, event: &PointerEvent) {
        if let Some(callback) = self.on_click.as_mut() {
            callback(event);
        }
    }

    pub(crate) fn emit_camera_change(&mut self, event: &CameraEvent) {
        if let Some(callback) = self.on_camera_change.as_mut() {
            callback(event);
        }
    }
}
