use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk4 as gtk;
use gtk::prelude::*;
use tracing::warn;

use crate::api::SceneHost;
use crate::core::Viewport;
use crate::interaction::{PointerButton, pick_element};
use crate::render::{CairoContextRenderer, Renderer};

/// Shared host handle used by GTK callbacks.
pub type SharedSceneHost<R> = Rc<RefCell<SceneHost<R>>>;

/// `DrawingArea` wired to a scene host.
///
/// Pointer motion is forwarded to the host callbacks and also picked against
/// the last drawn frame to route hover into the mounted scene. Primary drag
/// orbits, secondary drag pans, scrolling zooms. Redraws are only queued from
/// the frame clock while `needs_frame()` reports pending work.
pub struct GtkSceneView<R: Renderer + CairoContextRenderer + 'static> {
    drawing_area: gtk::DrawingArea,
    host: SharedSceneHost<R>,
}

impl<R: Renderer + CairoContextRenderer + 'static> GtkSceneView<R> {
    #[must_use]
    pub fn new(host: SceneHost<R>) -> Self {
        let host = Rc::new(RefCell::new(host));
        let drawing_area = gtk::DrawingArea::new();
        drawing_area.set_hexpand(true);
        drawing_area.set_vexpand(true);
        drawing_area.set_focusable(true);

        attach_draw_func(&drawing_area, Rc::clone(&host));
        attach_pointer_controllers(&drawing_area, Rc::clone(&host));
        attach_orbit_controllers(&drawing_area, Rc::clone(&host));
        attach_tick_callback(&drawing_area, Rc::clone(&host));

        Self { drawing_area, host }
    }

    #[must_use]
    pub fn widget(&self) -> &gtk::DrawingArea {
        &self.drawing_area
    }

    #[must_use]
    pub fn host(&self) -> SharedSceneHost<R> {
        Rc::clone(&self.host)
    }
}

fn attach_draw_func<R: Renderer + CairoContextRenderer + 'static>(
    drawing_area: &gtk::DrawingArea,
    host: SharedSceneHost<R>,
) {
    drawing_area.set_draw_func(move |_widget, context, width, height| {
        if width <= 0 || height <= 0 {
            return;
        }
        let Ok(mut host) = host.try_borrow_mut() else {
            return;
        };
        let viewport = Viewport::new(width as u32, height as u32);
        if let Err(err) = host.set_viewport(viewport) {
            warn!(error = %err, "rejected drawing area viewport");
            return;
        }
        if let Err(err) = host.render_on_cairo_context(context) {
            warn!(error = %err, "scene draw failed");
        }
    });
}

fn attach_pointer_controllers<R: Renderer + CairoContextRenderer + 'static>(
    drawing_area: &gtk::DrawingArea,
    host: SharedSceneHost<R>,
) {
    let motion = gtk::EventControllerMotion::new();
    {
        let host = Rc::clone(&host);
        let drawing_area = drawing_area.clone();
        motion.connect_motion(move |_, x, y| {
            let Ok(mut host) = host.try_borrow_mut() else {
                return;
            };
            host.pointer_move(x, y);
            let ray = host.screen_ray(x, y);
            let hit = host
                .last_frame()
                .and_then(|frame| pick_element(frame, ray))
                .map(|hit| hit.element);
            if host.hover_element(hit) {
                drawing_area.queue_draw();
            }
        });
    }
    {
        let host = Rc::clone(&host);
        let drawing_area = drawing_area.clone();
        motion.connect_leave(move |controller| {
            let Ok(mut host) = host.try_borrow_mut() else {
                return;
            };
            let (x, y) = controller
                .widget()
                .map_or((0.0, 0.0), |widget| {
                    (f64::from(widget.width()), f64::from(widget.height()))
                });
            host.pointer_leave(x, y);
            if host.hover_element(None) {
                drawing_area.queue_draw();
            }
        });
    }
    drawing_area.add_controller(motion);

    let click = gtk::GestureClick::new();
    click.set_button(0);
    click.connect_pressed(move |gesture, _n_press, x, y| {
        let button = match gesture.current_button() {
            1 => PointerButton::Primary,
            2 => PointerButton::Middle,
            _ => PointerButton::Secondary,
        };
        if let Ok(mut host) = host.try_borrow_mut() {
            host.pointer_click(x, y, button);
        }
    });
    drawing_area.add_controller(click);
}

fn attach_orbit_controllers<R: Renderer + CairoContextRenderer + 'static>(
    drawing_area: &gtk::DrawingArea,
    host: SharedSceneHost<R>,
) {
    let scroll = gtk::EventControllerScroll::new(gtk::EventControllerScrollFlags::VERTICAL);
    {
        let host = Rc::clone(&host);
        let drawing_area = drawing_area.clone();
        scroll.connect_scroll(move |_, _dx, dy| {
            if let Ok(mut host) = host.try_borrow_mut() {
                // Scrolling down moves away from the target.
                if host.orbit_zoom(-dy) {
                    drawing_area.queue_draw();
                }
            }
            gtk::glib::Propagation::Stop
        });
    }
    drawing_area.add_controller(scroll);

    let drag = gtk::GestureDrag::new();
    drag.set_button(0);
    let last_offset = Rc::new(Cell::new((0.0, 0.0)));
    {
        let last_offset = Rc::clone(&last_offset);
        drag.connect_drag_begin(move |_, _, _| {
            last_offset.set((0.0, 0.0));
        });
    }
    {
        let drawing_area = drawing_area.clone();
        drag.connect_drag_update(move |gesture, offset_x, offset_y| {
            let (last_x, last_y) = last_offset.get();
            last_offset.set((offset_x, offset_y));
            let (delta_x, delta_y) = (offset_x - last_x, offset_y - last_y);
            let Ok(mut host) = host.try_borrow_mut() else {
                return;
            };
            let changed = if gesture.current_button() == 1 {
                host.orbit_rotate(delta_x, delta_y)
            } else {
                host.orbit_pan(delta_x, delta_y)
            };
            if changed {
                drawing_area.queue_draw();
            }
        });
    }
    drawing_area.add_controller(drag);
}

fn attach_tick_callback<R: Renderer + CairoContextRenderer + 'static>(
    drawing_area: &gtk::DrawingArea,
    host: SharedSceneHost<R>,
) {
    drawing_area.add_tick_callback(move |widget, _frame_clock| {
        if let Ok(mut host) = host.try_borrow_mut() {
            if host.tick() || host.needs_frame() {
                widget.queue_draw();
            }
        }
        gtk::glib::ControlFlow::Continue
    });
}
