use std::sync::{Arc, Mutex};

use gstreamer::prelude::*;
use gstreamer_video::prelude::*;

use crate::geometry::Rectangle;
use crate::wayland_video;
use crate::CAT;

/// Operations the geometry synchronizer performs on the video sink.
pub trait RenderControl {
    fn pause_rendering(&self);
    fn resume_rendering(&self);
    fn set_surface_size(&self, width: i32, height: i32);
    fn begin_geometry_change(&self);
    fn end_geometry_change(&self);
    fn set_render_rectangle(&self, rect: Rectangle);
}

/// The element currently presenting video. Shared with the bus sync
/// handler, which may replace it when a different element asks for the
/// window handle.
#[derive(Debug, Default, Clone)]
pub struct ActiveSink(Arc<Mutex<Option<gstreamer::Element>>>);

impl ActiveSink {
    pub fn new(element: Option<gstreamer::Element>) -> Self {
        Self(Arc::new(Mutex::new(element)))
    }

    pub fn get(&self) -> Option<gstreamer::Element> {
        self.0.lock().unwrap().clone()
    }

    pub fn set(&self, element: gstreamer::Element) {
        let mut guard = self.0.lock().unwrap();
        if guard.as_ref() != Some(&element) {
            gstreamer::debug!(CAT, obj: &element, "now the active video sink");
            *guard = Some(element);
        }
    }
}

/// [`RenderControl`] over a `waylandsink`.
#[derive(Debug, Clone)]
pub struct WaylandVideoSink {
    sink: ActiveSink,
}

impl WaylandVideoSink {
    pub fn new(sink: ActiveSink) -> Self {
        Self { sink }
    }

    fn with_sink(&self, f: impl FnOnce(&gstreamer::Element)) {
        match self.sink.get() {
            Some(element) => f(&element),
            None => gstreamer::debug!(CAT, "no active video sink yet"),
        }
    }
}

impl RenderControl for WaylandVideoSink {
    fn pause_rendering(&self) {
        self.with_sink(|element| {
            wayland_video::pause_rendering(element);
        })
    }

    fn resume_rendering(&self) {
        self.with_sink(|element| {
            wayland_video::resume_rendering(element);
        })
    }

    fn set_surface_size(&self, width: i32, height: i32) {
        self.with_sink(|element| {
            wayland_video::set_surface_size(element, width, height);
        })
    }

    fn begin_geometry_change(&self) {
        self.with_sink(|element| {
            wayland_video::begin_geometry_change(element);
        })
    }

    fn end_geometry_change(&self) {
        self.with_sink(|element| {
            wayland_video::end_geometry_change(element);
        })
    }

    fn set_render_rectangle(&self, rect: Rectangle) {
        self.with_sink(|element| set_render_rectangle(element, rect))
    }
}

/// Confine the output of `element` to `rect`, if it is a video overlay.
pub fn set_render_rectangle(element: &gstreamer::Element, rect: Rectangle) {
    let Some(overlay) = element.dynamic_cast_ref::<gstreamer_video::VideoOverlay>() else {
        gstreamer::debug!(CAT, obj: element, "not a video overlay, no render rectangle");
        return;
    };

    if let Err(err) = overlay.set_render_rectangle(rect.x, rect.y, rect.width, rect.height) {
        gstreamer::warning!(CAT, obj: element, "failed to set render rectangle {:?}: {}", rect, err);
    }
}
