//! Access to the `GstWaylandVideo` interface and the display handle context
//! helpers of libgstwayland.
//!
//! There are no Rust bindings for libgstwayland and the set of exported
//! symbols differs between GStreamer releases, so the library is opened at
//! runtime and every entry point is optional.

use std::os::raw::{c_int, c_void};

use gstreamer::glib;
use gstreamer::glib::translate::from_glib_full;
use gstreamer::prelude::*;
use once_cell::sync::Lazy;

use crate::CAT;

const LIBRARY_NAMES: &[&str] = &["libgstwayland-1.0.so.0", "libgstwayland-1.0.so"];

const WAYLAND_VIDEO_INTERFACE: &str = "GstWaylandVideo";

pub const DISPLAY_HANDLE_CONTEXT_TYPE: &str = "GstWlDisplayHandleContextType";
pub const LEGACY_DISPLAY_HANDLE_CONTEXT_TYPE: &str = "GstWaylandDisplayHandleContextType";

type VideoFn = unsafe extern "C" fn(*mut c_void);
type SurfaceSizeFn = unsafe extern "C" fn(*mut c_void, c_int, c_int);
type ContextNewFn = unsafe extern "C" fn(*mut c_void) -> *mut gstreamer::ffi::GstContext;

/// Constructors of the two display handle context types. Each one only
/// answers requests for its own type, a sink ignores the other one.
#[derive(Debug, Clone, Copy, Default)]
struct ContextHelpers {
    current: Option<ContextNewFn>,
    legacy: Option<ContextNewFn>,
}

impl ContextHelpers {
    fn for_type(&self, context_type: &str) -> Option<ContextNewFn> {
        match context_type {
            DISPLAY_HANDLE_CONTEXT_TYPE => self.current,
            LEGACY_DISPLAY_HANDLE_CONTEXT_TYPE => self.legacy,
            _ => None,
        }
    }
}

struct WaylandVideoApi {
    pause_rendering: Option<VideoFn>,
    resume_rendering: Option<VideoFn>,
    begin_geometry_change: Option<VideoFn>,
    end_geometry_change: Option<VideoFn>,
    set_surface_size: Option<SurfaceSizeFn>,
    contexts: ContextHelpers,
    // keeps the symbols above valid
    _library: libloading::Library,
}

unsafe fn symbol<T: Copy>(library: &libloading::Library, name: &[u8]) -> Option<T> {
    library.get::<T>(name).ok().map(|symbol| *symbol)
}

impl WaylandVideoApi {
    fn load() -> Option<Self> {
        let library = LIBRARY_NAMES
            .iter()
            .find_map(|name| unsafe { libloading::Library::new(name) }.ok())?;

        unsafe {
            Some(WaylandVideoApi {
                pause_rendering: symbol(&library, b"gst_wayland_video_pause_rendering\0"),
                resume_rendering: symbol(&library, b"gst_wayland_video_resume_rendering\0"),
                begin_geometry_change: symbol(
                    &library,
                    b"gst_wayland_video_begin_geometry_change\0",
                ),
                end_geometry_change: symbol(&library, b"gst_wayland_video_end_geometry_change\0"),
                set_surface_size: symbol(&library, b"gst_wayland_video_set_surface_size\0"),
                contexts: ContextHelpers {
                    current: symbol(&library, b"gst_wl_display_handle_context_new\0"),
                    legacy: symbol(&library, b"gst_wayland_display_handle_context_new\0"),
                },
                _library: library,
            })
        }
    }
}

static API: Lazy<Option<WaylandVideoApi>> = Lazy::new(|| {
    let api = WaylandVideoApi::load();
    if api.is_none() {
        gstreamer::warning!(CAT, "libgstwayland-1.0 not found, sink geometry control disabled");
    }
    api
});

/// Whether `element` implements the `GstWaylandVideo` interface.
pub fn implements_wayland_video(element: &gstreamer::Element) -> bool {
    glib::Type::from_name(WAYLAND_VIDEO_INTERFACE)
        .map_or(false, |interface| element.type_().is_a(interface))
}

fn call_video_fn(
    element: &gstreamer::Element,
    name: &str,
    select: impl FnOnce(&WaylandVideoApi) -> Option<VideoFn>,
) -> bool {
    if !implements_wayland_video(element) {
        gstreamer::debug!(CAT, obj: element, "{} skipped, sink is not a GstWaylandVideo", name);
        return false;
    }

    let Some(func) = API.as_ref().and_then(select) else {
        gstreamer::debug!(CAT, obj: element, "{} not exported by libgstwayland", name);
        return false;
    };

    unsafe { func(element.as_ptr() as *mut c_void) };
    true
}

pub fn pause_rendering(element: &gstreamer::Element) -> bool {
    call_video_fn(element, "pause_rendering", |api| api.pause_rendering)
}

pub fn resume_rendering(element: &gstreamer::Element) -> bool {
    call_video_fn(element, "resume_rendering", |api| api.resume_rendering)
}

pub fn begin_geometry_change(element: &gstreamer::Element) -> bool {
    call_video_fn(element, "begin_geometry_change", |api| {
        api.begin_geometry_change
    })
}

pub fn end_geometry_change(element: &gstreamer::Element) -> bool {
    call_video_fn(element, "end_geometry_change", |api| api.end_geometry_change)
}

pub fn set_surface_size(element: &gstreamer::Element, width: i32, height: i32) -> bool {
    if !implements_wayland_video(element) {
        gstreamer::debug!(CAT, obj: element, "set_surface_size skipped, sink is not a GstWaylandVideo");
        return false;
    }

    let Some(func) = API.as_ref().and_then(|api| api.set_surface_size) else {
        gstreamer::debug!(CAT, obj: element, "set_surface_size not exported by libgstwayland");
        return false;
    };

    unsafe { func(element.as_ptr() as *mut c_void, width, height) };
    true
}

/// Whether `context_type` names a Wayland display handle context.
pub fn is_display_handle_context_type(context_type: &str) -> bool {
    context_type == DISPLAY_HANDLE_CONTEXT_TYPE || context_type == LEGACY_DISPLAY_HANDLE_CONTEXT_TYPE
}

/// Build the context answering a need-context request of `context_type`
/// for the `struct wl_display *` in `display`.
pub fn display_handle_context(context_type: &str, display: usize) -> Option<gstreamer::Context> {
    if display == 0 {
        return None;
    }

    let Some(func) = API.as_ref().and_then(|api| api.contexts.for_type(context_type)) else {
        gstreamer::debug!(CAT, "libgstwayland cannot create {}", context_type);
        return None;
    };

    let context = unsafe { func(display as *mut c_void) };
    if context.is_null() {
        return None;
    }

    Some(unsafe { from_glib_full(context) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_both_context_types() {
        assert!(is_display_handle_context_type("GstWlDisplayHandleContextType"));
        assert!(is_display_handle_context_type("GstWaylandDisplayHandleContextType"));
        assert!(!is_display_handle_context_type("gst.gl.GLDisplay"));
    }

    unsafe extern "C" fn no_context(_display: *mut c_void) -> *mut gstreamer::ffi::GstContext {
        std::ptr::null_mut()
    }

    #[test]
    fn context_helper_matches_requested_type() {
        let only_legacy = ContextHelpers {
            current: None,
            legacy: Some(no_context),
        };
        assert!(only_legacy.for_type(DISPLAY_HANDLE_CONTEXT_TYPE).is_none());
        assert!(only_legacy
            .for_type(LEGACY_DISPLAY_HANDLE_CONTEXT_TYPE)
            .is_some());

        let only_current = ContextHelpers {
            current: Some(no_context),
            legacy: None,
        };
        assert!(only_current.for_type(DISPLAY_HANDLE_CONTEXT_TYPE).is_some());
        assert!(only_current
            .for_type(LEGACY_DISPLAY_HANDLE_CONTEXT_TYPE)
            .is_none());
        assert!(only_current.for_type("gst.gl.GLDisplay").is_none());
    }

    #[test]
    fn no_context_for_null_display() {
        assert!(display_handle_context(DISPLAY_HANDLE_CONTEXT_TYPE, 0).is_none());
        assert!(display_handle_context("gst.gl.GLDisplay", 0).is_none());
    }
}
