//! Native Wayland handles behind GDK objects.

use std::os::raw::c_void;

use gtk::glib::translate::ToGlibPtr;
use gtk::prelude::*;

// Part of libgdk-3, which gdk-sys links already.
extern "C" {
    fn gdk_wayland_display_get_wl_display(display: *mut gdk::ffi::GdkDisplay) -> *mut c_void;
    fn gdk_wayland_window_get_wl_surface(window: *mut gdk::ffi::GdkWindow) -> *mut c_void;
    fn gdk_wayland_window_set_use_custom_surface(window: *mut gdk::ffi::GdkWindow);
}

pub fn is_wayland_display(display: &gdk::Display) -> bool {
    display.type_().name() == "GdkWaylandDisplay"
}

fn is_wayland_window(window: &gdk::Window) -> bool {
    window.type_().name() == "GdkWaylandWindow"
}

/// `struct wl_display *` of `display`, 0 if it is not a Wayland display.
pub fn wl_display(display: &gdk::Display) -> usize {
    if !is_wayland_display(display) {
        return 0;
    }

    unsafe { gdk_wayland_display_get_wl_display(display.to_glib_none().0) as usize }
}

/// `struct wl_surface *` backing `window`, 0 if there is none (yet).
pub fn wl_surface(window: &gdk::Window) -> usize {
    if !is_wayland_window(window) {
        return 0;
    }

    unsafe { gdk_wayland_window_get_wl_surface(window.to_glib_none().0) as usize }
}

/// Give `window` a native surface without a shell role, so that it can be
/// turned into a subsurface. Returns its `struct wl_surface *`.
pub fn custom_surface(window: &gdk::Window) -> usize {
    if !is_wayland_window(window) {
        return 0;
    }

    window.ensure_native();
    unsafe { gdk_wayland_window_set_use_custom_surface(window.to_glib_none().0) };
    wl_surface(window)
}
