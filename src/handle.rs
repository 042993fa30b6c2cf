//! Native handles published on widget realization.
//!
//! The state is written from the GTK main thread and read by the bus sync
//! handler, which runs on whatever streaming thread posts the message.

use std::os::raw::c_int;
use std::sync::{Arc, Mutex};

use crate::geometry::Rectangle;

/// Layout of the window handle understood by older `waylandsink` versions,
/// which expect a pointer to this struct instead of a bare `wl_surface`.
#[repr(C)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaylandWindowHandle {
    /// `struct wl_display *`
    pub display: usize,
    /// `struct wl_surface *`
    pub surface: usize,
    pub width: c_int,
    pub height: c_int,
}

#[derive(Debug, PartialEq, Eq)]
pub enum WindowHandle {
    /// A `struct wl_surface *`.
    Surface(usize),
    /// Boxed so the address handed to the sink stays stable while published.
    Legacy(Box<WaylandWindowHandle>),
}

impl WindowHandle {
    /// The value passed to `gst_video_overlay_set_window_handle`.
    pub fn as_raw(&self) -> usize {
        match self {
            WindowHandle::Surface(surface) => *surface,
            WindowHandle::Legacy(handle) => handle.as_ref() as *const WaylandWindowHandle as usize,
        }
    }

    pub fn surface(&self) -> usize {
        match self {
            WindowHandle::Surface(surface) => *surface,
            WindowHandle::Legacy(handle) => handle.surface,
        }
    }
}

#[derive(Debug, Default)]
pub struct HandleState {
    /// `struct wl_display *` of the GDK display connection.
    display: usize,
    window: Option<WindowHandle>,
    allocation: Rectangle,
}

/// Copy of the published handles taken under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Published {
    pub display: usize,
    pub window_handle: usize,
    pub surface: usize,
    pub allocation: Rectangle,
}

#[derive(Debug, Default, Clone)]
pub struct SharedHandles(Arc<Mutex<HandleState>>);

impl SharedHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the handles of a freshly realized widget. A null surface or
    /// display is not published.
    pub fn publish(&self, display: usize, window: WindowHandle, allocation: Rectangle) -> bool {
        if display == 0 || window.surface() == 0 {
            return false;
        }

        let mut state = self.0.lock().unwrap();
        state.display = display;
        state.window = Some(window);
        state.allocation = allocation;
        true
    }

    pub fn invalidate(&self) {
        let mut state = self.0.lock().unwrap();
        state.display = 0;
        state.window = None;
    }

    pub fn is_published(&self) -> bool {
        self.0.lock().unwrap().window.is_some()
    }

    pub fn update_allocation(&self, allocation: Rectangle) {
        self.0.lock().unwrap().allocation = allocation;
    }

    pub fn published(&self) -> Option<Published> {
        let state = self.0.lock().unwrap();
        state.window.as_ref().map(|window| Published {
            display: state.display,
            window_handle: window.as_raw(),
            surface: window.surface(),
            allocation: state.allocation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_published_initially() {
        let handles = SharedHandles::new();
        assert!(!handles.is_published());
        assert_eq!(handles.published(), None);
    }

    #[test]
    fn null_surface_is_rejected() {
        let handles = SharedHandles::new();
        assert!(!handles.publish(0x1000, WindowHandle::Surface(0), Rectangle::default()));
        assert!(!handles.publish(0, WindowHandle::Surface(0x2000), Rectangle::default()));
        assert!(!handles.is_published());
    }

    #[test]
    fn surface_handle_is_passed_as_is() {
        let handles = SharedHandles::new();
        let allocation = Rectangle::new(0, 0, 640, 480);
        assert!(handles.publish(0x1000, WindowHandle::Surface(0x2000), allocation));

        let published = handles.published().unwrap();
        assert_eq!(published.display, 0x1000);
        assert_eq!(published.window_handle, 0x2000);
        assert_eq!(published.surface, 0x2000);
        assert_eq!(published.allocation, allocation);
    }

    #[test]
    fn legacy_handle_points_at_stable_struct() {
        let handles = SharedHandles::new();
        let legacy = Box::new(WaylandWindowHandle {
            display: 0x1000,
            surface: 0x2000,
            width: 320,
            height: 240,
        });
        let address = legacy.as_ref() as *const WaylandWindowHandle as usize;
        handles.publish(0x1000, WindowHandle::Legacy(legacy), Rectangle::new(0, 0, 320, 240));

        let published = handles.published().unwrap();
        assert_eq!(published.window_handle, address);
        assert_eq!(published.surface, 0x2000);

        let pointed = unsafe { &*(published.window_handle as *const WaylandWindowHandle) };
        assert_eq!(pointed.width, 320);
        assert_eq!(pointed.height, 240);
    }

    #[test]
    fn invalidate_and_allocation_updates() {
        let handles = SharedHandles::new();
        handles.publish(0x1000, WindowHandle::Surface(0x2000), Rectangle::default());
        handles.update_allocation(Rectangle::new(4, 8, 100, 50));
        assert_eq!(
            handles.published().unwrap().allocation,
            Rectangle::new(4, 8, 100, 50)
        );

        handles.invalidate();
        assert!(!handles.is_published());
    }
}
