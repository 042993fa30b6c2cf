//! Video rendered into a subsurface placed over the video widget.
//!
//! Rendering is paused and the subsurface switched to sync mode while the
//! toplevel is being resized; the next paint of the widget resumes it.

use std::cell::RefCell;
use std::rc::Rc;

use gtk::glib;
use gtk::prelude::*;

use crate::bus::{BusInterceptor, InterceptorOptions};
use crate::coordinator::{Coordinator, GeometryProtocol};
use crate::error::{Error, Result};
use crate::gdk_wayland;
use crate::geometry::Rectangle;
use crate::handle::{SharedHandles, WaylandWindowHandle, WindowHandle};
use crate::settings::Settings;
use crate::sink::{ActiveSink, WaylandVideoSink};
use crate::subcompositor::{Subcompositor, Subsurface};
use crate::ui::Shell;
use crate::CAT;

/// What is handed to the sink as window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Pointer to a [`WaylandWindowHandle`] carrying display, surface and size.
    Legacy,
    /// The bare `wl_surface`, the display is provided through a context.
    Surface,
}

type SubsurfaceCoordinator = Rc<RefCell<Coordinator<WaylandVideoSink, Subsurface>>>;

fn realize(
    widget: &gtk::Widget,
    subcompositor: &Subcompositor,
    handles: &SharedHandles,
    coordinator: &SubsurfaceCoordinator,
    kind: HandleKind,
) -> Result<()> {
    let toplevel = widget.toplevel().ok_or(Error::NotRealized("toplevel window"))?;
    let toplevel_window = toplevel
        .window()
        .ok_or(Error::NotRealized("toplevel window"))?;
    let window = widget.window().ok_or(Error::NotRealized("video widget"))?;

    let allocation = Rectangle::from(&widget.allocation());
    let (x, y) = widget
        .translate_coordinates(&toplevel, 0, 0)
        .unwrap_or((allocation.x, allocation.y));

    let parent_surface = gdk_wayland::wl_surface(&toplevel_window);
    let surface = gdk_wayland::custom_surface(&window);
    let display = gdk_wayland::wl_display(&widget.display());

    gstreamer::info!(
        CAT,
        "realize: parent_surface: {:#x}, surface {:#x}, x {}, y {}",
        parent_surface,
        surface,
        x,
        y
    );

    let subsurface = subcompositor.get_subsurface(surface, parent_surface)?;

    let window_handle = match kind {
        HandleKind::Legacy => WindowHandle::Legacy(Box::new(WaylandWindowHandle {
            display,
            surface,
            width: allocation.width,
            height: allocation.height,
        })),
        HandleKind::Surface => WindowHandle::Surface(surface),
    };

    // the subsurface is the sink's whole world, so its render rectangle
    // starts at the origin
    let local = Rectangle::new(0, 0, allocation.width, allocation.height);
    if !handles.publish(display, window_handle, local) {
        return Err(Error::HandleNotPublished);
    }

    coordinator
        .borrow_mut()
        .realized(allocation, (x, y), Some(subsurface));

    Ok(())
}

pub(super) fn run(settings: &Settings, kind: HandleKind, subcompositor: Subcompositor) -> Result<()> {
    let subcompositor = Rc::new(subcompositor);

    let shell = Shell::new();
    shell.quit_on_destroy();

    let handles = SharedHandles::new();
    let sink = ActiveSink::default();
    let coordinator: SubsurfaceCoordinator = Rc::new(RefCell::new(Coordinator::new(
        WaylandVideoSink::new(sink.clone()),
        GeometryProtocol::PauseResume,
        settings.freeze_policy,
    )));

    shell.video.connect_realize({
        let coordinator = coordinator.clone();
        let handles = handles.clone();
        let subcompositor = subcompositor.clone();
        move |widget| {
            if let Err(err) = realize(widget, &subcompositor, &handles, &coordinator, kind) {
                gstreamer::error!(CAT, "failed to set up video subsurface: {}", err);
            }
        }
    });

    shell.video.connect_unrealize({
        let coordinator = coordinator.clone();
        let handles = handles.clone();
        move |_| {
            gstreamer::info!(CAT, "unrealize");
            coordinator.borrow_mut().unrealized();
            handles.invalidate();
        }
    });

    shell.window.connect_configure_event({
        let coordinator = coordinator.clone();
        move |_, event| {
            let rect = Rectangle::from(event);
            gstreamer::debug!(CAT, "toplevel configure {:?}", rect);
            coordinator.borrow_mut().toplevel_configured(rect);
            glib::Propagation::Proceed
        }
    });

    shell.video.connect_configure_event({
        let coordinator = coordinator.clone();
        let handles = handles.clone();
        move |_, event| {
            let rect = Rectangle::from(event);
            gstreamer::debug!(CAT, "video configure {:?}", rect);
            handles.update_allocation(Rectangle::new(0, 0, rect.width, rect.height));
            coordinator.borrow_mut().widget_configured(rect);
            glib::Propagation::Proceed
        }
    });

    shell.video.connect_draw({
        let coordinator = coordinator.clone();
        move |widget, _cr| {
            coordinator
                .borrow_mut()
                .drawn(Rectangle::from(&widget.allocation()));
            glib::Propagation::Proceed
        }
    });

    shell.show_and_realize();
    super::ensure_published(&handles)?;

    let (pipeline, video_sink) = super::launch_pipeline(&settings.pipeline)?;
    sink.set(video_sink);

    let interceptor = BusInterceptor::new(
        handles,
        sink,
        InterceptorOptions {
            answer_context: kind == HandleKind::Surface,
            seed_render_rectangle: kind == HandleKind::Surface,
            track_sink: false,
        },
    );

    super::play(&pipeline, interceptor)
}
