//! Video rendered into the toplevel surface, confined to the video widget by
//! the render rectangle.

use std::cell::RefCell;
use std::rc::Rc;

use gtk::glib;
use gtk::prelude::*;

use crate::bus::{BusInterceptor, InterceptorOptions};
use crate::coordinator::{Coordinator, GeometryProtocol};
use crate::error::Result;
use crate::gdk_wayland;
use crate::geometry::Rectangle;
use crate::handle::{SharedHandles, WindowHandle};
use crate::settings::Settings;
use crate::sink::{ActiveSink, WaylandVideoSink};
use crate::subcompositor::Subsurface;
use crate::ui::Shell;
use crate::CAT;

pub(super) type ToplevelCoordinator = Rc<RefCell<Coordinator<WaylandVideoSink, Subsurface>>>;

/// `after-paint` handler of the frame clock the video widget was realized on.
#[derive(Debug, Default)]
struct AfterPaintHook(Option<(gdk::FrameClock, glib::SignalHandlerId)>);

impl AfterPaintHook {
    fn connect(&mut self, frame_clock: gdk::FrameClock, f: impl Fn(&gdk::FrameClock) + 'static) {
        self.disconnect();
        let id = frame_clock.connect_after_paint(f);
        self.0 = Some((frame_clock, id));
    }

    fn disconnect(&mut self) {
        if let Some((frame_clock, id)) = self.0.take() {
            frame_clock.disconnect(id);
        }
    }

    fn is_connected(&self) -> bool {
        self.0.is_some()
    }
}

/// Signal state of a video widget wired by [`attach`].
#[derive(Debug)]
pub(super) struct ToplevelVideo {
    coordinator: ToplevelCoordinator,
    after_paint: Rc<RefCell<AfterPaintHook>>,
}

impl ToplevelVideo {
    pub(super) fn log_realized(&self) {
        let coordinator = self.coordinator.borrow();
        gstreamer::debug!(
            CAT,
            "video widget realized: {}, allocation {:?}, after-paint hook: {}",
            coordinator.is_realized(),
            coordinator.allocation(),
            self.after_paint.borrow().is_connected()
        );
    }
}

/// Wire the video widget of `shell` so that it publishes the toplevel surface
/// on realize and keeps the render rectangle of `sink` in line with its
/// allocation.
pub(super) fn attach(
    shell: &Shell,
    handles: &SharedHandles,
    sink: ActiveSink,
    protocol: GeometryProtocol,
    settings: &Settings,
) -> ToplevelVideo {
    let coordinator = Rc::new(RefCell::new(Coordinator::new(
        WaylandVideoSink::new(sink),
        protocol,
        settings.freeze_policy,
    )));
    let after_paint = Rc::new(RefCell::new(AfterPaintHook::default()));

    shell.video.connect_realize({
        let coordinator = coordinator.clone();
        let handles = handles.clone();
        let after_paint = after_paint.clone();
        move |widget| {
            let Some(toplevel) = widget.toplevel().and_then(|toplevel| toplevel.window()) else {
                gstreamer::warning!(CAT, "video widget realized without a toplevel window");
                return;
            };

            let display = gdk_wayland::wl_display(&widget.display());
            let surface = gdk_wayland::wl_surface(&toplevel);
            let allocation = Rectangle::from(&widget.allocation());

            gstreamer::info!(
                CAT,
                "realize: display {:#x}, surface {:#x}, allocation {:?}",
                display,
                surface,
                allocation
            );

            if !handles.publish(display, WindowHandle::Surface(surface), allocation) {
                gstreamer::warning!(CAT, "toplevel has no wayland surface");
                return;
            }

            coordinator
                .borrow_mut()
                .realized(allocation, (allocation.x, allocation.y), None);

            if let Some(frame_clock) = widget.frame_clock() {
                let coordinator = coordinator.clone();
                after_paint
                    .borrow_mut()
                    .connect(frame_clock, move |_| coordinator.borrow_mut().after_paint());
            }
        }
    });

    shell.video.connect_unrealize({
        let coordinator = coordinator.clone();
        let handles = handles.clone();
        let after_paint = after_paint.clone();
        move |_| {
            gstreamer::info!(CAT, "unrealize");
            after_paint.borrow_mut().disconnect();
            coordinator.borrow_mut().unrealized();
            handles.invalidate();
        }
    });

    shell.window.connect_configure_event({
        let coordinator = coordinator.clone();
        move |_, event| {
            coordinator.borrow_mut().toplevel_configured(Rectangle::from(event));
            glib::Propagation::Proceed
        }
    });

    let paint_background = !settings.no_background;
    shell.video.connect_draw({
        let coordinator = coordinator.clone();
        let handles = handles.clone();
        move |widget, cr| {
            let allocation = Rectangle::from(&widget.allocation());

            if paint_background {
                cr.set_source_rgb(0.0, 0.0, 0.0);
                if let Err(err) = cr.paint() {
                    gstreamer::warning!(CAT, "failed to paint background: {}", err);
                }
            }

            handles.update_allocation(allocation);
            coordinator.borrow_mut().drawn(allocation);
            glib::Propagation::Proceed
        }
    });

    ToplevelVideo {
        coordinator,
        after_paint,
    }
}

pub(super) fn run(settings: &Settings, protocol: GeometryProtocol) -> Result<()> {
    let shell = Shell::new();
    shell.quit_on_destroy();

    let handles = SharedHandles::new();
    let sink = ActiveSink::default();
    let video = attach(&shell, &handles, sink.clone(), protocol, settings);

    shell.show_and_realize();
    video.log_realized();
    super::ensure_published(&handles)?;

    let (pipeline, video_sink) = super::launch_pipeline(&settings.pipeline)?;
    sink.set(video_sink);

    let interceptor = BusInterceptor::new(
        handles,
        sink,
        InterceptorOptions {
            answer_context: true,
            seed_render_rectangle: true,
            track_sink: false,
        },
    );

    super::play(&pipeline, interceptor)
}
