use gstreamer::prelude::*;
use gtk::glib;

use crate::bus::BusInterceptor;
use crate::coordinator::GeometryProtocol;
use crate::error::{Error, Result};
use crate::gdk_wayland;
use crate::handle::SharedHandles;
use crate::settings::{Settings, Variant};
use crate::subcompositor::find_subcompositor;
use crate::CAT;

mod playbin;
mod subsurface;
mod toplevel;

pub use subsurface::HandleKind;

pub fn run(settings: &Settings) -> Result<()> {
    match &settings.variant {
        Variant::Subsurface => run_subsurface(settings, HandleKind::Legacy),
        Variant::SubsurfaceContext => run_subsurface(settings, HandleKind::Surface),
        Variant::RenderRectangle => toplevel::run(settings, GeometryProtocol::Bracket),
        Variant::Playbin { ui_file, uris } => playbin::run(settings, ui_file.as_deref(), uris),
    }
}

/// How the video ends up on screen.
#[derive(Debug, PartialEq, Eq)]
enum Embedding<S> {
    Subsurface(HandleKind, S),
    Toplevel(GeometryProtocol),
}

/// Subsurface variants render into the toplevel surface instead when the
/// compositor has no `wl_subcompositor`.
fn subsurface_embedding<S>(kind: HandleKind, subcompositor: Option<S>) -> Embedding<S> {
    match subcompositor {
        Some(subcompositor) => Embedding::Subsurface(kind, subcompositor),
        None => Embedding::Toplevel(GeometryProtocol::Bracket),
    }
}

fn run_subsurface(settings: &Settings, kind: HandleKind) -> Result<()> {
    let display = gdk::Display::default().ok_or(Error::NotWayland)?;
    if !gdk_wayland::is_wayland_display(&display) {
        return Err(Error::NotWayland);
    }

    let subcompositor = find_subcompositor(gdk_wayland::wl_display(&display))?;
    match subsurface_embedding(kind, subcompositor) {
        Embedding::Subsurface(kind, subcompositor) => subsurface::run(settings, kind, subcompositor),
        Embedding::Toplevel(protocol) => {
            gstreamer::warning!(
                CAT,
                "no wl_subcompositor, rendering into the toplevel surface instead"
            );
            toplevel::run(settings, protocol)
        }
    }
}

/// The pipeline must not start before the video widget published its handle.
fn ensure_published(handles: &SharedHandles) -> Result<()> {
    if handles.is_published() {
        Ok(())
    } else {
        Err(Error::HandleNotPublished)
    }
}

/// Parse `description` and look up the element named "sink" in it.
fn launch_pipeline(description: &str) -> Result<(gstreamer::Element, gstreamer::Element)> {
    let pipeline = gstreamer::parse_launch(description)?;

    let sink = match pipeline.downcast_ref::<gstreamer::Bin>() {
        Some(bin) => bin.by_name("sink"),
        None if pipeline.name().as_str() == "sink" => Some(pipeline.clone()),
        None => None,
    }
    .ok_or(Error::MissingSink)?;

    gstreamer::debug!(CAT, obj: &sink, "video sink of {}", description);
    Ok((pipeline, sink))
}

/// Install `interceptor`, play `pipeline` until the GTK main loop quits and
/// shut it down again.
fn play(pipeline: &gstreamer::Element, interceptor: BusInterceptor) -> Result<()> {
    let bus = pipeline.bus().ok_or(Error::MissingBus)?;
    interceptor.install(&bus);

    let _watch = bus.add_watch_local(|_bus, msg| {
        use gstreamer::MessageView;

        match msg.view() {
            MessageView::Error(err) => {
                gstreamer::error!(
                    CAT,
                    "error from {:?}: {} ({:?})",
                    err.src().map(|src| src.path_string()),
                    err.error(),
                    err.debug()
                );
                gtk::main_quit();
            }
            MessageView::Warning(warning) => {
                gstreamer::warning!(
                    CAT,
                    "warning from {:?}: {} ({:?})",
                    warning.src().map(|src| src.path_string()),
                    warning.error(),
                    warning.debug()
                );
            }
            MessageView::Eos(..) => gstreamer::info!(CAT, "end of stream"),
            _ => (),
        }

        glib::ControlFlow::Continue
    })?;

    pipeline.set_state(gstreamer::State::Playing)?;
    gtk::main();
    pipeline.set_state(gstreamer::State::Null)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsurface_used_when_available() {
        assert_eq!(
            subsurface_embedding(HandleKind::Legacy, Some(())),
            Embedding::Subsurface(HandleKind::Legacy, ())
        );
        assert_eq!(
            subsurface_embedding(HandleKind::Surface, Some(())),
            Embedding::Subsurface(HandleKind::Surface, ())
        );
    }

    #[test]
    fn missing_subcompositor_falls_back_to_toplevel() {
        for kind in [HandleKind::Legacy, HandleKind::Surface] {
            assert_eq!(
                subsurface_embedding::<()>(kind, None),
                Embedding::Toplevel(GeometryProtocol::Bracket)
            );
        }
    }
}
