//! Synchronous bus handler handing the published window and display handles
//! to the video sink.

use gstreamer::prelude::*;
use gstreamer_video::prelude::*;

use crate::handle::SharedHandles;
use crate::sink::{set_render_rectangle, ActiveSink};
use crate::wayland_video;
use crate::CAT;

/// Bus messages the interceptor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusRequest {
    /// An element needs the Wayland display handle context.
    NeedContext { context_type: String },
    /// A video overlay is about to need a window to render into.
    PrepareWindowHandle,
    Other,
}

impl BusRequest {
    pub fn classify(msg: &gstreamer::MessageRef) -> Self {
        if gstreamer_video::is_video_overlay_prepare_window_handle_message(msg) {
            return BusRequest::PrepareWindowHandle;
        }

        match msg.view() {
            gstreamer::MessageView::NeedContext(need_context)
                if wayland_video::is_display_handle_context_type(need_context.context_type()) =>
            {
                BusRequest::NeedContext {
                    context_type: need_context.context_type().to_owned(),
                }
            }
            _ => BusRequest::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterceptorOptions {
    /// Answer display handle context requests.
    pub answer_context: bool,
    /// Set the recorded allocation as render rectangle together with the
    /// window handle.
    pub seed_render_rectangle: bool,
    /// Make the element asking for the window handle the active sink.
    pub track_sink: bool,
}

#[derive(Debug, Clone)]
pub struct BusInterceptor {
    handles: SharedHandles,
    active_sink: ActiveSink,
    options: InterceptorOptions,
}

impl BusInterceptor {
    pub fn new(handles: SharedHandles, active_sink: ActiveSink, options: InterceptorOptions) -> Self {
        Self {
            handles,
            active_sink,
            options,
        }
    }

    /// Install as the sync handler of `bus`, replacing any previous one.
    pub fn install(self, bus: &gstreamer::Bus) {
        bus.set_sync_handler(move |_bus, msg| self.handle(msg));
    }

    /// May be called from any thread.
    pub fn handle(&self, msg: &gstreamer::MessageRef) -> gstreamer::BusSyncReply {
        match BusRequest::classify(msg) {
            BusRequest::NeedContext { context_type } if self.options.answer_context => {
                self.provide_context(msg, &context_type)
            }
            BusRequest::PrepareWindowHandle => self.provide_window_handle(msg),
            BusRequest::NeedContext { .. } | BusRequest::Other => gstreamer::BusSyncReply::Pass,
        }
    }

    fn source_element(msg: &gstreamer::MessageRef) -> Option<gstreamer::Element> {
        msg.src()
            .and_then(|src| src.downcast_ref::<gstreamer::Element>())
            .cloned()
    }

    fn provide_context(
        &self,
        msg: &gstreamer::MessageRef,
        context_type: &str,
    ) -> gstreamer::BusSyncReply {
        let Some(published) = self.handles.published() else {
            gstreamer::warning!(CAT, "{} requested before the display handle was published", context_type);
            return gstreamer::BusSyncReply::Pass;
        };

        let Some(element) = Self::source_element(msg) else {
            return gstreamer::BusSyncReply::Pass;
        };

        let Some(context) = wayland_video::display_handle_context(context_type, published.display)
        else {
            gstreamer::warning!(CAT, obj: &element, "cannot create {}", context_type);
            return gstreamer::BusSyncReply::Pass;
        };

        gstreamer::debug!(CAT, obj: &element, "providing {} for display {:#x}", context_type, published.display);
        element.set_context(&context);
        gstreamer::BusSyncReply::Drop
    }

    fn provide_window_handle(&self, msg: &gstreamer::MessageRef) -> gstreamer::BusSyncReply {
        let Some(published) = self.handles.published() else {
            gstreamer::warning!(CAT, "window handle requested before it was published");
            return gstreamer::BusSyncReply::Pass;
        };

        let Some(element) = Self::source_element(msg) else {
            return gstreamer::BusSyncReply::Pass;
        };

        let Some(overlay) = element.dynamic_cast_ref::<gstreamer_video::VideoOverlay>() else {
            gstreamer::warning!(CAT, obj: &element, "window handle requested by a non video overlay");
            return gstreamer::BusSyncReply::Pass;
        };

        gstreamer::info!(
            CAT,
            obj: &element,
            "setting window handle {:#x} (surface {:#x})",
            published.window_handle,
            published.surface
        );
        unsafe { overlay.set_window_handle(published.window_handle) };

        if self.options.seed_render_rectangle {
            set_render_rectangle(&element, published.allocation);
        }

        if self.options.track_sink {
            self.active_sink.set(element);
        }

        gstreamer::BusSyncReply::Drop
    }
}
