//! Render a GStreamer video sink into a GTK 3 window on Wayland.
//!
//! The crate keeps three lifecycles in step: the GTK video widget
//! (realize, configure, draw, unrealize), the Wayland surface or subsurface
//! behind it, and the window handle and render geometry of the video sink.
//! Enable logging with `GST_DEBUG=gtkwaylandvideo:5`.

use once_cell::sync::Lazy;

pub mod bus;
pub mod coordinator;
pub mod error;
pub mod freeze;
pub mod gdk_wayland;
pub mod geometry;
pub mod handle;
pub mod playlist;
pub mod settings;
pub mod sink;
pub mod subcompositor;
pub mod ui;
mod variants;
pub mod wayland_video;

pub use error::{Error, Result};
pub use settings::{Settings, Variant};

pub(crate) static CAT: Lazy<gstreamer::DebugCategory> = Lazy::new(|| {
    gstreamer::DebugCategory::new(
        "gtkwaylandvideo",
        gstreamer::DebugColorFlags::empty(),
        Some("GTK Wayland video embedding"),
    )
});

pub fn init() -> Result<()> {
    gtk::init().map_err(Error::GtkInit)?;
    gstreamer::init().map_err(Error::GstInit)?;
    Ok(())
}

/// Run the variant selected in `settings` until its window is closed.
pub fn run(settings: &Settings) -> Result<()> {
    variants::run(settings)
}
