use std::path::PathBuf;

use gstreamer::glib;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize GTK: {0}")]
    GtkInit(glib::BoolError),

    #[error("failed to initialize GStreamer: {0}")]
    GstInit(glib::Error),

    #[error("the default display is not a Wayland display")]
    NotWayland,

    #[error("wayland registry roundtrip failed: {0}")]
    WaylandConnect(String),

    #[error("{0} is not realized")]
    NotRealized(&'static str),

    #[error("not a usable wl_surface: {0}")]
    ForeignSurface(String),

    /// The video widget was realized but no window handle was published
    /// before the pipeline was about to start.
    #[error("no window handle published after realizing the video widget")]
    HandleNotPublished,

    #[error("failed to load UI definition {}: {source}", path.display())]
    UiDefinition { path: PathBuf, source: glib::Error },

    #[error("no UI definition found, searched: {0}")]
    UiNotFound(String),

    #[error("UI definition has no object named {0:?}")]
    UiObject(&'static str),

    #[error("failed to parse pipeline: {0}")]
    Pipeline(#[from] glib::Error),

    #[error("pipeline has no element named \"sink\"")]
    MissingSink,

    #[error("pipeline has no bus")]
    MissingBus,

    #[error(transparent)]
    Glib(#[from] glib::BoolError),

    #[error("pipeline state change failed: {0}")]
    StateChange(#[from] gstreamer::StateChangeError),
}
