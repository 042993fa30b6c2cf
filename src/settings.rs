use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::freeze::FreezePolicy;

pub const DEFAULT_PIPELINE: &str = "videotestsrc pattern=18 ! waylandsink name=sink";

/// Render a GStreamer video pipeline into a GTK window on Wayland.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about, long_about = None)]
pub struct Settings {
    /// Which toplevel configure events pause video rendering
    #[arg(long, value_enum, default_value_t = FreezePolicy::EveryConfigure)]
    pub freeze_policy: FreezePolicy,

    /// Pipeline description with an element named "sink"
    #[arg(long, env = "GTK_WAYLAND_VIDEO_PIPELINE", default_value = DEFAULT_PIPELINE)]
    pub pipeline: String,

    /// Do not paint a black background behind the video
    #[arg(long)]
    pub no_background: bool,

    #[command(subcommand)]
    pub variant: Variant,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// Subsurface, legacy window handle struct, pause/resume around resizes
    Subsurface,
    /// Subsurface, display handle via context, pause/resume around resizes
    SubsurfaceContext,
    /// Toplevel surface with a render rectangle updated on every paint
    RenderRectangle,
    /// playbin looping over a playlist, controlled from a UI definition file
    Playbin {
        /// UI definition to load instead of the installed window.ui
        #[arg(long)]
        ui_file: Option<PathBuf>,

        /// Media URIs or file paths, played in a loop
        uris: Vec<String>,
    },
}
