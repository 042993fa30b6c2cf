use std::path::{Path, PathBuf};

use gtk::glib;
use gtk::prelude::*;

use crate::error::{Error, Result};
use crate::CAT;

pub const WINDOW_TITLE: &str = "GStreamer Wayland Demo";
pub const UI_FILE_NAME: &str = "window.ui";
pub const DATA_SUBDIR: &str = "gtk-wayland-video";

const STATE_BUTTONS: [(&str, gstreamer::State); 4] = [
    ("button_play", gstreamer::State::Playing),
    ("button_pause", gstreamer::State::Paused),
    ("button_ready", gstreamer::State::Ready),
    ("button_null", gstreamer::State::Null),
];

#[derive(Debug)]
pub struct Shell {
    pub window: gtk::Window,
    pub video: gtk::Widget,
    buttons: Vec<(gtk::Button, gstreamer::State)>,
}

fn prepare_video_widget(video: &gtk::Widget) {
    video.add_events(gdk::EventMask::STRUCTURE_MASK);
    // the sink paints into the widget's surface behind GTK's back
    #[allow(deprecated)]
    video.set_double_buffered(false);
    video.set_app_paintable(true);
}

impl Shell {
    /// A toplevel window holding nothing but the video widget.
    pub fn new() -> Self {
        let window = gtk::Window::new(gtk::WindowType::Toplevel);
        window.set_title(WINDOW_TITLE);
        window.set_default_size(640, 480);

        let video = gtk::DrawingArea::new();
        window.add(&video);

        let video = video.upcast::<gtk::Widget>();
        prepare_video_widget(&video);

        Self {
            window,
            video,
            buttons: Vec::new(),
        }
    }

    /// Load the window, video widget and state buttons from a UI definition.
    pub fn from_ui_file(explicit: Option<&Path>) -> Result<Self> {
        let candidates = ui_file_candidates(explicit);
        let Some(path) = candidates.iter().find(|path| path.is_file()) else {
            let searched = candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::UiNotFound(searched));
        };

        gstreamer::info!(CAT, "loading UI definition {}", path.display());

        let builder = gtk::Builder::new();
        builder
            .add_from_file(path)
            .map_err(|source| Error::UiDefinition {
                path: path.clone(),
                source,
            })?;

        let window = builder
            .object::<gtk::Window>("window")
            .ok_or(Error::UiObject("window"))?;
        let video = builder
            .object::<gtk::Widget>("video")
            .ok_or(Error::UiObject("video"))?;
        prepare_video_widget(&video);

        let buttons = STATE_BUTTONS
            .iter()
            .map(|(name, state)| {
                builder
                    .object::<gtk::Button>(name)
                    .map(|button| (button, *state))
                    .ok_or(Error::UiObject(*name))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            window,
            video,
            buttons,
        })
    }

    /// Quit the GTK main loop once the window is closed.
    pub fn quit_on_destroy(&self) {
        self.window.connect_destroy(|_| gtk::main_quit());
    }

    /// Make each state button switch `pipeline` to its state.
    pub fn connect_state_buttons(&self, pipeline: &gstreamer::Element) {
        for (button, state) in self.buttons.iter() {
            let pipeline = pipeline.downgrade();
            let state = *state;
            button.connect_clicked(move |_| {
                let Some(pipeline) = pipeline.upgrade() else {
                    return;
                };
                if let Err(err) = pipeline.set_state(state) {
                    gstreamer::error!(CAT, obj: &pipeline, "failed to switch to {:?}: {}", state, err);
                }
            });
        }
    }

    /// Show everything and realize it right away, so the video widget has its
    /// native surface before the pipeline starts.
    pub fn show_and_realize(&self) {
        self.window.show_all();
        self.window.realize();
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the UI definition is looked for, in order.
pub fn ui_file_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(explicit) = explicit {
        return vec![explicit.to_path_buf()];
    }

    glib::system_data_dirs()
        .into_iter()
        .map(|dir| dir.join(DATA_SUBDIR).join(UI_FILE_NAME))
        .chain(std::iter::once(Path::new("data").join(UI_FILE_NAME)))
        .collect()
}
