use std::path::Path;
use std::sync::{Arc, Mutex};

use gstreamer::glib;
use gstreamer::prelude::*;

use crate::bus::{BusInterceptor, InterceptorOptions};
use crate::coordinator::GeometryProtocol;
use crate::error::Result;
use crate::handle::SharedHandles;
use crate::playlist::Playlist;
use crate::settings::Settings;
use crate::sink::ActiveSink;
use crate::ui::Shell;
use crate::CAT;

/// A playbin rendering through `waylandsink` that starts over with the next
/// playlist entry whenever the current one is about to finish.
fn build_playbin(playlist: Playlist, sink: &ActiveSink) -> Result<gstreamer::Element> {
    let video_sink = gstreamer::ElementFactory::make("waylandsink").build()?;
    let playbin = gstreamer::ElementFactory::make("playbin")
        .property("uri", playlist.current())
        .property("video-sink", &video_sink)
        .build()?;
    sink.set(video_sink);

    gstreamer::info!(
        CAT,
        obj: &playbin,
        "playing {} of {}: {}",
        playlist.position() + 1,
        playlist.len(),
        playlist.current()
    );

    let playlist = Arc::new(Mutex::new(playlist));
    playbin.connect("about-to-finish", false, move |args| {
        let Some(Ok(playbin)) = args.first().map(|value| value.get::<gstreamer::Element>()) else {
            return None;
        };

        let mut playlist = playlist.lock().unwrap();
        let uri = playlist.advance();
        gstreamer::info!(CAT, obj: &playbin, "about to finish, next {}", uri);
        playbin.set_property("uri", uri);

        None::<glib::Value>
    });

    Ok(playbin)
}

pub(super) fn run(settings: &Settings, ui_file: Option<&Path>, uris: &[String]) -> Result<()> {
    let shell = Shell::from_ui_file(ui_file)?;
    shell.quit_on_destroy();

    let handles = SharedHandles::new();
    let sink = ActiveSink::default();
    let video = super::toplevel::attach(
        &shell,
        &handles,
        sink.clone(),
        GeometryProtocol::RenderRectangle,
        settings,
    );

    shell.show_and_realize();
    video.log_realized();
    super::ensure_published(&handles)?;

    let pipeline = match Playlist::from_args(uris) {
        Some(playlist) => build_playbin(playlist, &sink)?,
        None => {
            gstreamer::info!(CAT, "no media given, playing the test pattern");
            let (pipeline, video_sink) = super::launch_pipeline(&settings.pipeline)?;
            sink.set(video_sink);
            pipeline
        }
    };

    shell.connect_state_buttons(&pipeline);

    let interceptor = BusInterceptor::new(
        handles,
        sink,
        InterceptorOptions {
            answer_context: true,
            seed_render_rectangle: true,
            track_sink: true,
        },
    );

    super::play(&pipeline, interceptor)
}
