use std::path::Path;

use gstreamer::glib;

use crate::CAT;

/// URIs played one after the other, starting over after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    uris: Vec<String>,
    current: usize,
}

impl Playlist {
    /// Returns `None` for an empty list.
    pub fn new(uris: Vec<String>) -> Option<Self> {
        if uris.is_empty() {
            return None;
        }

        Some(Self { uris, current: 0 })
    }

    /// Build from command line arguments, turning plain paths into `file://`
    /// URIs. Arguments that are neither are skipped.
    pub fn from_args<I, S>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let uris = args
            .into_iter()
            .filter_map(|arg| {
                let arg = arg.as_ref();
                if glib::uri_parse_scheme(arg).is_some() {
                    return Some(arg.to_owned());
                }

                let path = Path::new(arg);
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    std::env::current_dir().unwrap_or_default().join(path)
                };

                match glib::filename_to_uri(&path, None) {
                    Ok(uri) => Some(uri.to_string()),
                    Err(err) => {
                        gstreamer::warning!(CAT, "skipping {}: {}", arg, err);
                        None
                    }
                }
            })
            .collect();

        Self::new(uris)
    }

    pub fn current(&self) -> &str {
        &self.uris[self.current]
    }

    pub fn position(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Move to the next URI, wrapping after the last, and return it.
    pub fn advance(&mut self) -> &str {
        self.current = (self.current + 1) % self.uris.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> Playlist {
        Playlist::new(vec![
            "file:///a.webm".to_owned(),
            "file:///b.webm".to_owned(),
            "file:///c.webm".to_owned(),
        ])
        .unwrap()
    }

    #[test]
    fn empty_playlist_is_none() {
        assert!(Playlist::new(Vec::new()).is_none());
    }

    #[test]
    fn advance_wraps_after_last() {
        let mut playlist = three();
        assert_eq!(playlist.current(), "file:///a.webm");

        let order: Vec<String> = (0..7).map(|_| playlist.advance().to_owned()).collect();
        assert_eq!(
            order,
            [
                "file:///b.webm",
                "file:///c.webm",
                "file:///a.webm",
                "file:///b.webm",
                "file:///c.webm",
                "file:///a.webm",
                "file:///b.webm",
            ]
        );
        assert!(playlist.position() < playlist.len());
    }

    #[test]
    fn single_entry_repeats() {
        let mut playlist = Playlist::new(vec!["file:///only.webm".to_owned()]).unwrap();
        assert_eq!(playlist.advance(), "file:///only.webm");
        assert_eq!(playlist.position(), 0);
    }

    #[test]
    fn paths_become_file_uris() {
        gstreamer::init().unwrap();

        let playlist = Playlist::from_args(["/tmp/clip.webm", "https://example.com/v.webm"]).unwrap();
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.current(), "file:///tmp/clip.webm");
        let mut playlist = playlist;
        assert_eq!(playlist.advance(), "https://example.com/v.webm");
    }

    #[test]
    fn uris_with_scheme_are_kept() {
        let playlist = Playlist::from_args([
            "rtsp+tcp://camera.local/stream",
            "file:///srv/media/a.webm",
        ])
        .unwrap();
        assert_eq!(playlist.current(), "rtsp+tcp://camera.local/stream");

        let relative = Playlist::from_args(["clips/b.webm"]).unwrap();
        assert!(relative.current().starts_with("file:///"));
        assert!(relative.current().ends_with("/clips/b.webm"));
    }
}
