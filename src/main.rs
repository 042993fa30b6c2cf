use std::process::ExitCode;

use clap::Parser;

use gstgtkwaylandembed::Settings;

fn main() -> ExitCode {
    let settings = Settings::parse();

    match gstgtkwaylandembed::init().and_then(|()| gstgtkwaylandembed::run(&settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gtk-wayland-video: {err}");
            ExitCode::FAILURE
        }
    }
}
