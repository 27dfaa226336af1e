//! Audio cues at session start and stop.
//!
//! Fire-and-forget: a missing file or a broken playback device must
//! never abort the session, so every failure path ends at a log line.
//! Compiled out entirely unless the `audio` feature is enabled.

use std::path::{Path, PathBuf};

/// Plays the cue at `path` if one is configured.
pub fn play(path: Option<&PathBuf>) {
    let Some(path) = path else {
        return;
    };
    play_file(path);
}

#[cfg(feature = "audio")]
fn play_file(path: &Path) {
    use tracing::warn;

    let path = path.to_owned();
    std::thread::spawn(move || {
        let result = (|| -> Result<(), Box<dyn std::error::Error>> {
            let file = std::fs::File::open(&path)?;
            let (_stream, handle) = rodio::OutputStream::try_default()?;
            let sink = rodio::Sink::try_new(&handle)?;
            sink.append(rodio::Decoder::new(std::io::BufReader::new(file))?);
            sink.sleep_until_end();
            Ok(())
        })();
        if let Err(e) = result {
            warn!("Audio cue {} failed: {}", path.display(), e);
        }
    });
}

#[cfg(not(feature = "audio"))]
fn play_file(path: &Path) {
    tracing::debug!(
        "Audio cues disabled at compile time, skipping {}",
        path.display()
    );
}
