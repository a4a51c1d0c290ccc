//! Audio-codec key probed with `ffprobe`.
//!
//! Groups video files whose first audio stream uses a caller-chosen codec;
//! everything else opts out. `ffprobe` must be discoverable via `PATH`.

use std::path::Path;
use std::process::Command;

use crate::error::Error;
use crate::keygen::media::is_video_ext;

/// Derive the audio-codec key for `path` against the `target` codec.
///
/// Non-video extensions opt out with an empty key. Video files whose
/// probed codec differs from `target` return [`Error::SkipFile`]; a
/// matching probe returns the raw `ffprobe` output as the key.
pub(crate) fn audio_codec_key(path: &Path, target: &str) -> Result<String, Error> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !is_video_ext(ext) {
        return Ok(String::new());
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=codec_name",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::FfprobeSpawn {
            path: path.to_path_buf(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(Error::FfprobeFailed {
            path: path.to_path_buf(),
            status: output.status,
        });
    }

    let codec = String::from_utf8_lossy(&output.stdout).into_owned();
    if codec.trim() == target {
        // The raw (untrimmed) probe output is the key.
        Ok(codec)
    } else {
        log::trace!(
            "codec mismatch for {}: got {:?}, want {target:?}",
            path.display(),
            codec.trim()
        );
        Err(Error::SkipFile)
    }
}
