//! Movie/TV title key derived from the file name.
//!
//! Groups releases of the same movie or episode while discarding quality,
//! resolution, codec, and release-group decorations. Both
//! `"Alien - 1979 - Bluray-1080p.mkv"` and `"Alien.1979.1080p.BluRay.x265.mkv"`
//! reduce to the key `Alien1979`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// Episode naming patterns: `S01E01`, `1x01`, `S01E01-E02`, `1x01-02`.
static TV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?)\s*(S\d+E\d+(?:-E\d+)?|\d+x\d+(?:-\d+)?)").unwrap());

/// Title followed by a four-digit year, with `.`/`-`/space separators.
static MOVIE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:.+?)(?:\s*[-.]\s*|\s+)(\d{4})").unwrap());

/// Separator and decoration characters removed from candidate keys.
const STRIPPED_CHARS: &str = ".- ()[]{},:;_";

const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "wmv", "mov", "flv", "webm", "mpeg"];

/// Whether the extension belongs to the video allow-list.
pub(crate) fn is_video_ext(ext: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&ext)
}

/// Derive the movie/TV key for `path`.
///
/// Files outside the video allow-list opt out with an empty key. The TV
/// pattern is tried before the movie pattern; when neither matches, the
/// unmodified file name is the key.
pub(crate) fn media_file_name_key(path: &Path) -> Result<String, Error> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !is_video_ext(ext) {
        return Ok(String::new());
    }

    if let Some(caps) = TV_PATTERN.captures(&file_name) {
        // "Breaking Bad - S01E01 - Bluray-1080p.mkv" -> "BreakingBadS01E01"
        let key = format!("{}{}", &caps[1], &caps[2]);
        return Ok(strip_separators(&key));
    }

    if let Some(m) = MOVIE_PATTERN.find(&file_name) {
        // "Alien - 1979 - Bluray-1080p.mkv" -> "Alien1979"
        return Ok(strip_separators(m.as_str()));
    }

    Ok(file_name)
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| !STRIPPED_CHARS.contains(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> String {
        media_file_name_key(Path::new(name)).unwrap()
    }

    #[test]
    fn test_movie_release_variants_share_a_key() {
        assert_eq!(key("Alien - 1979 - Bluray-1080p.mkv"), "Alien1979");
        assert_eq!(key("Alien.1979.1080p.BluRay.x265-RelGroup.mp4"), "Alien1979");
    }

    #[test]
    fn test_tv_episode_key() {
        assert_eq!(
            key("Breaking Bad - S01E01 - Pilot - Bluray-1080p.mkv"),
            "BreakingBadS01E01"
        );
        assert_eq!(key("Breaking.Bad.S01E01.720p.WEB-DL.mkv"), "BreakingBadS01E01");
    }

    #[test]
    fn test_multi_episode_formats_stay_distinct() {
        assert_eq!(
            key("Star Trek Deep Space Nine - S01E01-E02 - Emissary.mkv"),
            "StarTrekDeepSpaceNineS01E01E02"
        );
        assert_eq!(
            key("Star Trek Deep Space Nine - 1x01-02 - Emissary.mkv"),
            "StarTrekDeepSpaceNine1x0102"
        );
    }

    #[test]
    fn test_alternate_episode_notation() {
        assert_eq!(key("Firefly 1x01 Serenity.avi"), "Firefly1x01");
    }

    #[test]
    fn test_tv_pattern_wins_over_movie_pattern() {
        // A year in the title must not shadow the episode tag.
        assert_eq!(key("Show 1999 S01E01.mkv"), "Show1999S01E01");
    }

    #[test]
    fn test_unsupported_extension_opts_out() {
        assert_eq!(key("Breaking.Bad.S01E01....mp3"), "");
        assert_eq!(key("document.pdf"), "");
    }

    #[test]
    fn test_extension_case_is_significant() {
        // The allow-list is matched verbatim, as shipped.
        assert_eq!(key("Alien - 1979.MKV"), "");
    }

    #[test]
    fn test_unmatched_name_falls_back_to_file_name() {
        assert_eq!(key("homevideo.mp4"), "homevideo.mp4");
    }
}
