//! Pluggable file fingerprints ("key generators").
//!
//! A key generator maps a file path to a string key; files whose keys
//! compare equal are reported as duplicates. The contract has three
//! observable outcomes:
//!
//! 1. **Accept** — `Ok(key)` with a non-empty key: the observation is
//!    delivered to the aggregator.
//! 2. **Opt out** — `Ok("")` or [`Error::SkipFile`]: the file is silently
//!    excluded from the run.
//! 3. **Fail** — any other error: propagated as the run's error.
//!
//! The built-in generators cover content hashing (CRC32 and SHA-256, over
//! the first 16 KiB or the whole file), movie/TV release grouping by file
//! name, and audio-codec grouping via `ffprobe`. Arbitrary logic plugs in
//! through [`KeyGenerator::Custom`].

pub mod codec;
pub mod media;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::Error;

/// Number of bytes hashed by the prefix variants.
pub const PREFIX_LEN: u64 = 16 * 1024;

/// Signature for user-supplied key generators.
pub type CustomKeyFn = dyn Fn(&Path) -> Result<String, Error> + Send + Sync;

/// Selects how file fingerprints are derived.
///
/// The built-in variants are plain tags so a front-end can persist its
/// selection by [`name`](KeyGenerator::name); closures plug in via
/// [`KeyGenerator::Custom`].
#[derive(Clone)]
pub enum KeyGenerator {
    /// CRC32 of the first 16 KiB of the file contents. The default.
    Crc32Prefix,
    /// CRC32 of the entire file contents.
    Crc32Full,
    /// SHA-256 of the first 16 KiB of the file contents.
    Sha256Prefix,
    /// SHA-256 of the entire file contents.
    Sha256Full,
    /// Movie/TV title key parsed from the file name (see [`media`]).
    MediaFileName,
    /// Audio-codec key probed with `ffprobe` (see [`codec`]). Only files
    /// whose first audio stream matches the given codec produce a key.
    AudioCodec {
        /// Codec name to group by, e.g. `aac`, `ac3`, `dts`, `opus`.
        codec: String,
    },
    /// Caller-supplied generator.
    Custom(Arc<CustomKeyFn>),
}

impl KeyGenerator {
    /// Build the audio-codec generator for the given target codec.
    #[must_use]
    pub fn audio_codec(codec: impl Into<String>) -> Self {
        Self::AudioCodec {
            codec: codec.into(),
        }
    }

    /// Wrap a closure as a key generator.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Path) -> Result<String, Error> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Derive the key for a single file.
    pub fn key_for(&self, path: &Path) -> Result<String, Error> {
        match self {
            Self::Crc32Prefix => crc32_key(path, Some(PREFIX_LEN)),
            Self::Crc32Full => crc32_key(path, None),
            Self::Sha256Prefix => sha256_key(path, Some(PREFIX_LEN)),
            Self::Sha256Full => sha256_key(path, None),
            Self::MediaFileName => media::media_file_name_key(path),
            Self::AudioCodec { codec } => codec::audio_codec_key(path, codec),
            Self::Custom(f) => f(path),
        }
    }

    /// Stable identifier for this generator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crc32Prefix => "crc32-prefix",
            Self::Crc32Full => "crc32-full",
            Self::Sha256Prefix => "sha256-prefix",
            Self::Sha256Full => "sha256-full",
            Self::MediaFileName => "media-filename",
            Self::AudioCodec { .. } => "audio-codec",
            Self::Custom(_) => "custom",
        }
    }

    /// Human-readable description, suitable for a selection menu.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Crc32Prefix => "CRC32 of the first 16 KiB of the file contents.",
            Self::Crc32Full => "CRC32 of the entire file contents. Slower, but more accurate.",
            Self::Sha256Prefix => "SHA-256 of the first 16 KiB of the file contents.",
            Self::Sha256Full => "SHA-256 of the entire file contents. Slower, but more accurate.",
            Self::MediaFileName => "Groups movie/TV releases by the title parsed from the file name.",
            Self::AudioCodec { .. } => "Groups video files by their audio codec. Requires ffprobe.",
            Self::Custom(_) => "Caller-supplied key generator.",
        }
    }

    /// Look up a parameterless built-in generator by name.
    ///
    /// `audio-codec` is deliberately absent: it needs a target codec, so
    /// front-ends construct it via [`KeyGenerator::audio_codec`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "crc32-prefix" => Some(Self::Crc32Prefix),
            "crc32-full" => Some(Self::Crc32Full),
            "sha256-prefix" => Some(Self::Sha256Prefix),
            "sha256-full" => Some(Self::Sha256Full),
            "media-filename" => Some(Self::MediaFileName),
            _ => None,
        }
    }

    /// All built-in generator names with their descriptions, for menus.
    #[must_use]
    pub fn builtin_names() -> &'static [(&'static str, &'static str)] {
        &[
            (
                "crc32-prefix",
                "CRC32 of the first 16 KiB of the file contents.",
            ),
            (
                "crc32-full",
                "CRC32 of the entire file contents. Slower, but more accurate.",
            ),
            (
                "sha256-prefix",
                "SHA-256 of the first 16 KiB of the file contents.",
            ),
            (
                "sha256-full",
                "SHA-256 of the entire file contents. Slower, but more accurate.",
            ),
            (
                "media-filename",
                "Groups movie/TV releases by the title parsed from the file name.",
            ),
            (
                "audio-codec",
                "Groups video files by their audio codec. Requires ffprobe.",
            ),
        ]
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::Crc32Prefix
    }
}

impl fmt::Debug for KeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AudioCodec { codec } => write!(f, "AudioCodec({codec})"),
            other => f.write_str(other.name()),
        }
    }
}

impl fmt::Display for KeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Feed a reader into `update` in fixed-size chunks until EOF.
fn feed<R: Read>(mut reader: R, mut update: impl FnMut(&[u8])) -> std::io::Result<()> {
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        update(&buf[..n]);
    }
}

/// CRC32/IEEE of the file contents, hex-encoded.
///
/// With `limit`, hashes at most that many leading bytes; reaching EOF
/// earlier is not an error.
fn crc32_key(path: &Path, limit: Option<u64>) -> Result<String, Error> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = crc32fast::Hasher::new();
    let result = match limit {
        Some(n) => feed(file.take(n), |chunk| hasher.update(chunk)),
        None => feed(file, |chunk| hasher.update(chunk)),
    };
    result.map_err(|e| Error::io(path, e))?;
    Ok(format!("{:08x}", hasher.finalize()))
}

/// SHA-256 of the file contents, hex-encoded.
fn sha256_key(path: &Path, limit: Option<u64>) -> Result<String, Error> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    let result = match limit {
        Some(n) => feed(file.take(n), |chunk| hasher.update(chunk)),
        None => feed(file, |chunk| hasher.update(chunk)),
    };
    result.map_err(|e| Error::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_crc32_known_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "Hello, World!").unwrap();

        // CRC32/IEEE of "Hello, World!".
        let key = crc32_key(&path, None).unwrap();
        assert_eq!(key, "ec4ac3d0");
    }

    #[test]
    fn test_equal_contents_equal_keys() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, "Hello, World!").unwrap();
        fs::write(&b, "Hello, World!").unwrap();

        for gen in [
            KeyGenerator::Crc32Prefix,
            KeyGenerator::Crc32Full,
            KeyGenerator::Sha256Prefix,
            KeyGenerator::Sha256Full,
        ] {
            assert_eq!(gen.key_for(&a).unwrap(), gen.key_for(&b).unwrap(), "{gen}");
        }
    }

    #[test]
    fn test_distinct_contents_distinct_keys() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, "Go rocks!").unwrap();
        fs::write(&b, "JavaScript rocks!").unwrap();

        let gen = KeyGenerator::Crc32Prefix;
        assert_ne!(gen.key_for(&a).unwrap(), gen.key_for(&b).unwrap());
    }

    #[test]
    fn test_prefix_ignores_tail() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");

        let prefix = vec![0xabu8; PREFIX_LEN as usize];
        let mut long_a = prefix.clone();
        long_a.extend_from_slice(b"tail one");
        let mut long_b = prefix;
        long_b.extend_from_slice(b"another tail");
        fs::write(&a, &long_a).unwrap();
        fs::write(&b, &long_b).unwrap();

        assert_eq!(
            KeyGenerator::Sha256Prefix.key_for(&a).unwrap(),
            KeyGenerator::Sha256Prefix.key_for(&b).unwrap()
        );
        assert_ne!(
            KeyGenerator::Sha256Full.key_for(&a).unwrap(),
            KeyGenerator::Sha256Full.key_for(&b).unwrap()
        );
    }

    #[test]
    fn test_short_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.bin");
        fs::write(&path, "x").unwrap();

        assert!(KeyGenerator::Crc32Prefix.key_for(&path).is_ok());
        assert!(KeyGenerator::Sha256Prefix.key_for(&path).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = KeyGenerator::Crc32Full
            .key_for(Path::new("/definitely/not/here.bin"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_keys_are_lowercase_hex() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.bin");
        fs::write(&path, "payload").unwrap();

        let crc = KeyGenerator::Crc32Full.key_for(&path).unwrap();
        let sha = KeyGenerator::Sha256Full.key_for(&path).unwrap();
        assert_eq!(crc.len(), 8);
        assert_eq!(sha.len(), 64);
        for key in [crc, sha] {
            assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_from_name_roundtrip() {
        for (name, _) in KeyGenerator::builtin_names() {
            if *name == "audio-codec" {
                assert!(KeyGenerator::from_name(name).is_none());
                continue;
            }
            let gen = KeyGenerator::from_name(name).unwrap();
            assert_eq!(gen.name(), *name);
        }
        assert!(KeyGenerator::from_name("md5").is_none());
    }

    #[test]
    fn test_custom_generator() {
        let gen = KeyGenerator::custom(|path| Ok(path.to_string_lossy().into_owned()));
        assert_eq!(gen.key_for(Path::new("/a/b")).unwrap(), "/a/b");
        assert_eq!(gen.name(), "custom");
    }
}
