//! Audio source references and transport state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Media formats the playback backend can decode
const MEDIA_EXTENSIONS: &[&str] = &["wav", "wave"];

/// Extensions recognised as audio files but not decodable
const UNSUPPORTED_EXTENSIONS: &[&str] = &["mp3", "ogg", "flac", "aac", "m4a", "opus"];

#[derive(Debug, Error, PartialEq)]
pub enum SourceError {
    #[error("audio source is empty")]
    Empty,
    #[error("unsupported media format: {0:?} (only WAV files can be played)")]
    UnsupportedMedia(PathBuf),
}

/// What the analyzer observes: a capture endpoint or a media file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioSource {
    /// Capture device, matched by name
    Device(String),
    /// WAV file played through the output device
    Media(PathBuf),
}

impl AudioSource {
    pub fn parse(value: &str) -> Result<Self, SourceError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SourceError::Empty);
        }

        let path = Path::new(value);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some(ext) if MEDIA_EXTENSIONS.contains(&ext) => Ok(Self::Media(path.to_path_buf())),
            Some(ext) if UNSUPPORTED_EXTENSIONS.contains(&ext) => {
                Err(SourceError::UnsupportedMedia(path.to_path_buf()))
            }
            _ => Ok(Self::Device(value.to_string())),
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(self, Self::Media(_))
    }
}

impl FromStr for AudioSource {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(name) => write!(f, "device '{}'", name),
            Self::Media(path) => write!(f, "media {}", path.display()),
        }
    }
}

/// Play/pause state of the observed source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Paused,
    Playing,
}

impl Transport {
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Paused => Self::Playing,
            Self::Playing => Self::Paused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_names() {
        assert_eq!(
            AudioSource::parse("pipewire").unwrap(),
            AudioSource::Device("pipewire".to_string())
        );
        // Dots in device names are not file extensions we know
        assert_eq!(
            "alsa_input.usb-mic".parse::<AudioSource>().unwrap(),
            AudioSource::Device("alsa_input.usb-mic".to_string())
        );
    }

    #[test]
    fn test_parse_media() {
        let source = AudioSource::parse("music/track.WAV").unwrap();
        assert_eq!(source, AudioSource::Media(PathBuf::from("music/track.WAV")));
        assert!(source.is_media());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(AudioSource::parse("   "), Err(SourceError::Empty));
        assert_eq!(
            AudioSource::parse("song.mp3"),
            Err(SourceError::UnsupportedMedia(PathBuf::from("song.mp3")))
        );
    }

    #[test]
    fn test_transport_toggle() {
        let transport = Transport::default();
        assert!(!transport.is_playing());
        assert!(transport.toggled().is_playing());
        assert_eq!(transport.toggled().toggled(), Transport::Paused);
    }
}
