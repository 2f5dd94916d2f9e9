//! Error Types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum MonoWavError {
    /// The external encoder could not be found on the search path.
    #[error("Encoder '{program}' not found. Install it or point --encoder at the executable")]
    EncoderNotInstalled { program: String },

    #[error("Input file is missing or not readable: {}", path.display())]
    InvalidInputFile { path: PathBuf },

    #[error("Destination already exists and overwrite is disabled: {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("Channel index {index} out of range for audio with {channels} channels")]
    InvalidChannelIndex { index: usize, channels: u16 },

    #[error("Failed to spawn encoder process: {0}")]
    EncoderSpawn(#[source] std::io::Error),

    #[error("Encoder timed out after {timeout:?}")]
    EncoderTimeout { timeout: Duration },

    /// Encoder exited with a non-zero status (-1 when killed by a signal).
    #[error("Encoder exited with status {exit_code}: {stderr}")]
    EncodingFailed { exit_code: i32, stderr: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure classes, so callers can branch without matching variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Environment,
    Input,
    Conflict,
    ExternalTool,
    Codec,
    Configuration,
    Filesystem,
}

impl MonoWavError {
    pub fn audio<S: Into<String>>(msg: S) -> Self { Self::Audio { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }

    pub fn invalid_input(path: impl Into<PathBuf>) -> Self {
        Self::InvalidInputFile { path: path.into() }
    }

    pub fn destination_exists(path: impl Into<PathBuf>) -> Self {
        Self::DestinationExists { path: path.into() }
    }

    pub fn encoding_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::EncodingFailed { exit_code, stderr: stderr.into().trim().to_string() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EncoderNotInstalled { .. } => ErrorCategory::Environment,
            Self::InvalidInputFile { .. } | Self::InvalidChannelIndex { .. } => ErrorCategory::Input,
            Self::DestinationExists { .. } => ErrorCategory::Conflict,
            Self::EncoderSpawn(_) | Self::EncoderTimeout { .. } | Self::EncodingFailed { .. } => {
                ErrorCategory::ExternalTool
            }
            Self::Audio { .. } => ErrorCategory::Codec,
            Self::Config { .. } => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Filesystem,
        }
    }
}

impl From<hound::Error> for MonoWavError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => Self::Io(e),
            other => Self::audio(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonoWavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = MonoWavError::audio("test");
        assert!(e.to_string().contains("Audio"));

        let e = MonoWavError::destination_exists("out.wav");
        assert!(e.to_string().contains("out.wav"));
    }

    #[test]
    fn test_encoding_failed_trims_stderr() {
        let e = MonoWavError::encoding_failed(2, "sox FAIL formats: can't open\n");
        match e {
            MonoWavError::EncodingFailed { exit_code, ref stderr } => {
                assert_eq!(exit_code, 2);
                assert_eq!(stderr, "sox FAIL formats: can't open");
            }
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            MonoWavError::EncoderNotInstalled { program: "sox".into() }.category(),
            ErrorCategory::Environment
        );
        assert_eq!(MonoWavError::invalid_input("x.wav").category(), ErrorCategory::Input);
        assert_eq!(
            MonoWavError::InvalidChannelIndex { index: 3, channels: 2 }.category(),
            ErrorCategory::Input
        );
        assert_eq!(MonoWavError::destination_exists("y.wav").category(), ErrorCategory::Conflict);
        assert_eq!(MonoWavError::encoding_failed(1, "").category(), ErrorCategory::ExternalTool);
        assert_eq!(
            MonoWavError::EncoderTimeout { timeout: Duration::from_secs(1) }.category(),
            ErrorCategory::ExternalTool
        );
        assert_eq!(MonoWavError::config("bad").category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_hound_io_error_maps_to_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: MonoWavError = hound::Error::IoError(io).into();
        assert_eq!(e.category(), ErrorCategory::Filesystem);

        let e: MonoWavError = hound::Error::Unsupported.into();
        assert_eq!(e.category(), ErrorCategory::Codec);
    }
}
