//! External encoder integration
//!
//! The pipeline never touches sample-format or sample-rate conversion
//! itself; it asks a [`Transcoder`] to produce a new WAV file instead.

pub mod sox;

use std::path::Path;
use crate::error::Result;

pub use sox::SoxEncoder;

/// What the encoder should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeTarget {
    /// Signed 16-bit integer PCM in a WAV container.
    Pcm16,
    /// WAV container at the given sample rate.
    SampleRate(u32),
}

impl EncodeTarget {
    /// Output-side options in sox syntax.
    pub fn sox_args(&self) -> Vec<String> {
        match self {
            EncodeTarget::Pcm16 => vec![
                "--encoding=signed-integer".to_string(),
                "--bits=16".to_string(),
                "--type=wav".to_string(),
            ],
            EncodeTarget::SampleRate(rate) => {
                vec!["--type=wav".to_string(), format!("--rate={}", rate)]
            }
        }
    }
}

/// Converts one file into another on disk.
pub trait Transcoder {
    fn transcode(&self, input: &Path, output: &Path, target: EncodeTarget) -> Result<()>;
}

impl<T: Transcoder + ?Sized> Transcoder for &T {
    fn transcode(&self, input: &Path, output: &Path, target: EncodeTarget) -> Result<()> {
        (**self).transcode(input, output, target)
    }
}
