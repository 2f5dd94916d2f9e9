//! monowav - WAV to 16-bit mono PCM normalizer
//!
//! Reads a WAV file, re-encodes it to 16-bit PCM and resamples it through
//! sox when needed, keeps one channel and writes the result.

pub mod audio;
pub mod config;
pub mod encoder;
pub mod error;
pub mod processing;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use config::{Args, Config, DEFAULT_SAMPLE_RATE, DEFAULT_SELECTED_CHANNEL};
pub use error::{ErrorCategory, MonoWavError, Result};
pub use processing::{BatchOptions, BatchReport, ConversionRequest, ConversionSummary, Converter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Find the default encoder on `PATH`. The lookup runs once per process.
pub fn ensure_encoder_installed() -> Result<PathBuf> {
    static ENCODER: OnceLock<Option<PathBuf>> = OnceLock::new();
    let default_program = config::EncoderConfig::default().program;
    ENCODER
        .get_or_init(|| encoder::sox::find_program(&default_program).ok())
        .clone()
        .ok_or_else(|| MonoWavError::EncoderNotInstalled {
            program: default_program.display().to_string(),
        })
}

fn default_converter() -> Result<Converter> {
    let program = ensure_encoder_installed()?;
    let config = Config::default();
    Ok(Converter::new(
        encoder::SoxEncoder::new(program, config.encoder.timeout()),
        processing::TempFileFactory::new(&config.temp),
    ))
}

/// Convert `old_path` to 16-bit mono PCM at `sample_rate` and write it to
/// `new_path`. Returns `new_path`.
///
/// ```rust,no_run
/// let out = monowav::convert_wav_to_16bit_mono("example_24bit_48k_2ch.wav", "example_16k_1ch.wav", 0, 16000, true)?;
/// assert_eq!(out, std::path::PathBuf::from("example_16k_1ch.wav"));
/// # Ok::<(), monowav::MonoWavError>(())
/// ```
pub fn convert_wav_to_16bit_mono(
    old_path: impl AsRef<Path>,
    new_path: impl AsRef<Path>,
    selected_channel: usize,
    sample_rate: u32,
    overwrite_existing: bool,
) -> Result<PathBuf> {
    let request = ConversionRequest::new(old_path.as_ref(), new_path.as_ref())
        .channel(selected_channel)
        .sample_rate(sample_rate)
        .overwrite(overwrite_existing);
    Ok(default_converter()?.convert(&request)?.destination)
}

/// Convert every `*wav` file directly inside `path`, naming each output
/// `<stem>.ch{channel}_{rate prefix}k.wav` in the working directory.
pub fn convert_all_wavs_in_folder(
    path: impl AsRef<Path>,
    selected_channel: usize,
    sample_rate: u32,
    overwrite_existing: bool,
) -> Result<BatchReport> {
    let options = BatchOptions {
        directory: path.as_ref().to_path_buf(),
        selected_channel,
        sample_rate,
        overwrite: overwrite_existing,
        ..Default::default()
    };
    default_converter()?.convert_all(&options)
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_info() {
        let info = get_library_info().to_string();
        assert!(info.starts_with("monowav v"));
    }

    #[test]
    fn test_missing_input_fails_before_anything_else() {
        let dir = tempfile::TempDir::new().unwrap();
        let dst = dir.path().join("out.wav");
        let result = convert_wav_to_16bit_mono(dir.path().join("nope.wav"), &dst, 0, 16000, true);

        // The encoder check runs first, so the outcome depends on the host.
        match (ensure_encoder_installed(), result) {
            (Ok(_), Err(MonoWavError::InvalidInputFile { path })) => {
                assert_eq!(path, dir.path().join("nope.wav"));
            }
            (Err(_), Err(MonoWavError::EncoderNotInstalled { program })) => {
                assert_eq!(program, "sox");
            }
            (installed, other) => panic!("encoder {:?}, unexpected result: {:?}", installed, other),
        }
        assert!(!dst.exists());
    }
}
