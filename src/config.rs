//! Configuration management for WAV conversion

use crate::encoder::sox::{DEFAULT_PROGRAM, DEFAULT_TIMEOUT_SECS};
use crate::error::{MonoWavError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SAMPLE_RATE: u32 = 16000;
pub const DEFAULT_SELECTED_CHANNEL: usize = 0;
pub const MAX_SAMPLE_RATE: u32 = 384_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub verbose: bool,
    pub conversion: ConversionConfig,
    pub encoder: EncoderConfig,
    pub temp: TempConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub selected_channel: usize,
    pub sample_rate: u32,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Executable name looked up on `PATH`, or a path to it.
    pub program: PathBuf,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TempConfig {
    /// Directory for intermediate files. System temp dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// File name prefix. `monowav-<run id>-` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Where derived files go. Relative to the working directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub stop_on_error: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            selected_channel: DEFAULT_SELECTED_CHANNEL,
            sample_rate: DEFAULT_SAMPLE_RATE,
            overwrite: true,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EncoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            stop_on_error: true,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "monowav", about = "Convert WAV files to 16-bit mono PCM", version, author)]
pub struct Args {
    #[arg(help = "Input WAV file, or a directory whose *wav files are all converted")]
    pub input: Option<PathBuf>,

    #[arg(short = 'o', long = "output", help = "Output file (single-file mode only)")]
    pub output: Option<PathBuf>,

    #[arg(short = 'c', long = "channel", help = "Channel to keep from multi-channel input (0-based)")]
    pub channel: Option<usize>,

    #[arg(short = 'r', long = "sample-rate", help = "Target sample rate (Hz) [default: 16000]")]
    pub sample_rate: Option<u32>,

    #[arg(long = "no-overwrite", help = "Fail instead of replacing existing output files")]
    pub no_overwrite: bool,

    #[arg(long = "keep-going", help = "In directory mode, continue past failed files")]
    pub keep_going: bool,

    #[arg(long = "output-dir", help = "Directory for derived output files in directory mode")]
    pub output_dir: Option<PathBuf>,

    #[arg(long = "temp-dir", help = "Directory for intermediate files")]
    pub temp_dir: Option<PathBuf>,

    #[arg(long = "encoder", help = "Encoder executable name or path [default: sox]")]
    pub encoder: Option<PathBuf>,

    #[arg(long = "timeout", help = "Encoder timeout in seconds [default: 300]")]
    pub timeout: Option<u64>,

    #[arg(short = 'C', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(long = "write-default-config", help = "Write a default config file to PATH and exit")]
    pub write_default_config: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,
}

impl Config {
    /// Build config from a config file (if given) with command line flags on top.
    pub fn from_args_and_config(args: &Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Only flags that were actually given override the file.
        if let Some(channel) = args.channel {
            config.conversion.selected_channel = channel;
        }
        if let Some(rate) = args.sample_rate {
            config.conversion.sample_rate = rate;
        }
        if args.no_overwrite {
            config.conversion.overwrite = false;
        }
        if args.keep_going {
            config.batch.stop_on_error = false;
        }
        if let Some(dir) = &args.output_dir {
            config.batch.output_dir = Some(dir.clone());
        }
        if let Some(dir) = &args.temp_dir {
            config.temp.dir = Some(dir.clone());
        }
        if let Some(program) = &args.encoder {
            config.encoder.program = program.clone();
        }
        if let Some(timeout) = args.timeout {
            config.encoder.timeout_secs = timeout;
        }
        if args.verbose {
            config.verbose = true;
        }

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MonoWavError::config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| MonoWavError::config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.conversion.sample_rate == 0 {
            return Err(MonoWavError::config("Sample rate must be greater than 0"));
        }
        if self.conversion.sample_rate > MAX_SAMPLE_RATE {
            return Err(MonoWavError::config(format!(
                "Sample rate cannot exceed {} Hz",
                MAX_SAMPLE_RATE
            )));
        }

        if self.encoder.program.as_os_str().is_empty() {
            return Err(MonoWavError::config("Encoder program cannot be empty"));
        }
        if self.encoder.timeout_secs == 0 {
            return Err(MonoWavError::config("Encoder timeout must be greater than 0"));
        }

        if let Some(prefix) = &self.temp.prefix {
            if prefix.contains(std::path::is_separator) {
                return Err(MonoWavError::config("Temp file prefix cannot contain a path separator"));
            }
        }

        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MonoWavError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MonoWavError::config(format!("Failed to write config file: {}", e)))
    }

    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("monowav").chain(argv.iter().copied()))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.conversion.sample_rate, 16000);
        assert_eq!(config.conversion.selected_channel, 0);
        assert!(config.conversion.overwrite);
        assert_eq!(config.encoder.program, PathBuf::from("sox"));
        assert_eq!(config.encoder.timeout(), Duration::from_secs(300));
        assert!(config.batch.stop_on_error);
        assert!(config.temp.dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.conversion.sample_rate = 0;
        assert!(config.validate().is_err());
        config.conversion.sample_rate = 500_000;
        assert!(config.validate().is_err());
        config.conversion.sample_rate = 16000;

        config.encoder.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.encoder.timeout_secs = 30;

        config.temp.prefix = Some("a/b".to_string());
        assert!(config.validate().is_err());
        config.temp.prefix = Some("ab-".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.conversion.sample_rate = 8000;
        config.batch.output_dir = Some(PathBuf::from("converted"));

        assert!(config.save_to_file(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = Config::from_file(&config_path).unwrap();
        assert_eq!(loaded.conversion.sample_rate, 8000);
        assert_eq!(loaded.batch.output_dir, Some(PathBuf::from("converted")));
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(&config_path, "[conversion]\nselected_channel = 1\n").unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.conversion.selected_channel, 1);
        assert_eq!(config.conversion.sample_rate, 16000);
        assert_eq!(config.encoder.program, PathBuf::from("sox"));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        std::fs::write(&config_path, "[conversion]\nsample_rate = 0\n").unwrap();
        assert!(Config::from_file(&config_path).is_err());

        assert!(Config::from_file(temp_dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_args_override_only_given_flags() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[conversion]\nsample_rate = 8000\nselected_channel = 1\n[encoder]\ntimeout_secs = 12\n",
        )
        .unwrap();

        let parsed = args(&[
            "in.wav",
            "-C",
            config_path.to_str().unwrap(),
            "-r",
            "22050",
            "--no-overwrite",
            "--keep-going",
        ]);
        let config = Config::from_args_and_config(&parsed).unwrap();

        assert_eq!(config.conversion.sample_rate, 22050);
        assert_eq!(config.conversion.selected_channel, 1);
        assert!(!config.conversion.overwrite);
        assert!(!config.batch.stop_on_error);
        assert_eq!(config.encoder.timeout_secs, 12);
    }

    #[test]
    fn test_args_reject_zero_rate() {
        let parsed = args(&["in.wav", "-r", "0"]);
        assert!(Config::from_args_and_config(&parsed).is_err());
    }
}
