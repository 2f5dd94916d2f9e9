//! Directory batch conversion

use std::path::{Path, PathBuf};
use log::{error, info};
use crate::config::{Config, DEFAULT_SAMPLE_RATE, DEFAULT_SELECTED_CHANNEL};
use crate::encoder::Transcoder;
use crate::error::{MonoWavError, Result};
use crate::processing::{ConversionRequest, ConversionSummary, Converter};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub directory: PathBuf,
    pub selected_channel: usize,
    pub sample_rate: u32,
    pub overwrite: bool,
    /// `None` writes derived names relative to the working directory.
    pub output_dir: Option<PathBuf>,
    pub stop_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            selected_channel: DEFAULT_SELECTED_CHANNEL,
            sample_rate: DEFAULT_SAMPLE_RATE,
            overwrite: true,
            output_dir: None,
            stop_on_error: true,
        }
    }
}

impl BatchOptions {
    pub fn from_config(directory: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            directory: directory.into(),
            selected_channel: config.conversion.selected_channel,
            sample_rate: config.conversion.sample_rate,
            overwrite: config.conversion.overwrite,
            output_dir: config.batch.output_dir.clone(),
            stop_on_error: config.batch.stop_on_error,
        }
    }

    pub fn destination_for(&self, file_name: &str) -> PathBuf {
        let name = output_file_name(file_name, self.selected_channel, self.sample_rate);
        match &self.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub result: Result<ConversionSummary>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// First two digits of the rate: 16000 -> "16", 44100 -> "44", 8000 -> "80".
pub fn sample_rate_suffix(sample_rate: u32) -> String {
    sample_rate.to_string().chars().take(2).collect()
}

/// Drop the last four characters (the `.wav` extension) and append
/// `ch{channel}_{suffix}k.wav`, so `foo.wav` becomes `foo.ch0_16k.wav`.
///
/// The dot is kept from the source name. Names that do not end in `.wav`
/// lose four characters all the same.
pub fn output_file_name(file_name: &str, selected_channel: usize, sample_rate: u32) -> String {
    let keep = file_name.chars().count().saturating_sub(4);
    let stem: String = file_name.chars().take(keep).collect();
    format!("{}ch{}_{}k.wav", stem, selected_channel, sample_rate_suffix(sample_rate))
}

/// Regular files directly in `dir` whose name ends in `wav`, sorted by name.
pub fn find_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MonoWavError::invalid_input(dir));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().ends_with("wav") && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

impl<T: Transcoder> Converter<T> {
    /// Convert every matching file in `options.directory`.
    ///
    /// With `stop_on_error` the first failure is returned and later files
    /// are left alone; otherwise failures are recorded and the run goes on.
    pub fn convert_all(&self, options: &BatchOptions) -> Result<BatchReport> {
        let files = find_wav_files(&options.directory)?;
        info!("Found {} wav files in {}", files.len(), options.directory.display());

        let mut report = BatchReport::default();
        for source in files {
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let destination = options.destination_for(&file_name);
            info!("{}", file_name);

            let result = if !options.overwrite && destination.exists() {
                Err(MonoWavError::destination_exists(&destination))
            } else {
                let request = ConversionRequest::new(&source, &destination)
                    .channel(options.selected_channel)
                    .sample_rate(options.sample_rate)
                    .overwrite(options.overwrite);
                self.convert(&request)
            };

            match result {
                Err(e) if options.stop_on_error => return Err(e),
                Err(e) => {
                    error!("{}: {}", source.display(), e);
                    report.outcomes.push(FileOutcome { source, destination, result: Err(e) });
                }
                Ok(summary) => {
                    report.outcomes.push(FileOutcome { source, destination, result: Ok(summary) });
                }
            }
        }

        Ok(report)
    }
}
