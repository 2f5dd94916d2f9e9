//! WAV normalization pipeline
//!
//! One call converts one file: re-encode to 16-bit if needed, resample if
//! needed, keep a single channel, write the result, remove intermediates.

use std::fs::File;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use crate::audio::{self, SourceFormat, WavAudio};
use crate::config::{Config, DEFAULT_SAMPLE_RATE, DEFAULT_SELECTED_CHANNEL, MAX_SAMPLE_RATE};
use crate::encoder::{EncodeTarget, SoxEncoder, Transcoder};
use crate::error::{MonoWavError, Result};
use crate::processing::temp::{TempFileFactory, TempWav};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub selected_channel: usize,
    pub target_sample_rate: u32,
    pub overwrite: bool,
}

impl ConversionRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            selected_channel: DEFAULT_SELECTED_CHANNEL,
            target_sample_rate: DEFAULT_SAMPLE_RATE,
            overwrite: true,
        }
    }

    pub fn channel(mut self, channel: usize) -> Self {
        self.selected_channel = channel;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.target_sample_rate = rate;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_sample_rate == 0 || self.target_sample_rate > MAX_SAMPLE_RATE {
            return Err(MonoWavError::config(format!(
                "Target sample rate must be in 1..={} Hz, got {}",
                MAX_SAMPLE_RATE, self.target_sample_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSummary {
    pub destination: PathBuf,
    /// Rate of the 16-bit working file before resampling.
    pub source_sample_rate: u32,
    pub source_channels: u16,
    pub reencoded: bool,
    pub resampled: bool,
    pub frames: u32,
    /// Length of the written file in seconds.
    pub duration: f64,
}

/// The file a stage reads from: the caller's source, or an intermediate we own.
enum WorkingFile<'a> {
    Source(&'a Path),
    Temp(TempWav),
}

impl WorkingFile<'_> {
    fn path(&self) -> &Path {
        match self {
            WorkingFile::Source(path) => path,
            WorkingFile::Temp(temp) => temp.path(),
        }
    }

    fn release(self) {
        if let WorkingFile::Temp(temp) = self {
            temp.remove();
        }
    }
}

#[derive(Debug)]
pub struct Converter<T = SoxEncoder> {
    transcoder: T,
    temp_files: TempFileFactory,
}

impl Converter<SoxEncoder> {
    /// Locate the configured encoder once and build a converter around it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let encoder = SoxEncoder::locate(&config.encoder)?;
        debug!("Using encoder {}", encoder.program().display());
        Ok(Self::new(encoder, TempFileFactory::new(&config.temp)))
    }
}

impl<T: Transcoder> Converter<T> {
    pub fn new(transcoder: T, temp_files: TempFileFactory) -> Self {
        Self {
            transcoder,
            temp_files,
        }
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    pub fn temp_files(&self) -> &TempFileFactory {
        &self.temp_files
    }

    /// Convert one file. Intermediate files are removed on every exit path.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionSummary> {
        request.validate()?;
        ensure_readable(&request.source)?;
        ensure_writable_destination(&request.destination, request.overwrite)?;

        let source_format = audio::probe_source(&request.source);
        let reencoded = source_format.needs_reencode();

        let working = match source_format {
            SourceFormat::Pcm16(_) => WorkingFile::Source(&request.source),
            SourceFormat::NeedsReencode(reason) => {
                debug!("{} needs re-encoding: {:?}", request.source.display(), reason);
                let temp = self.temp_files.create()?;
                self.transcoder.transcode(&request.source, temp.path(), EncodeTarget::Pcm16)?;
                WorkingFile::Temp(temp)
            }
        };

        let header = audio::read_header(working.path())?;
        let resampled = header.sample_rate != request.target_sample_rate;

        let final_working = if resampled {
            debug!(
                "Resampling {} Hz -> {} Hz",
                header.sample_rate, request.target_sample_rate
            );
            let temp = self.temp_files.create()?;
            self.transcoder.transcode(
                working.path(),
                temp.path(),
                EncodeTarget::SampleRate(request.target_sample_rate),
            )?;
            Some(WorkingFile::Temp(temp))
        } else {
            None
        };

        let input = WavAudio::from_file(final_working.as_ref().unwrap_or(&working).path())?;
        debug!(
            "Working file: {}, {} frames, {:.3}s",
            input.format().name(),
            input.total_frames(),
            input.duration()
        );
        if input.data().is_empty() {
            warn!("{} has no audio frames", request.source.display());
        }

        let mono = input.data().select_channel(request.selected_channel)?;
        let frames = mono.len() as u32;

        WavAudio::new_mono(request.target_sample_rate, mono)
            .save_to_file(&request.destination, request.overwrite)?;

        if let Some(file) = final_working {
            file.release();
        }
        working.release();

        info!(
            "{} -> {} ({} Hz, {} ch -> {} Hz mono, {:.2}s)",
            request.source.display(),
            request.destination.display(),
            header.sample_rate,
            input.channels(),
            request.target_sample_rate,
            input.duration()
        );

        Ok(ConversionSummary {
            destination: request.destination.clone(),
            source_sample_rate: header.sample_rate,
            source_channels: input.channels(),
            reencoded,
            resampled,
            frames,
            duration: input.duration(),
        })
    }
}

/// Regular file that can be opened for reading.
fn ensure_readable(path: &Path) -> Result<()> {
    if !path.is_file() || File::open(path).is_err() {
        return Err(MonoWavError::invalid_input(path));
    }
    Ok(())
}

fn ensure_writable_destination(path: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        return Err(MonoWavError::destination_exists(path));
    }
    Ok(())
}
