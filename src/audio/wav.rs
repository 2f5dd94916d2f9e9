//! WAV audio file processing
//!
//! Everything here works on 16-bit integer PCM. Sample values are kept as
//! `i16` from read to write so an already-normalized file passes through
//! unchanged.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::Path;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use ndarray::{Array1, Array2};
use crate::error::{MonoWavError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Int { bits: u16 },
    Float { bits: u16 },
}

impl AudioFormat {
    pub const PCM16: AudioFormat = AudioFormat::Int { bits: 16 };

    pub fn from_spec(spec: &WavSpec) -> Self {
        match spec.sample_format {
            SampleFormat::Int => AudioFormat::Int { bits: spec.bits_per_sample },
            SampleFormat::Float => AudioFormat::Float { bits: spec.bits_per_sample },
        }
    }

    pub fn name(&self) -> String {
        match self {
            AudioFormat::Int { bits } => format!("int{}", bits),
            AudioFormat::Float { bits } => format!("float{}", bits),
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        match self {
            AudioFormat::Int { bits } | AudioFormat::Float { bits } => *bits,
        }
    }

    pub fn is_pcm16(&self) -> bool {
        *self == Self::PCM16
    }
}

#[derive(Debug, Clone)]
pub struct AudioHeader {
    pub sample_rate: u32,
    pub channels: u16,
    pub format: AudioFormat,
    /// Samples per channel.
    pub total_frames: u32,
    pub duration: f64,
}

impl AudioHeader {
    /// Header for 16-bit PCM output.
    pub fn new(sample_rate: u32, channels: u16, total_frames: u32) -> Self {
        Self::from_parts(sample_rate, channels, AudioFormat::PCM16, total_frames)
    }

    fn from_parts(sample_rate: u32, channels: u16, format: AudioFormat, total_frames: u32) -> Self {
        let duration = if sample_rate == 0 {
            0.0
        } else {
            total_frames as f64 / sample_rate as f64
        };

        Self {
            sample_rate,
            channels,
            format,
            total_frames,
            duration,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MonoWavError::audio("Sample rate cannot be 0"));
        }

        if self.channels == 0 {
            return Err(MonoWavError::audio("Channel count cannot be 0"));
        }

        Ok(())
    }

    pub fn to_wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.format.bits_per_sample(),
            sample_format: match self.format {
                AudioFormat::Int { .. } => SampleFormat::Int,
                AudioFormat::Float { .. } => SampleFormat::Float,
            },
        }
    }
}

/// Read only the header of a WAV file.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<AudioHeader> {
    let path = path.as_ref();
    let reader = WavReader::open(path)
        .map_err(|e| MonoWavError::audio(format!("Cannot read WAV header of {}: {}", path.display(), e)))?;

    let spec = reader.spec();
    let header = AudioHeader::from_parts(
        spec.sample_rate,
        spec.channels,
        AudioFormat::from_spec(&spec),
        reader.duration(),
    );
    header.validate()?;
    Ok(header)
}

/// Why a source has to go through the encoder before it can be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReencodeReason {
    /// The header could not be parsed at all.
    Unreadable(String),
    /// Parsed fine, but the samples are not 16-bit integers.
    SampleFormat(AudioFormat),
}

#[derive(Debug, Clone)]
pub enum SourceFormat {
    Pcm16(AudioHeader),
    NeedsReencode(ReencodeReason),
}

impl SourceFormat {
    pub fn needs_reencode(&self) -> bool {
        matches!(self, SourceFormat::NeedsReencode(_))
    }
}

/// Decide whether `path` is readable as 16-bit integer PCM.
///
/// This is a heuristic, not a bit-depth detector. A header `hound` cannot
/// parse is treated the same as 24-bit PCM: both are handed to the encoder.
/// That lumps together 24-bit files, WAVE_FORMAT_EXTENSIBLE variants hound
/// rejects, and files that are not WAV at all. The encoder then decides
/// whether it can make sense of them.
pub fn probe_source<P: AsRef<Path>>(path: P) -> SourceFormat {
    match WavReader::open(path.as_ref()) {
        Ok(reader) => {
            let spec = reader.spec();
            let format = AudioFormat::from_spec(&spec);
            if format.is_pcm16() && spec.channels > 0 && spec.sample_rate > 0 {
                SourceFormat::Pcm16(AudioHeader::from_parts(
                    spec.sample_rate,
                    spec.channels,
                    format,
                    reader.duration(),
                ))
            } else {
                SourceFormat::NeedsReencode(ReencodeReason::SampleFormat(format))
            }
        }
        Err(e) => SourceFormat::NeedsReencode(ReencodeReason::Unreadable(e.to_string())),
    }
}

#[derive(Debug, Clone)]
pub enum AudioData {
    Mono(Array1<i16>),
    /// Shape is (frames, channels).
    MultiChannel(Array2<i16>),
}

impl AudioData {
    pub fn from_interleaved(samples: Vec<i16>, channels: u16) -> Result<Self> {
        match channels {
            0 => Err(MonoWavError::audio("Channel count cannot be 0")),
            1 => Ok(AudioData::Mono(Array1::from(samples))),
            n => {
                let n = n as usize;
                let frames = samples.len() / n;
                let data = Array2::from_shape_vec((frames, n), samples)
                    .map_err(|e| MonoWavError::audio(format!("Interleaved data does not fit {} channels: {}", n, e)))?;
                Ok(AudioData::MultiChannel(data))
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AudioData::Mono(data) => data.len(),
            AudioData::MultiChannel(data) => data.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channels(&self) -> u16 {
        match self {
            AudioData::Mono(_) => 1,
            AudioData::MultiChannel(data) => data.ncols() as u16,
        }
    }

    /// Keep one channel and drop the rest. Mono data is returned unchanged
    /// whatever the index.
    pub fn select_channel(&self, index: usize) -> Result<Array1<i16>> {
        match self {
            AudioData::Mono(data) => Ok(data.clone()),
            AudioData::MultiChannel(data) => {
                if index >= data.ncols() {
                    return Err(MonoWavError::InvalidChannelIndex {
                        index,
                        channels: data.ncols() as u16,
                    });
                }
                Ok(data.column(index).to_owned())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WavAudio {
    pub header: AudioHeader,
    pub data: AudioData,
}

impl WavAudio {
    /// Load a 16-bit integer PCM file fully into memory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut reader = WavReader::open(path)
            .map_err(|e| MonoWavError::audio(format!("Cannot open audio file {}: {}", path.display(), e)))?;

        let spec = reader.spec();
        let format = AudioFormat::from_spec(&spec);
        if !format.is_pcm16() {
            return Err(MonoWavError::audio(format!(
                "Expected 16-bit integer PCM in {}, found {}",
                path.display(),
                format.name()
            )));
        }

        let header = AudioHeader::from_parts(spec.sample_rate, spec.channels, format, reader.duration());
        header.validate()?;

        let samples = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(|e| MonoWavError::audio(format!("Failed to read sample: {}", e)))?;

        let data = AudioData::from_interleaved(samples, spec.channels)?;

        Ok(WavAudio { header, data })
    }

    pub fn new_mono(sample_rate: u32, data: Array1<i16>) -> Self {
        let header = AudioHeader::new(sample_rate, 1, data.len() as u32);

        WavAudio {
            header,
            data: AudioData::Mono(data),
        }
    }

    /// Write as 16-bit PCM.
    ///
    /// With `overwrite` disabled the file is opened create-new, so an
    /// existing destination is never truncated.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let opened = if overwrite {
            File::create(path)
        } else {
            OpenOptions::new().write(true).create_new(true).open(path)
        };
        let file = opened.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => MonoWavError::destination_exists(path),
            _ => MonoWavError::Io(e),
        })?;

        if let Err(e) = self.write_samples(file) {
            let _ = std::fs::remove_file(path);
            return Err(e);
        }

        Ok(())
    }

    fn write_samples(&self, file: File) -> Result<()> {
        let mut writer = WavWriter::new(BufWriter::new(file), self.header.to_wav_spec())
            .map_err(|e| MonoWavError::audio(format!("Cannot create WAV writer: {}", e)))?;

        match &self.data {
            AudioData::Mono(data) => {
                for &sample in data.iter() {
                    writer.write_sample(sample)?;
                }
            }
            AudioData::MultiChannel(data) => {
                for row in data.rows() {
                    for &sample in row.iter() {
                        writer.write_sample(sample)?;
                    }
                }
            }
        }

        writer
            .finalize()
            .map_err(|e| MonoWavError::audio(format!("Failed to finalize WAV writing: {}", e)))
    }

    pub fn data(&self) -> &AudioData {
        &self.data
    }

    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.header.channels
    }

    pub fn total_frames(&self) -> u32 {
        self.header.total_frames
    }

    pub fn duration(&self) -> f64 {
        self.header.duration
    }

    pub fn format(&self) -> AudioFormat {
        self.header.format
    }

    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;

        if self.data.len() as u32 != self.header.total_frames {
            return Err(MonoWavError::audio(format!(
                "Data length mismatch: header shows {} frames, actual {} frames",
                self.header.total_frames,
                self.data.len()
            )));
        }

        if self.data.channels() != self.header.channels {
            return Err(MonoWavError::audio(format!(
                "Channel count mismatch: header shows {} channels, actual {} channels",
                self.header.channels,
                self.data.channels()
            )));
        }

        Ok(())
    }
}
