#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use monowav::config::TempConfig;
use monowav::encoder::{EncodeTarget, Transcoder};
use monowav::processing::TempFileFactory;
use monowav::{Converter, MonoWavError, Result};

pub const TEMP_PREFIX: &str = "it-";

/// In-process stand-in for sox built on hound.
#[derive(Default)]
pub struct FakeTranscoder {
    pub calls: RefCell<Vec<EncodeTarget>>,
    pub fail: bool,
}

impl FakeTranscoder {
    pub fn failing() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<EncodeTarget> {
        self.calls.borrow().clone()
    }
}

impl Transcoder for FakeTranscoder {
    fn transcode(&self, input: &Path, output: &Path, target: EncodeTarget) -> Result<()> {
        self.calls.borrow_mut().push(target);

        if self.fail {
            // Leave a half-written file behind, the way a crashing encoder would.
            std::fs::write(output, b"RIFF")?;
            return Err(MonoWavError::encoding_failed(2, "fake encoder failure"));
        }

        let mut reader = WavReader::open(input)?;
        let spec = reader.spec();

        match target {
            EncodeTarget::Pcm16 => {
                let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
                    (SampleFormat::Int, bits) if bits > 16 => reader
                        .samples::<i32>()
                        .map(|s| s.map(|v| (v >> (bits - 16)) as i16))
                        .collect::<std::result::Result<_, _>>()?,
                    (SampleFormat::Int, _) => reader
                        .samples::<i16>()
                        .collect::<std::result::Result<_, _>>()?,
                    (SampleFormat::Float, _) => reader
                        .samples::<f32>()
                        .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                        .collect::<std::result::Result<_, _>>()?,
                };
                write_interleaved(output, spec.sample_rate, spec.channels, &samples);
            }
            EncodeTarget::SampleRate(rate) => {
                let samples: Vec<i16> = reader
                    .samples::<i16>()
                    .collect::<std::result::Result<_, _>>()?;
                let channels = spec.channels as usize;
                let frames = samples.len() / channels;
                let new_frames = (frames as u64 * rate as u64 / spec.sample_rate as u64) as usize;

                let mut resampled = Vec::with_capacity(new_frames * channels);
                for i in 0..new_frames {
                    let src = (i as u64 * spec.sample_rate as u64 / rate as u64) as usize;
                    let src = src.min(frames.saturating_sub(1));
                    resampled.extend_from_slice(&samples[src * channels..(src + 1) * channels]);
                }
                write_interleaved(output, rate, spec.channels, &resampled);
            }
        }

        Ok(())
    }
}

pub fn converter_in<'a>(fake: &'a FakeTranscoder, temp_dir: &Path) -> Converter<&'a FakeTranscoder> {
    Converter::new(
        fake,
        TempFileFactory::new(&TempConfig {
            dir: Some(temp_dir.to_path_buf()),
            prefix: Some(TEMP_PREFIX.to_string()),
        }),
    )
}

pub fn write_interleaved(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// `frames` copies of `values`, one value per channel.
pub fn write_constant_channels(path: &Path, sample_rate: u32, values: &[i16], frames: usize) {
    let samples: Vec<i16> = (0..frames).flat_map(|_| values.iter().copied()).collect();
    write_interleaved(path, sample_rate, values.len() as u16, &samples);
}

pub fn write_24bit(path: &Path, sample_rate: u32, values: &[i32], frames: usize) {
    let spec = WavSpec {
        channels: values.len() as u16,
        sample_rate,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for _ in 0..frames {
        for &v in values {
            writer.write_sample(v).unwrap();
        }
    }
    writer.finalize().unwrap();
}

pub fn read_i16(path: &Path) -> (WavSpec, Vec<i16>) {
    let mut reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
