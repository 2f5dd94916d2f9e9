//! Audio Module
//!
//! WAV reading, probing and writing on top of `hound`. Only uncompressed
//! PCM is supported.

pub mod wav;

pub use wav::{
    probe_source, read_header, AudioData, AudioFormat, AudioHeader, ReencodeReason, SourceFormat,
    WavAudio,
};
