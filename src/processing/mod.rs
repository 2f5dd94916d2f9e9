//! Conversion Pipeline

pub mod batch;
pub mod processor;
pub mod temp;

pub use batch::{find_wav_files, output_file_name, sample_rate_suffix, BatchOptions, BatchReport, FileOutcome};
pub use processor::{ConversionRequest, ConversionSummary, Converter};
pub use temp::{run_id, TempFileFactory, TempWav};
