//! sox subprocess runner.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, warn};
use crate::config::EncoderConfig;
use crate::encoder::{EncodeTarget, Transcoder};
use crate::error::{MonoWavError, Result};

/// Default timeout for one encoder run (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_PROGRAM: &str = "sox";

#[derive(Debug, Clone)]
pub struct SoxEncoder {
    program: PathBuf,
    timeout: Duration,
}

impl SoxEncoder {
    /// Wrap an already resolved executable.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Resolve the configured program on `PATH` (or as a path) and build a runner.
    pub fn locate(config: &EncoderConfig) -> Result<Self> {
        let program = find_program(&config.program)?;
        Ok(Self::new(program, config.timeout()))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Find an executable by name on `PATH`, or check an explicit path.
pub fn find_program(program: &Path) -> Result<PathBuf> {
    which::which(program).map_err(|_| MonoWavError::EncoderNotInstalled {
        program: program.display().to_string(),
    })
}

impl Transcoder for SoxEncoder {
    fn transcode(&self, input: &Path, output: &Path, target: EncodeTarget) -> Result<()> {
        // sox <input> <output options> <output>
        let mut cmd = Command::new(&self.program);
        cmd.arg(input).args(target.sox_args()).arg(output);

        // stdout is discarded; stderr is drained in the background.
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());

        debug!("Running encoder: {:?}", cmd);
        let child = cmd.spawn().map_err(MonoWavError::EncoderSpawn)?;

        let (status, stderr) = wait_with_timeout(child, self.timeout)?;

        if !status.success() {
            return Err(MonoWavError::encoding_failed(status.code().unwrap_or(-1), stderr));
        }

        if !stderr.trim().is_empty() {
            warn!("Encoder reported: {}", stderr.trim());
        }

        Ok(())
    }
}

fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<(ExitStatus, String)> {
    // Drain stderr while the child runs; a full pipe would block it forever.
    let stderr_reader = child.stderr.take().map(|mut err| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = err.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(MonoWavError::EncoderTimeout { timeout });
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(MonoWavError::EncoderSpawn(e));
            }
        }
    };

    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();

    Ok((status, stderr))
}
