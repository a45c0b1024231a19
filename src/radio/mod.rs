use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::scalar_string;
use crate::executor::{process, Capture, ExecutorError};

/// Size of a canonical PCM WAV header; a file no larger than this holds no samples.
const WAV_HEADER_BYTES: u64 = 44;

/// SDR receiver settings, passed verbatim to `rtl_fm` and `sox`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RadioConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub frequency: String,
    #[serde(deserialize_with = "scalar_string")]
    pub sample_rate: String,
    #[serde(deserialize_with = "scalar_string")]
    pub gain: String,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency: "145.8M".to_string(),
            sample_rate: "240k".to_string(),
            gain: "30".to_string(),
        }
    }
}

/// Records narrow-band FM audio with an RTL-SDR dongle, trimmed by `sox` to the pass length.
pub struct RtlFmRecorder {
    config: RadioConfig,
    log_dir: PathBuf,
}

impl RtlFmRecorder {
    pub fn new(config: RadioConfig, log_dir: PathBuf) -> Self {
        Self { config, log_dir }
    }

    pub fn command(&self, duration_s: i64, output: &Path) -> String {
        format!(
            "rtl_fm -f {freq} -s {rate} -g {gain} - | sox -t raw -r {rate} -e s -b 16 -c 1 - {out} trim 0 {duration}",
            freq = process::quote(&self.config.frequency),
            rate = process::quote(&self.config.sample_rate),
            gain = process::quote(&self.config.gain),
            out = process::quote(&output.to_string_lossy()),
            duration = duration_s,
        )
    }
}

impl Capture for RtlFmRecorder {
    fn capture(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        output: &Path,
    ) -> Result<(), ExecutorError> {
        let duration_s = (end - start).num_seconds().max(0);
        log::info!(
            "Recording starts at {} and ends at {} ({} seconds)",
            start,
            end,
            duration_s
        );

        let label = format!("capture_{}", artifact_stem(output));
        process::run(&label, &self.command(duration_s, output), &self.log_dir)?;
        check_recording(output)?;

        log::info!("Recording finished. File saved: {}", output.display());
        Ok(())
    }
}

/// Rejects a recording that is missing or carries nothing past the WAV header.
pub fn check_recording(path: &Path) -> Result<(), ExecutorError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > WAV_HEADER_BYTES => Ok(()),
        _ => Err(ExecutorError::EmptyArtifact(path.to_path_buf())),
    }
}

pub(crate) fn artifact_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string())
}
