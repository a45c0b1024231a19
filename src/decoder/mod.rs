use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::executor::{process, Decode, ExecutorError};
use crate::radio::artifact_stem;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecoderConfig {
    pub program: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            program: "qsstv".to_string(),
        }
    }
}

/// Decodes SSTV images out of a recorded WAV file with QSSTV.
pub struct QsstvDecoder {
    config: DecoderConfig,
    log_dir: PathBuf,
}

impl QsstvDecoder {
    pub fn new(config: DecoderConfig, log_dir: PathBuf) -> Self {
        Self { config, log_dir }
    }

    pub fn command(&self, input: &Path, output_dir: &Path) -> String {
        format!(
            "{} --file {} --output-dir {}",
            self.config.program,
            process::quote(&input.to_string_lossy()),
            process::quote(&output_dir.to_string_lossy()),
        )
    }
}

impl Decode for QsstvDecoder {
    fn decode(&self, input: &Path, output_dir: &Path) -> Result<(), ExecutorError> {
        log::info!("Decoding file: {}", input.display());
        let label = format!("decode_{}", artifact_stem(input));
        process::run(&label, &self.command(input, output_dir), &self.log_dir)?;
        log::info!("Decoding finished. Images saved to: {}", output_dir.display());
        Ok(())
    }
}
