use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::config::PathsConfig;

const AUDIO_PREFIX: &str = "iss_sstv";

/// Owns the output directories and names per-pass artifacts.
pub struct ArtifactsManager {
    audio_dir: PathBuf,
    image_dir: PathBuf,
}

impl ArtifactsManager {
    /// Creates the audio, image and log directories if missing.
    pub fn create(paths: &PathsConfig) -> io::Result<Self> {
        fs::create_dir_all(&paths.audio_dir)?;
        fs::create_dir_all(&paths.image_dir)?;
        fs::create_dir_all(&paths.log_dir)?;
        Ok(Self {
            audio_dir: paths.audio_dir.clone(),
            image_dir: paths.image_dir.clone(),
        })
    }

    /// Recording path for a pass, derived only from its start so reruns land on the same file.
    pub fn audio_path(&self, pass_start: DateTime<Utc>) -> PathBuf {
        let timestamp = pass_start.format("%Y%m%d_%H%M%S");
        self.audio_dir
            .join(format!("{}_{}.wav", AUDIO_PREFIX, timestamp))
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }
}
