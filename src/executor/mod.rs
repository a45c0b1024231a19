pub mod process;

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to spawn `{label}`: {source}")]
    Spawn {
        label: String,
        #[source]
        source: io::Error,
    },
    #[error("`{label}` exited with {}", describe_exit(.code))]
    Failed { label: String, code: Option<i32> },
    #[error("no usable output at {0}")]
    EmptyArtifact(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

/// Records the downlink for `[start, end]` into `output`, blocking for roughly `end - start`.
pub trait Capture {
    fn capture(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        output: &Path,
    ) -> Result<(), ExecutorError>;
}

/// Turns a recorded artifact into zero or more products under `output_dir`.
pub trait Decode {
    fn decode(&self, input: &Path, output_dir: &Path) -> Result<(), ExecutorError>;
}
