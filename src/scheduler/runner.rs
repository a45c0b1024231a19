use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::abort::AbortSignal;
use crate::executor::{Capture, Decode};
use crate::predict::Pass;
use crate::report::{format_local, separator};
use crate::scheduler::{ArtifactsManager, Clock};

/// Whether a failed capture still gets a decode attempt.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    #[default]
    OnCaptureSuccess,
    Always,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("aborted: {0}")]
    Aborted(AbortSignal),
}

type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StepStatus {
    Succeeded,
    Failed(String),
    Skipped,
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Succeeded)
    }
}

/// What happened to one pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub pass: Pass,
    pub audio: PathBuf,
    /// How late the capture began relative to `pass.start`, if at all.
    pub slip: Option<Duration>,
    pub capture: StepStatus,
    pub decode: StepStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Captures and decodes passes strictly one after another.
pub struct Runner<'a> {
    pub clock: &'a dyn Clock,
    pub capture: &'a dyn Capture,
    pub decode: &'a dyn Decode,
    pub artifacts: &'a ArtifactsManager,
    pub decode_policy: DecodePolicy,
    pub timezone: Tz,
}

impl Runner<'_> {
    /// Walks `passes` in order. Capture or decode failures are recorded in the
    /// outcome and never stop the walk; only an abort does.
    pub fn run(&self, passes: &[Pass]) -> RunnerResult<Vec<PassOutcome>> {
        let mut outcomes = Vec::with_capacity(passes.len());
        for pass in passes {
            outcomes.push(self.run_pass(pass)?);
        }
        Ok(outcomes)
    }

    fn run_pass(&self, pass: &Pass) -> RunnerResult<PassOutcome> {
        log::info!("{}", separator('-', 40));
        log::info!(
            "Starting ISS pass: from {} to {}",
            format_local(pass.start, self.timezone),
            format_local(pass.end, self.timezone)
        );

        let now = self.clock.now();
        let slip = if now < pass.start {
            log::info!(
                "Waiting {} seconds until recording starts...",
                (pass.start - now).num_seconds()
            );
            self.clock
                .sleep_until(pass.start)
                .map_err(RunnerError::Aborted)?;
            None
        } else {
            self.clock.check_abort().map_err(RunnerError::Aborted)?;
            let late = now - pass.start;
            if late > Duration::zero() {
                log::warn!(
                    "Pass started {} seconds ago, capturing immediately for the full {} seconds",
                    late.num_seconds(),
                    pass.duration().num_seconds()
                );
                Some(late)
            } else {
                None
            }
        };

        let started_at = self.clock.now();
        let audio = self.artifacts.audio_path(pass.start);

        let capture = match self.capture.capture(pass.start, pass.end, &audio) {
            Ok(()) => StepStatus::Succeeded,
            Err(e) => {
                log::error!("Capture failed for {}: {}", audio.display(), e);
                StepStatus::Failed(e.to_string())
            }
        };

        let attempt_decode = capture.is_success() || self.decode_policy == DecodePolicy::Always;
        let decode = if attempt_decode {
            match self.decode.decode(&audio, self.artifacts.image_dir()) {
                Ok(()) => StepStatus::Succeeded,
                Err(e) => {
                    log::error!("Decode failed for {}: {}", audio.display(), e);
                    StepStatus::Failed(e.to_string())
                }
            }
        } else {
            log::warn!("Skipping decode of {}: capture failed", audio.display());
            StepStatus::Skipped
        };

        Ok(PassOutcome {
            pass: pass.clone(),
            audio,
            slip,
            capture,
            decode,
            started_at,
            completed_at: self.clock.now(),
        })
    }
}
