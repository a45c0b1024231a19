use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

use crate::abort::AbortSignal;
use crate::config::Settings;
use crate::predict::{scan, OrbitalStateProvider, Pass, PredictError};
use crate::report::{print_passes, separator, Severity};
use crate::scheduler::{Clock, PassOutcome, Runner, RunnerError, StepStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum CycleState {
    /// Fetch a fresh element set, predict, then work through the passes.
    Scanning,
    /// Idle until the next local midnight.
    Waiting { until: DateTime<Utc> },
}

/// Drives the daily predict → capture → wait loop.
pub struct Driver<'a, P: OrbitalStateProvider> {
    pub settings: &'a Settings,
    pub provider: &'a P,
    pub clock: &'a dyn Clock,
    pub runner: Runner<'a>,
}

impl<P: OrbitalStateProvider> Driver<'_, P> {
    /// Loops forever; the only way out is an abort.
    pub fn run_forever(&self) -> AbortSignal {
        let mut state = CycleState::Scanning;
        loop {
            state = match self.step(state) {
                Ok(next) => next,
                Err(signal) => return signal,
            };
        }
    }

    pub fn step(&self, state: CycleState) -> Result<CycleState, AbortSignal> {
        match state {
            CycleState::Scanning => {
                self.run_cycle()?;
                let now = self.clock.now();
                let until = next_local_midnight(now, self.settings.timezone);
                log::info!(
                    "Waiting until midnight (00:00). Time left: {} seconds.",
                    (until - now).num_seconds()
                );
                Ok(CycleState::Waiting { until })
            }
            CycleState::Waiting { until } => {
                self.clock.sleep_until(until)?;
                Ok(CycleState::Scanning)
            }
        }
    }

    fn run_cycle(&self) -> Result<(), AbortSignal> {
        log::info!("{}", separator('=', 40));
        log::info!(
            "Calculating {} passes for the next {} hours...",
            self.settings.satellite,
            self.settings.horizon.num_hours()
        );

        let passes = match predict_passes(self.provider, self.settings, self.clock.now()) {
            Ok(passes) => passes,
            Err(e) => {
                log::error!("Prediction failed, skipping this cycle: {}", e);
                return Ok(());
            }
        };

        print_passes(&passes, self.settings.timezone);

        let outcomes = self.runner.run(&passes).map_err(|e| match e {
            RunnerError::Aborted(signal) => signal,
        })?;
        summarize(&outcomes);
        Ok(())
    }
}

/// Fetches a fresh element set and scans the configured horizon starting at `from`.
pub fn predict_passes<P: OrbitalStateProvider>(
    provider: &P,
    settings: &Settings,
    from: DateTime<Utc>,
) -> Result<Vec<Pass>, PredictError> {
    let state = provider.fetch(&settings.satellite)?;
    scan(
        &state,
        &settings.station,
        from,
        settings.horizon,
        settings.step,
    )
}

fn summarize(outcomes: &[PassOutcome]) {
    for outcome in outcomes {
        if let StepStatus::Failed(reason) = &outcome.capture {
            log::warn!("{}: capture failed: {}", outcome.audio.display(), reason);
        }
        if let StepStatus::Failed(reason) = &outcome.decode {
            log::warn!("{}: decode failed: {}", outcome.audio.display(), reason);
        }
    }

    let captured = outcomes.iter().filter(|o| o.capture.is_success()).count();
    let decoded = outcomes.iter().filter(|o| o.decode.is_success()).count();
    let slipped = outcomes.iter().filter(|o| o.slip.is_some()).count();
    let good = outcomes
        .iter()
        .filter(|o| Severity::from_elevation(o.pass.peak_elevation_deg) == Severity::Good)
        .count();
    let busy = outcomes
        .iter()
        .fold(Duration::zero(), |acc, o| acc + (o.completed_at - o.started_at));

    log::info!("{}", separator('=', 40));
    log::info!(
        "All passes processed: {} passes ({} good), {} captured, {} decoded, {} started late, {} min busy",
        outcomes.len(),
        good,
        captured,
        decoded,
        slipped,
        busy.num_minutes()
    );
}

/// First instant strictly after `now` at which the local date in `tz` changes.
///
/// Where local midnight does not exist (DST gap), the first valid local instant of
/// the new day is used instead.
pub fn next_local_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let Some(midnight) = today.succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return now + Duration::days(1);
    };

    (0..=24 * 60)
        .map(|m| midnight + Duration::minutes(m))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| now + Duration::days(1))
}
