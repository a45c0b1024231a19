use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::propagation::ElevationModel;
use crate::predict::types::Pass;
use crate::predict::GroundStation;

pub const DEFAULT_STEP_SECONDS: i64 = 10;
pub const DEFAULT_HORIZON_HOURS: i64 = 48;
const HORIZON_ELEVATION: f64 = 0.0;

/// Partition `[horizon_start, horizon_start + horizon]` into visibility intervals.
///
/// The window is sampled every `step`; a pass opens on the first sample above the
/// horizon and closes on the first sample at or below it, so each boundary lies
/// within one step of the true crossing. A pass still in progress when the window
/// closes is emitted with `end` at the window edge and `truncated` set, as is a
/// pass already in progress at `horizon_start`.
pub fn scan<M: ElevationModel + ?Sized>(
    model: &M,
    station: &GroundStation,
    horizon_start: DateTime<Utc>,
    horizon: Duration,
    step: Duration,
) -> Result<Vec<Pass>, PredictError> {
    if step <= Duration::zero() {
        return Err(PredictError::InvalidStep(step));
    }

    let horizon_end = horizon_start
        .checked_add_signed(horizon)
        .ok_or(PredictError::HorizonOutOfRange(horizon))?;
    let mut passes = Vec::new();
    let mut cursor = horizon_start;

    while cursor < horizon_end {
        let elevation = model.elevation_at(station, cursor)?;

        if elevation > HORIZON_ELEVATION {
            let start = cursor;
            let mut peak = elevation;
            let mut end = None;

            while cursor < horizon_end {
                cursor = advance(cursor, step, horizon_end);
                let elevation = model.elevation_at(station, cursor)?;
                if elevation <= HORIZON_ELEVATION {
                    end = Some(cursor);
                    break;
                }
                peak = peak.max(elevation);
            }

            let pass = match end {
                Some(end) => Pass {
                    start,
                    end,
                    peak_elevation_deg: peak,
                    truncated: start == horizon_start,
                },
                None => {
                    log::debug!("Pass starting {} still above horizon at window end", start);
                    Pass {
                        start,
                        end: horizon_end,
                        peak_elevation_deg: peak,
                        truncated: true,
                    }
                }
            };
            passes.push(pass);
        }

        cursor = match cursor.checked_add_signed(step) {
            Some(next) => next,
            None => break,
        };
    }

    log::debug!(
        "Scanned {} to {} at {}s steps: {} passes",
        horizon_start,
        horizon_end,
        step.num_seconds(),
        passes.len()
    );
    Ok(passes)
}

/// `cursor + step`, clamped to `limit`.
fn advance(cursor: DateTime<Utc>, step: Duration, limit: DateTime<Utc>) -> DateTime<Utc> {
    cursor
        .checked_add_signed(step)
        .map_or(limit, |next| next.min(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::propagation::tests::iss_state;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use std::f64::consts::PI;

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn station() -> GroundStation {
        GroundStation::new(55.5711, 24.2554, 0.0).unwrap()
    }

    fn seconds_since(origin: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
        (t - origin).num_milliseconds() as f64 / 1000.0
    }

    /// Half-sine bump strictly between `rise` and `set`, well below the horizon elsewhere.
    struct Bump {
        origin: DateTime<Utc>,
        rise_s: f64,
        set_s: f64,
        peak_deg: f64,
    }

    impl ElevationModel for Bump {
        fn elevation_at(&self, _: &GroundStation, t: DateTime<Utc>) -> Result<f64, PredictError> {
            let s = seconds_since(self.origin, t);
            if s > self.rise_s && s < self.set_s {
                Ok(self.peak_deg * (PI * (s - self.rise_s) / (self.set_s - self.rise_s)).sin())
            } else {
                Ok(-10.0)
            }
        }
    }

    /// `30 sin(2πt/P) - 15`: above the horizon on (P/12, 5P/12) of every period.
    struct Periodic {
        origin: DateTime<Utc>,
        period_s: f64,
    }

    impl ElevationModel for Periodic {
        fn elevation_at(&self, _: &GroundStation, t: DateTime<Utc>) -> Result<f64, PredictError> {
            let s = seconds_since(self.origin, t);
            Ok(30.0 * (2.0 * PI * s / self.period_s).sin() - 15.0)
        }
    }

    struct Constant(f64);

    impl ElevationModel for Constant {
        fn elevation_at(&self, _: &GroundStation, _: DateTime<Utc>) -> Result<f64, PredictError> {
            Ok(self.0)
        }
    }

    fn assert_well_formed(passes: &[Pass], start: DateTime<Utc>, horizon: Duration) {
        for pass in passes {
            assert!(pass.start < pass.end);
            assert!(pass.start >= start && pass.end <= start + horizon);
            assert!(pass.peak_elevation_deg >= 0.0);
        }
        for pair in passes.windows(2) {
            assert!(pair[0].end < pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn single_bump_over_vilnius_region() {
        let bump = Bump {
            origin: origin(),
            rise_s: 600.0,
            set_s: 960.0,
            peak_deg: 23.4,
        };
        let step = Duration::seconds(DEFAULT_STEP_SECONDS);
        let horizon = Duration::hours(DEFAULT_HORIZON_HOURS);

        let passes = scan(&bump, &station(), origin(), horizon, step).unwrap();

        assert_eq!(passes.len(), 1);
        let pass = &passes[0];
        assert_relative_eq!(pass.peak_elevation_deg, 23.4, epsilon = 0.05);
        assert!((pass.start - (origin() + Duration::minutes(10))).abs() <= step);
        assert!((pass.end - (origin() + Duration::minutes(16))).abs() <= step);
        assert!(pass.start > origin() + Duration::minutes(10));
        assert!(pass.end >= origin() + Duration::minutes(16));
        assert!(!pass.truncated);
    }

    #[test]
    fn boundaries_within_one_step_of_analytic_crossings() {
        let period_s = 5400.0;
        let model = Periodic {
            origin: origin(),
            period_s,
        };
        let horizon = Duration::hours(48);

        for step_s in [1, 7, 10, 60] {
            let step = Duration::seconds(step_s);
            let passes = scan(&model, &station(), origin(), horizon, step).unwrap();
            assert_eq!(passes.len(), 32, "step {}s", step_s);
            assert_well_formed(&passes, origin(), horizon);

            for (n, pass) in passes.iter().enumerate() {
                let base = n as f64 * period_s;
                let rise = base + period_s / 12.0;
                let set = base + 5.0 * period_s / 12.0;
                let tolerance = step_s as f64 + 1e-3;
                assert!((seconds_since(origin(), pass.start) - rise).abs() <= tolerance);
                assert!((seconds_since(origin(), pass.end) - set).abs() <= tolerance);
                assert!(pass.peak_elevation_deg <= 15.0 + 1e-9);
                assert!(pass.peak_elevation_deg > 14.0);
            }
        }
    }

    #[test]
    fn never_above_horizon_yields_nothing() {
        let passes = scan(
            &Constant(-5.0),
            &station(),
            origin(),
            Duration::hours(48),
            Duration::seconds(10),
        )
        .unwrap();
        assert!(passes.is_empty());

        let grazing = scan(
            &Constant(0.0),
            &station(),
            origin(),
            Duration::hours(1),
            Duration::seconds(10),
        )
        .unwrap();
        assert!(grazing.is_empty());
    }

    #[test]
    fn never_setting_satellite_emits_one_truncated_pass() {
        let horizon = Duration::seconds(95);
        let passes = scan(
            &Constant(42.0),
            &station(),
            origin(),
            horizon,
            Duration::seconds(10),
        )
        .unwrap();

        assert_eq!(
            passes,
            vec![Pass {
                start: origin(),
                end: origin() + horizon,
                peak_elevation_deg: 42.0,
                truncated: true,
            }]
        );
    }

    #[test]
    fn pass_cut_by_window_end_is_truncated() {
        let bump = Bump {
            origin: origin(),
            rise_s: 3000.0,
            set_s: 3600.0,
            peak_deg: 60.0,
        };
        let horizon = Duration::seconds(3200);
        let passes = scan(&bump, &station(), origin(), horizon, Duration::seconds(10)).unwrap();

        assert_eq!(passes.len(), 1);
        assert!(passes[0].truncated);
        assert_eq!(passes[0].end, origin() + horizon);
        assert!(passes[0].peak_elevation_deg < 60.0);
        assert_well_formed(&passes, origin(), horizon);
    }

    #[test]
    fn pass_in_progress_at_window_start_is_truncated() {
        let bump = Bump {
            origin: origin(),
            rise_s: -100.0,
            set_s: 200.0,
            peak_deg: 20.0,
        };
        let passes = scan(
            &bump,
            &station(),
            origin(),
            Duration::hours(1),
            Duration::seconds(10),
        )
        .unwrap();

        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].start, origin());
        assert_eq!(passes[0].end, origin() + Duration::seconds(200));
        assert!(passes[0].truncated);
    }

    #[test]
    fn rejects_non_positive_step() {
        let err = scan(
            &Constant(1.0),
            &station(),
            origin(),
            Duration::hours(1),
            Duration::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, PredictError::InvalidStep(_)));
    }

    #[test]
    fn unrepresentable_horizon_is_an_error() {
        let err = scan(
            &Constant(1.0),
            &station(),
            origin(),
            Duration::MAX,
            Duration::seconds(10),
        )
        .unwrap_err();
        assert!(matches!(err, PredictError::HorizonOutOfRange(_)));
    }

    #[test]
    fn huge_step_stops_at_window_end() {
        let passes = scan(
            &Constant(5.0),
            &station(),
            origin(),
            Duration::hours(1),
            Duration::MAX,
        )
        .unwrap();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].end, origin() + Duration::hours(1));
        assert!(passes[0].truncated);
    }

    #[test]
    fn repeated_scans_are_identical() {
        let state = iss_state();
        let start = state.epoch();
        let horizon = Duration::hours(24);
        let step = Duration::seconds(10);

        let first = scan(&state, &station(), start, horizon, step).unwrap();
        let second = scan(&state, &station(), start, horizon, step).unwrap();

        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert_well_formed(&first, start, horizon);
        for pass in &first {
            assert!(pass.duration() <= Duration::minutes(15));
            assert!(pass.peak_elevation_deg <= 90.0);
        }
    }
}
