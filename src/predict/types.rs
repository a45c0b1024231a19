use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A contiguous interval during which the satellite is above the observer's horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pass {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub peak_elevation_deg: f64,
    /// Set when the pass was clipped by either edge of the scan window.
    pub truncated: bool,
}

impl Pass {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Sampled topocentric position of the satellite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pass_serializes_with_rfc3339_instants() {
        let pass = Pass {
            start: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 1, 10, 6, 30).unwrap(),
            peak_elevation_deg: 23.5,
            truncated: false,
        };
        assert_eq!(pass.duration(), Duration::seconds(390));

        let json = serde_json::to_value(&pass).unwrap();
        assert_eq!(json["start"], "2024-06-01T10:00:00Z");
        assert_eq!(json["end"], "2024-06-01T10:06:30Z");
        assert_eq!(json["peak_elevation_deg"], 23.5);
        assert_eq!(json["truncated"], false);
    }
}
