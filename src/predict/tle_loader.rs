use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use sgp4::Elements;

use crate::predict::error::PredictError;
use crate::predict::propagation::{ElevationModel, OrbitalState};

pub const CELESTRAK_STATIONS_URL: &str = "https://celestrak.com/NORAD/elements/stations.txt";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Supplies a fresh propagatable state for a named satellite.
pub trait OrbitalStateProvider {
    type State: ElevationModel;

    fn fetch(&self, satellite: &str) -> Result<Self::State, PredictError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum TleSource {
    Url(String),
    File(PathBuf),
}

impl TleSource {
    fn describe(&self) -> String {
        match self {
            TleSource::Url(url) => url.clone(),
            TleSource::File(path) => path.display().to_string(),
        }
    }
}

pub struct TleLoader {
    source: TleSource,
}

impl TleLoader {
    pub fn new(source: TleSource) -> Self {
        Self { source }
    }

    fn read_source(&self) -> Result<String, String> {
        match &self.source {
            TleSource::File(path) => fs::read_to_string(path).map_err(|e| e.to_string()),
            TleSource::Url(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(HTTP_TIMEOUT)
                    .build()
                    .map_err(|e| format!("failed to create HTTP client: {}", e))?;
                let response = client
                    .get(url)
                    .send()
                    .map_err(|e| format!("request failed: {}", e))?;
                if !response.status().is_success() {
                    return Err(format!("feed returned status {}", response.status()));
                }
                response
                    .text()
                    .map_err(|e| format!("failed to read feed body: {}", e))
            }
        }
    }
}

impl OrbitalStateProvider for TleLoader {
    type State = OrbitalState;

    fn fetch(&self, satellite: &str) -> Result<OrbitalState, PredictError> {
        log::info!("Fetching element set for {} from {}", satellite, self.source.describe());
        let content = self
            .read_source()
            .map_err(|reason| PredictError::unavailable(satellite, reason))?;

        let state = find_satellite(&content, satellite, &self.source.describe())?;
        log::info!(
            "Loaded {} (NORAD {}), epoch {}",
            state.name,
            state.norad_id(),
            state.epoch()
        );
        Ok(state)
    }
}

/// Picks one satellite out of multi-satellite TLE text, by name or NORAD number.
pub fn find_satellite(
    content: &str,
    satellite: &str,
    source_name: &str,
) -> Result<OrbitalState, PredictError> {
    let wanted = satellite.trim();
    let wanted_id: Option<u64> = wanted.parse().ok();

    for (name, line1, line2) in parse_multi_tle(content) {
        let name_matches = name
            .as_deref()
            .is_some_and(|n| n.trim().eq_ignore_ascii_case(wanted));
        let id_matches = wanted_id.is_some_and(|id| catalog_number(&line1) == Some(id));
        if !name_matches && !id_matches {
            continue;
        }

        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| {
                PredictError::unavailable(
                    satellite,
                    PredictError::InvalidTle {
                        source_name: source_name.to_string(),
                        message: e.to_string(),
                    },
                )
            })?;
        let display_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));
        return OrbitalState::from_elements(display_name, elements)
            .map_err(|e| PredictError::unavailable(satellite, e));
    }

    Err(PredictError::unavailable(
        satellite,
        format!("not found in {}", source_name),
    ))
}

fn catalog_number(line1: &str) -> Option<u64> {
    line1.get(2..7)?.trim().parse().ok()
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && !is_element_line(lines[i])
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}

fn is_element_line(line: &str) -> bool {
    line.starts_with("1 ") || line.starts_with("2 ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::propagation::tests::ISS_TLE;

    const CSS_TLE: &str = "CSS (TIANHE)
1 48274U 21035A   24153.50422743  .00023181  00000-0  27192-3 0  9997
2 48274  41.4697 224.4709 0005802 323.2264  36.8191 15.61233839175836";

    fn feed() -> String {
        format!("{}\n\n{}\n", CSS_TLE, ISS_TLE)
    }

    #[test]
    fn parses_named_and_unnamed_entries() {
        let unnamed: String = ISS_TLE.lines().skip(1).collect::<Vec<_>>().join("\n");
        let content = format!("garbage line\n{}\n{}\ntrailing garbage\n", CSS_TLE, unnamed);
        let entries = parse_multi_tle(&content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0.as_deref(), Some("CSS (TIANHE)"));
        assert!(entries[1].0.is_none());
        assert!(entries[1].1.starts_with("1 25544U"));
    }

    #[test]
    fn orphan_element_line_is_not_taken_as_a_name() {
        let css_line2 = CSS_TLE.lines().nth(2).unwrap();
        let unnamed: String = ISS_TLE.lines().skip(1).collect::<Vec<_>>().join("\n");
        let content = format!("{}\n{}", css_line2, unnamed);
        let entries = parse_multi_tle(&content);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].0.is_none());
        assert!(entries[0].2.starts_with("2 25544"));
    }

    #[test]
    fn finds_satellite_by_name_case_insensitively() {
        let state = find_satellite(&feed(), "iss (zarya)", "test").unwrap();
        assert_eq!(state.name, "ISS (ZARYA)");
        assert_eq!(state.norad_id(), 25544);
    }

    #[test]
    fn finds_satellite_by_catalog_number() {
        let state = find_satellite(&feed(), "25544", "test").unwrap();
        assert_eq!(state.name, "ISS (ZARYA)");
    }

    #[test]
    fn missing_satellite_is_data_unavailable() {
        let err = find_satellite(&feed(), "HUBBLE", "test").err().unwrap();
        assert!(matches!(err, PredictError::DataUnavailable { ref satellite, .. } if satellite == "HUBBLE"));
    }

    #[test]
    fn unreadable_file_is_data_unavailable() {
        let loader = TleLoader::new(TleSource::File(PathBuf::from(
            "/nonexistent/iss-o-mat/stations.txt",
        )));
        let err = loader.fetch("ISS (ZARYA)").err().unwrap();
        assert!(matches!(err, PredictError::DataUnavailable { .. }));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("iss-o-mat-tle-{}.txt", std::process::id()));
        fs::write(&path, feed()).unwrap();
        let loader = TleLoader::new(TleSource::File(path.clone()));
        let state = loader.fetch("ISS (ZARYA)").unwrap();
        assert_eq!(state.norad_id(), 25544);
        let _ = fs::remove_file(path);
    }
}
