mod error;
mod ground_station;
mod pass_finder;
pub(crate) mod propagation;
mod tle_loader;
mod types;

pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_finder::{scan, DEFAULT_HORIZON_HOURS, DEFAULT_STEP_SECONDS};
pub use tle_loader::{OrbitalStateProvider, TleLoader, TleSource, CELESTRAK_STATIONS_URL};
pub use types::Pass;
