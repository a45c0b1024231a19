pub mod artifacts;
pub mod clock;
pub mod cycle;
pub mod runner;

pub use artifacts::ArtifactsManager;
pub use clock::{Clock, SystemClock};
pub use cycle::{predict_passes, Driver};
pub use runner::{DecodePolicy, PassOutcome, Runner, RunnerError, StepStatus};
