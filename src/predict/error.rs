use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("element set for {satellite} unavailable: {reason}")]
    DataUnavailable { satellite: String, reason: String },
    #[error("Invalid TLE format in {source_name}: {message}")]
    InvalidTle { source_name: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("scan horizon {0} runs past the representable time range")]
    HorizonOutOfRange(chrono::Duration),
    #[error("scan step must be positive, got {0}")]
    InvalidStep(chrono::Duration),
}

impl PredictError {
    pub fn unavailable(satellite: &str, reason: impl ToString) -> Self {
        PredictError::DataUnavailable {
            satellite: satellite.to_string(),
            reason: reason.to_string(),
        }
    }
}
