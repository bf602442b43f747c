use thiserror::Error;

/// Errors from talking to the SnapSphere backend or a geocoding service.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("This request needs a signed-in session")]
    Unauthenticated,
}
