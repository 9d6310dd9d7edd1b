//! Gateway error types.
//!
//! Errors are split by what the caller can do about them: a `NotFound`
//! is rendered inline next to the field that triggered the lookup, an
//! `Unauthorized` sends the user back to login, and transport errors
//! are surfaced with the form state preserved.

use thiserror::Error;

/// Errors from talking to the backend gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend reported no match for the requested resource (404).
    /// Carries the request path for context.
    #[error("no encontrado: {0}")]
    NotFound(String),

    /// Session cookie missing or expired (401/403).
    #[error("sesión no autorizada")]
    Unauthorized,

    /// The backend answered with an unexpected non-2xx status.
    #[error("backend respondió {status}: {body}")]
    Http { status: u16, body: String },

    /// The backend was unreachable or the connection failed mid-flight.
    #[error("error de red: {0}")]
    Network(String),

    /// The response body did not match the expected envelope shape.
    #[error("respuesta inválida del backend: {0}")]
    Decode(String),

    /// The gateway configuration is unusable (bad URL, bad file).
    #[error("configuración inválida: {0}")]
    Config(String),
}

impl GatewayError {
    /// True for the "lookup found nothing" case the forms render
    /// inline instead of aborting.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

/// Convenience type alias for Results with GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
