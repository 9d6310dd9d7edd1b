//! Form session error types.
//!
//! Everything the session layer can reject bubbles up through
//! [`FormError`]; the three lower layers keep their own types and
//! convert in via `#[from]`.

use thiserror::Error;

use venta_core::{CoreError, ValidationError};
use venta_gateway::GatewayError;

/// Errors from form session operations.
#[derive(Debug, Error)]
pub enum FormError {
    /// Refused removal that would leave a keyed list empty. Both the
    /// payment schedule and the product lines always keep one entry.
    #[error("la lista debe conservar al menos una entrada")]
    LastEntry,

    /// The entry key does not exist in the list (already removed, or
    /// from a previous session).
    #[error("entrada desconocida")]
    UnknownEntry,

    /// A submit is already in flight for this session.
    #[error("envío ya en curso")]
    SubmitInFlight,

    /// The sale requested for editing does not exist on the backend.
    #[error("venta no encontrada: {0}")]
    SaleNotFound(String),

    /// No client is registered under the given document value.
    #[error("cliente no encontrado: {0}")]
    ClientNotFound(String),

    /// Pricing or other domain failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Schema rejection; carries every violated field.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend transport failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Convenience type alias for Results with FormError.
pub type FormResult<T> = Result<T, FormError>;
