//! # Validation Module
//!
//! Schema validation for the objects the forms submit.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Validation Layers                             │
//! │                                                                     │
//! │  Layer 1: Types (serde)                                             │
//! │  ├── Enum membership (document type, payment method, time unit)     │
//! │  └── Numeric/date shape — a Sale that deserialized is well-typed    │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE (submission time)                             │
//! │  ├── Field constraints (min lengths, email grammar, ranges)         │
//! │  └── All-or-nothing: accepted value OR every violation at once      │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Backend (authoritative)                                   │
//! │  └── Uniqueness, referential integrity                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators are pure functions of the candidate object; no network
//! call ever happens in here. Rejections come back keyed by the field
//! names the forms register (`firstname`, `payment_methods.0.amount`),
//! so the caller can render each message next to its input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FieldErrors, ValidationError};
use crate::types::{Client, LoginCredentials, Sale};
use crate::LOGIN_CODE_LEN;

/// Result type for validation operations.
pub type ValidationResult = Result<(), ValidationError>;

// =============================================================================
// Messages
// =============================================================================

/// Rendered when the email grammar check fails. Fixed wording the
/// frontend displays verbatim.
pub const MSG_INVALID_EMAIL: &str = "Email inválido";

/// Rendered when the login code is not exactly six characters.
pub const MSG_CODE_LENGTH: &str = "El código debe tener 6 caracteres";

fn msg_min_chars(min: usize) -> String {
    format!("debe tener al menos {} caracteres", min)
}

// =============================================================================
// Email Grammar
// =============================================================================

/// Static email regex pattern compiled once at first use.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("EMAIL_REGEX pattern is valid and well-formed")
});

/// Checks a candidate address against the email grammar.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

// =============================================================================
// Client Schema
// =============================================================================

/// Validates a client form submission.
///
/// ## Rules
/// - firstname, lastname: at least 3 characters
/// - email: must match the email grammar ("Email inválido")
/// - document_value: at least 5 characters
///
/// Document type membership is already enforced by [`crate::types::DocumentType`].
pub fn validate_client(client: &Client) -> ValidationResult {
    let mut errors = FieldErrors::new();

    if client.firstname.chars().count() < 3 {
        errors.push("firstname", msg_min_chars(3));
    }
    if client.lastname.chars().count() < 3 {
        errors.push("lastname", msg_min_chars(3));
    }
    if !is_valid_email(&client.email) {
        errors.push("email", MSG_INVALID_EMAIL);
    }
    if client.document_value.chars().count() < 5 {
        errors.push("document_value", msg_min_chars(5));
    }

    errors.into_result()
}

// =============================================================================
// Sale Schema
// =============================================================================

/// Validates a sale document before submission.
///
/// ## Rules
/// - operation_date: must be set (a set date is valid by construction)
/// - total_amount: non-negative
/// - client: must be bound (a document lookup succeeded)
/// - every payment entry: amount non-negative, term length non-negative
/// - every product line: quantity non-negative
pub fn validate_sale(sale: &Sale) -> ValidationResult {
    let mut errors = FieldErrors::new();

    if sale.operation_date.is_none() {
        errors.push("operation_date", "fecha de operación requerida");
    }
    if sale.total_amount.is_negative() {
        errors.push("total_amount", "no puede ser negativo");
    }
    if sale.client.is_none() {
        errors.push("client", "cliente no asignado");
    }

    for (i, entry) in sale.payment_methods.iter().enumerate() {
        if entry.amount.is_negative() {
            errors.push(
                &format!("payment_methods.{}.amount", i),
                "no puede ser negativo",
            );
        }
        if entry.time_value < 0 {
            errors.push(
                &format!("payment_methods.{}.time_value", i),
                "no puede ser negativo",
            );
        }
    }

    for (i, line) in sale.products.iter().enumerate() {
        if line.qty < 0 {
            errors.push(&format!("products.{}.qty", i), "no puede ser negativo");
        }
    }

    errors.into_result()
}

// =============================================================================
// Login Schema
// =============================================================================

/// Validates login credentials before they go to the auth endpoint.
///
/// ## Rules
/// - email: must match the email grammar
/// - code: exactly six characters
pub fn validate_login(credentials: &LoginCredentials) -> ValidationResult {
    let mut errors = FieldErrors::new();

    if !is_valid_email(&credentials.email) {
        errors.push("email", MSG_INVALID_EMAIL);
    }
    if credentials.code.chars().count() != LOGIN_CODE_LEN {
        errors.push("code", MSG_CODE_LENGTH);
    }

    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================
