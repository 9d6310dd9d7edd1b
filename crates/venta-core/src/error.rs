//! # Error Types
//!
//! Domain-specific error types for venta-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  venta-core errors (this file)                                      │
//! │  ├── CoreError        - Pricing/domain failures                     │
//! │  └── ValidationError  - Schema rejections (field-level)             │
//! │                                                                     │
//! │  venta-gateway errors (separate crate)                              │
//! │  └── GatewayError     - HTTP transport / backend failures           │
//! │                                                                     │
//! │  venta-form errors (separate crate)                                 │
//! │  └── FormError        - Session and list-mutation failures          │
//! │                                                                     │
//! │  Flow: ValidationError → FormError → caller renders field errors    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, margin value)
//! 3. Errors are enum variants, never bare Strings

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::money::Rate;

// =============================================================================
// Field Errors
// =============================================================================

/// One rejected field: the name it was registered under and the message
/// to render next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered collection of field-level rejections for one candidate
/// object. Validation is all-or-nothing: either the object is accepted
/// or every violated constraint is reported here at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(Vec::new())
    }

    /// Records a rejection against `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// The message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Consumes the collection into a `Result`, the shape validators
    /// return: accepted, or the full set of rejections.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Schema rejection carrying every violated field at once.
///
/// The caller re-renders the messages against the field names it
/// registered for input; nothing here ever reaches the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {0}")]
pub struct ValidationError(pub FieldErrors);

impl ValidationError {
    /// The message recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.0.get(field)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A product record carries a margin that makes pricing undefined
    /// (`1 − margin` would be zero or negative). Reported, never
    /// silently propagated as Infinity.
    #[error("product margin {field} = {rate} makes pricing undefined")]
    MarginConfiguration { field: &'static str, rate: Rate },

    /// Validation error (wraps ValidationError).
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
