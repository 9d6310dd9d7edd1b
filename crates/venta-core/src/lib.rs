//! # venta-core: Pure Business Logic for Venta
//!
//! This crate is the **heart** of the Venta admin. It contains the business
//! rules behind the sale form as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Venta Architecture                            │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                  Admin Frontend (forms)                     │   │
//! │  │   Client Form ──► Sale Form ──► Payment Schedule            │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │                    venta-form (sessions)                    │   │
//! │  │   SaleBuilder, PaymentSchedule, ProductLines                │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │               ★ venta-core (THIS CRATE) ★                   │   │
//! │  │                                                             │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐    │   │
//! │  │   │  types   │ │  money   │ │ pricing  │ │ validation │    │   │
//! │  │   │  Client  │ │  Money   │ │ derived  │ │  schemas   │    │   │
//! │  │   │  Sale    │ │  Rate    │ │  prices  │ │  checks    │    │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └────────────┘    │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                      │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Product, Sale, payment entries)
//! - [`money`] - Money and Rate types with integer arithmetic (no floats!)
//! - [`pricing`] - Derived pricing for sale product lines
//! - [`validation`] - Schema validation with field-level errors
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **Integer Money**: Monetary values are mils (i64) to keep the
//!    three-decimal pricing rule exact
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use venta_core::money::{Money, Rate};
//! use venta_core::pricing::price_product;
//! use venta_core::types::Product;
//!
//! let product = Product {
//!     code: "A-100".into(),
//!     name: "Widget".into(),
//!     supplier_cost: Money::from_major(100),
//!     micro: Money::from_major(10),
//!     iva: Rate::from_bps(1200),
//!     salvament_margin: Rate::from_bps(2000),
//!     profit_margin: Rate::from_bps(2500),
//! };
//!
//! let priced = price_product(&product, 1).unwrap();
//! // 110.000 / 0.8 / 0.75 = 183.333 (rounded to 3 decimals)
//! assert_eq!(priced.breakdown.final_price, Money::from_mils(183_333));
//! ```

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Placeholder name written into a product line when a code lookup
/// finds nothing. The frontend renders this verbatim.
pub const UNRESOLVED_PRODUCT_NAME: &str = "product no existe";

/// Length of the one-time login code issued by the backend.
pub const LOGIN_CODE_LEN: usize = 6;
