//! # venta-form: Form Session State
//!
//! Owns the in-progress sale for one editing session: the keyed
//! payment schedule, the product line list with its per-line
//! resolution state, and the builder that assembles and submits the
//! final document.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Admin Frontend (forms)                          │
//! └────────────────────────────┬────────────────────────────────────────┘
//! ┌────────────────────────────▼────────────────────────────────────────┐
//! │                  ★ venta-form (THIS CRATE) ★                        │
//! │                                                                     │
//! │   SaleBuilder ──uses──► ProductLines + PaymentSchedule              │
//! │        │                                                            │
//! │        └──talks to──► SalesBackend (venta-gateway)                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in here renders; the crate exposes state and transitions,
//! and the frontend reads them back out per entry key.

pub mod builder;
pub mod error;
pub mod lines;
pub mod schedule;

pub use builder::{SaleBuilder, SubmitOutcome};
pub use error::{FormError, FormResult};
pub use lines::{LineState, ProductLines};
pub use schedule::{EntryKey, PaymentSchedule};
