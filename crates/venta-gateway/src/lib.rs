//! # venta-gateway: Backend Gateway Client
//!
//! HTTP client for the external sales backend. The backend is a
//! REST-ish JSON API over HTTPS; every response wraps its payload
//! under a `data` key and every request carries the session cookie
//! issued by the login flow.
//!
//! ## External Contract
//! ```text
//! GET  /clients              list clients
//! GET  /clients/{id}         fetch one client
//! POST /clients              create client
//! PUT  /clients/{id}         update client
//! GET  /client/{document}    lookup client by document value
//! GET  /products/{code}      fetch product by code
//! GET  /sales/{id}           fetch sale
//! POST /sales                create sale
//! PUT  /sales/{id}           update sale
//! POST /auth/login/{email}        complete login (body: { "code": … })
//! POST /auth/login/{email}/code   request a fresh code
//! ```
//!
//! This crate consumes the contract; it does not implement or specify
//! the backend itself.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;

pub use backend::SalesBackend;
pub use client::Gateway;
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
