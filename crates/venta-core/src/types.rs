//! # Domain Types
//!
//! Core domain types shared by the form layer and the backend gateway.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌────────────────┐   ┌────────────────────┐   │
//! │  │    Client     │   │     Sale       │   │      Product       │   │
//! │  │  ───────────  │   │  ────────────  │   │  ────────────────  │   │
//! │  │  firstname    │   │ operation_date │   │  code (lookup key) │   │
//! │  │  lastname     │   │ total_amount   │   │  supplier_cost     │   │
//! │  │  email        │   │ products[]     │   │  iva / margins     │   │
//! │  │  document_*   │   │ payments[]     │   │  (read-only)       │   │
//! │  └───────────────┘   └────────────────┘   └────────────────────┘   │
//! │                                                                     │
//! │  ┌───────────────────┐     ┌──────────────────────┐                │
//! │  │  SaleProductLine  │     │  PaymentMethodEntry  │                │
//! │  │  one line item    │     │  one schedule entry  │                │
//! │  └───────────────────┘     └──────────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enumerations serialize to the exact Spanish strings the backend and
//! the admin frontend exchange, so wire payloads stay byte-compatible.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};
use crate::UNRESOLVED_PRODUCT_NAME;

// =============================================================================
// Identity Documents
// =============================================================================

/// Kinds of identity documents a client may register with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DocumentType {
    #[serde(rename = "RUC")]
    Ruc,
    #[serde(rename = "NIE")]
    Nie,
    #[serde(rename = "Cédula")]
    Cedula,
    #[serde(rename = "Pasaporte")]
    Pasaporte,
    #[serde(rename = "CIF")]
    Cif,
    #[serde(rename = "NIF")]
    Nif,
    /// Kept with the backend's historical spelling.
    #[serde(rename = "DNI de Extrangero")]
    DniExtranjero,
}

// =============================================================================
// Client
// =============================================================================

/// A client (customer) record.
///
/// ## Identity
/// `id` is assigned by the backend on creation and immutable once
/// issued. A `Client` without an `id` has never been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub document_type: DocumentType,
    pub document_value: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product record, read-only from this core's perspective.
///
/// The pricing calculator derives a sale price from the cost fields;
/// nothing here is ever written back to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Business lookup key, entered by the user on a sale line.
    pub code: String,
    pub name: String,
    pub supplier_cost: Money,
    /// Per-unit surcharge added to the supplier cost.
    pub micro: Money,
    /// Tax rate as a fraction (0.12 = 12%).
    pub iva: Rate,
    /// Must stay strictly below 1; pricing rejects it otherwise.
    pub salvament_margin: Rate,
    /// Must stay strictly below 1; pricing rejects it otherwise.
    pub profit_margin: Rate,
}

// =============================================================================
// Payment Methods
// =============================================================================

/// The payment instruments the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[serde(rename = "Sin utilización Sist. Financiero")]
    SinSistemaFinanciero,
    #[serde(rename = "Compensación de Deudas")]
    CompensacionDeudas,
    #[serde(rename = "Tarjeta de débito")]
    TarjetaDebito,
    #[serde(rename = "Tarjeta de crédito")]
    TarjetaCredito,
    #[serde(rename = "Dinero electrónico")]
    DineroElectronico,
    #[serde(rename = "Tarjeta prepago")]
    TarjetaPrepago,
    #[serde(rename = "Endoso de títulos")]
    EndosoTitulos,
}

/// Unit for a payment term length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TimeUnit {
    #[serde(rename = "Días")]
    Dias,
    #[serde(rename = "Meses")]
    Meses,
    #[serde(rename = "Años")]
    Anos,
}

/// One entry in a sale's payment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethodEntry {
    pub method: PaymentMethod,
    pub amount: Money,
    pub time_unit: TimeUnit,
    /// Term length in `time_unit`s.
    pub time_value: i64,
}

impl Default for PaymentMethodEntry {
    /// The entry every new sale starts with, and the one appended when
    /// the user adds a method without filling it in yet.
    fn default() -> Self {
        PaymentMethodEntry {
            method: PaymentMethod::TarjetaDebito,
            amount: Money::from_major(5000),
            time_unit: TimeUnit::Dias,
            time_value: 0,
        }
    }
}

// =============================================================================
// Sale Product Line
// =============================================================================

/// One product line item within a sale.
///
/// `total` is derived by the pricing calculator once the line resolves
/// against a product; it is never independently user-set after that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleProductLine {
    pub code: String,
    pub name: String,
    pub qty: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,
    pub total: Money,
}

impl SaleProductLine {
    /// An empty line, as seeded into a brand-new sale.
    pub fn empty() -> Self {
        SaleProductLine {
            code: String::new(),
            name: String::new(),
            qty: 0,
            unit_price: None,
            discount: None,
            total: Money::zero(),
        }
    }

    /// The placeholder written back when a code lookup finds no product.
    /// The user can edit the code and retry; nothing else is lost.
    pub fn sentinel(code: &str) -> Self {
        SaleProductLine {
            code: code.to_string(),
            name: UNRESOLVED_PRODUCT_NAME.to_string(),
            qty: 0,
            unit_price: None,
            discount: None,
            total: Money::zero(),
        }
    }

    /// True when this line holds the failed-lookup placeholder.
    pub fn is_sentinel(&self) -> bool {
        self.name == UNRESOLVED_PRODUCT_NAME && self.qty == 0
    }
}

impl Default for SaleProductLine {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale document, assembled by the form layer and submitted whole.
///
/// ## Invariant
/// `total_amount` equals the sum of resolved product line totals; the
/// builder recomputes it on assembly rather than trusting form state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[ts(as = "Option<String>")]
    pub operation_date: Option<NaiveDate>,
    pub total_amount: Money,
    /// Backend identity of the client, bound after a document lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Denormalized document value the client was looked up by.
    pub client_document: String,
    pub products: Vec<SaleProductLine>,
    pub payment_methods: Vec<PaymentMethodEntry>,
}

impl Sale {
    /// True once the backend has issued an identity; submit() switches
    /// between create and update on this.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

// =============================================================================
// Login
// =============================================================================

/// Credentials for the email + one-time-code login flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginCredentials {
    pub email: String,
    pub code: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&DocumentType::Cedula).unwrap(),
            "\"Cédula\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentType::DniExtranjero).unwrap(),
            "\"DNI de Extrangero\""
        );
        let dt: DocumentType = serde_json::from_str("\"RUC\"").unwrap();
        assert_eq!(dt, DocumentType::Ruc);
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::SinSistemaFinanciero).unwrap(),
            "\"Sin utilización Sist. Financiero\""
        );
        let pm: PaymentMethod = serde_json::from_str("\"Tarjeta de débito\"").unwrap();
        assert_eq!(pm, PaymentMethod::TarjetaDebito);
        assert!(serde_json::from_str::<PaymentMethod>("\"Cheque\"").is_err());
    }

    #[test]
    fn test_time_unit_wire_names() {
        assert_eq!(serde_json::to_string(&TimeUnit::Dias).unwrap(), "\"Días\"");
        assert_eq!(serde_json::to_string(&TimeUnit::Anos).unwrap(), "\"Años\"");
        let tu: TimeUnit = serde_json::from_str("\"Meses\"").unwrap();
        assert_eq!(tu, TimeUnit::Meses);
    }

    #[test]
    fn test_default_payment_entry() {
        let entry = PaymentMethodEntry::default();
        assert_eq!(entry.method, PaymentMethod::TarjetaDebito);
        assert_eq!(entry.amount, Money::from_major(5000));
        assert_eq!(entry.time_unit, TimeUnit::Dias);
        assert_eq!(entry.time_value, 0);
    }

    #[test]
    fn test_sentinel_line() {
        let line = SaleProductLine::sentinel("XYZ-404");
        assert_eq!(line.code, "XYZ-404");
        assert_eq!(line.name, "product no existe");
        assert_eq!(line.qty, 0);
        assert!(line.total.is_zero());
        assert!(line.is_sentinel());
        assert!(!SaleProductLine::empty().is_sentinel());
    }

    #[test]
    fn test_sale_serializes_without_unset_id() {
        let sale = Sale {
            id: None,
            operation_date: None,
            total_amount: Money::zero(),
            client: None,
            client_document: "12345678".to_string(),
            products: vec![SaleProductLine::empty()],
            payment_methods: vec![PaymentMethodEntry::default()],
        };
        let json = serde_json::to_value(&sale).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("client").is_none());
        assert_eq!(json["client_document"], "12345678");
    }
}
