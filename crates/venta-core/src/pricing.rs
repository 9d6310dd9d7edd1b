//! # Pricing Module
//!
//! Derives the sale price of a product line from the product's cost
//! fields.
//!
//! ## The Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Derived Pricing                               │
//! │                                                                     │
//! │  iva_amount    = iva × supplier_cost        (informational)         │
//! │  base_cost     = micro + supplier_cost                              │
//! │  minimum_cost  = base_cost / (1 − salvament_margin)                 │
//! │  final_price   = minimum_cost / (1 − profit_margin)                 │
//! │                  rounded to 3 decimal places                        │
//! │                                                                     │
//! │  Example: cost 100, micro 10, salvament 0.2, profit 0.25            │
//! │    base     = 110.000                                               │
//! │    minimum  = 110.000 / 0.8  = 137.500                              │
//! │    final    = 137.500 / 0.75 = 183.333                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A margin of 1 (or more) would divide by zero or flip the sign;
//! pricing rejects such product records with
//! [`CoreError::MarginConfiguration`] instead of propagating Infinity
//! into a total.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::types::{Product, SaleProductLine};

// =============================================================================
// Breakdown
// =============================================================================

/// Intermediate figures of one pricing run. Kept for transparency and
/// debugging; never persisted with the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    /// `iva × supplier_cost`.
    pub iva_amount: Money,
    /// `micro + supplier_cost`.
    pub base_cost: Money,
    /// `base_cost / (1 − salvament_margin)`.
    pub minimum_cost: Money,
    /// `minimum_cost / (1 − profit_margin)`, rounded to 3 decimals.
    pub final_price: Money,
}

/// A line item freshly priced against a resolved product.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub line: SaleProductLine,
    pub breakdown: PriceBreakdown,
}

// =============================================================================
// Calculator
// =============================================================================

/// Divides `amount` by the complement of `margin` (`1 − margin`),
/// rounding half-up to the nearest mil.
fn divide_by_complement(
    amount: Money,
    margin: Rate,
    field: &'static str,
) -> CoreResult<Money> {
    if margin.is_unit_or_more() {
        return Err(CoreError::MarginConfiguration {
            field,
            rate: margin,
        });
    }

    let denominator = (10_000 - margin.bps()) as i128;
    let numerator = amount.mils() as i128 * 10_000;
    let mils = (numerator + denominator / 2) / denominator;
    Ok(Money::from_mils(mils as i64))
}

/// Prices `qty` units of a resolved product.
///
/// A quantity of zero is legal (the caller decides the default; a line
/// freshly attached to a product uses 1). Margins at or above 1 are a
/// configuration error on the product record.
///
/// ```rust
/// use venta_core::money::{Money, Rate};
/// use venta_core::pricing::price_product;
/// use venta_core::types::Product;
///
/// let product = Product {
///     code: "A-100".into(),
///     name: "Widget".into(),
///     supplier_cost: Money::from_major(100),
///     micro: Money::from_major(10),
///     iva: Rate::from_fraction(0.12),
///     salvament_margin: Rate::from_fraction(0.2),
///     profit_margin: Rate::from_fraction(0.25),
/// };
/// let priced = price_product(&product, 2).unwrap();
/// assert_eq!(priced.breakdown.final_price, Money::from_mils(183_333));
/// assert_eq!(priced.line.total, Money::from_mils(366_666));
/// ```
pub fn price_product(product: &Product, qty: i64) -> CoreResult<PricedLine> {
    let iva_amount = product.supplier_cost.apply_rate(product.iva);
    let base_cost = product.micro + product.supplier_cost;
    let minimum_cost =
        divide_by_complement(base_cost, product.salvament_margin, "salvament_margin")?;
    let final_price =
        divide_by_complement(minimum_cost, product.profit_margin, "profit_margin")?;

    let breakdown = PriceBreakdown {
        iva_amount,
        base_cost,
        minimum_cost,
        final_price,
    };

    let line = SaleProductLine {
        code: product.code.clone(),
        name: product.name.clone(),
        qty,
        unit_price: Some(final_price),
        discount: None,
        total: final_price.multiply_quantity(qty),
    };

    Ok(PricedLine { line, breakdown })
}

// =============================================================================
// Unit Tests
// =============================================================================
