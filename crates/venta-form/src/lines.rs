//! # Product Lines
//!
//! The keyed list of product line items, with a per-line resolution
//! state machine.
//!
//! ## Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   Unresolved ───begin_resolve──► Resolving                          │
//! │      ▲  ▲                          │  │  │                          │
//! │      │  └───────abort_resolve──────┘  │  └──mark_not_found──► NotFound
//! │      │                                │                        │    │
//! │  set_code                     complete_resolve             set_code │
//! │      │                                │                        │    │
//! │      │                                ▼                        │    │
//! │      └─────────────────────────── Resolved ◄───────────────────┘    │
//! │                                  (editing the code re-arms it)      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A lookup response only lands while its line is still `Resolving`
//! under the same key. If the user removed the line or retyped the code
//! while the request was in flight, the late response is dropped on the
//! floor instead of clobbering the fresh state.

use tracing::debug;

use venta_core::money::Money;
use venta_core::pricing::{PriceBreakdown, PricedLine};
use venta_core::types::SaleProductLine;

use crate::error::{FormError, FormResult};
use crate::schedule::EntryKey;

// =============================================================================
// Line State
// =============================================================================

/// Resolution state of one product line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineState {
    /// Code typed (or line loaded from a persisted sale); no lookup
    /// outcome attached yet.
    Unresolved,
    /// A lookup for this line's code is in flight.
    Resolving,
    /// The code matched a product; the breakdown backs the line's
    /// price and total.
    Resolved(PriceBreakdown),
    /// The last lookup found no product; the line holds the sentinel.
    NotFound,
}

#[derive(Debug, Clone)]
struct LineSlot {
    key: EntryKey,
    line: SaleProductLine,
    state: LineState,
}

// =============================================================================
// Product Lines
// =============================================================================

/// Keyed, ordered list of sale product lines.
#[derive(Debug, Clone)]
pub struct ProductLines {
    slots: Vec<LineSlot>,
}

impl ProductLines {
    /// A fresh list holding one empty, unresolved line.
    pub fn new() -> Self {
        ProductLines {
            slots: vec![LineSlot {
                key: EntryKey::mint(),
                line: SaleProductLine::empty(),
                state: LineState::Unresolved,
            }],
        }
    }

    /// Rebuilds the list from persisted lines, minting fresh keys.
    /// Loaded lines keep their stored totals and start `Unresolved`; a
    /// new lookup is only made if the user edits the code.
    pub fn from_lines(lines: Vec<SaleProductLine>) -> Self {
        if lines.is_empty() {
            return Self::new();
        }
        ProductLines {
            slots: lines
                .into_iter()
                .map(|line| LineSlot {
                    key: EntryKey::mint(),
                    line,
                    state: LineState::Unresolved,
                })
                .collect(),
        }
    }

    /// Appends an empty line and returns its key.
    pub fn append(&mut self) -> EntryKey {
        let key = EntryKey::mint();
        self.slots.push(LineSlot {
            key,
            line: SaleProductLine::empty(),
            state: LineState::Unresolved,
        });
        key
    }

    /// Removes the line under `key`. The list never empties.
    pub fn remove(&mut self, key: EntryKey) -> FormResult<SaleProductLine> {
        if self.slots.len() == 1 {
            return Err(FormError::LastEntry);
        }
        let pos = self
            .slots
            .iter()
            .position(|s| s.key == key)
            .ok_or(FormError::UnknownEntry)?;
        Ok(self.slots.remove(pos).line)
    }

    /// Overwrites the line's code and re-arms it for resolution. Any
    /// in-flight lookup for the old code becomes stale.
    pub fn set_code(&mut self, key: EntryKey, code: &str) -> FormResult<()> {
        let slot = self.slot_mut(key)?;
        slot.line.code = code.to_string();
        slot.state = LineState::Unresolved;
        Ok(())
    }

    /// Updates the quantity. On a resolved line the total is recomputed
    /// from the backing unit price without another lookup.
    pub fn set_qty(&mut self, key: EntryKey, qty: i64) -> FormResult<()> {
        let slot = self.slot_mut(key)?;
        slot.line.qty = qty;
        if let LineState::Resolved(breakdown) = &slot.state {
            slot.line.total = breakdown.final_price.multiply_quantity(qty);
        }
        Ok(())
    }

    /// Marks the line `Resolving` and hands back the code to look up.
    pub fn begin_resolve(&mut self, key: EntryKey) -> FormResult<String> {
        let slot = self.slot_mut(key)?;
        slot.state = LineState::Resolving;
        Ok(slot.line.code.clone())
    }

    /// Lands a successful lookup. Dropped silently when the line is no
    /// longer `Resolving` under this key (removed or retyped since the
    /// request went out); returns whether the write landed.
    pub fn complete_resolve(&mut self, key: EntryKey, priced: PricedLine) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.key == key) else {
            debug!("dropping product resolution for removed line");
            return false;
        };
        if slot.state != LineState::Resolving {
            debug!(code = %priced.line.code, "dropping stale product resolution");
            return false;
        }
        slot.line = priced.line;
        slot.state = LineState::Resolved(priced.breakdown);
        true
    }

    /// Lands a failed lookup: writes the sentinel line. Same staleness
    /// rule as [`Self::complete_resolve`].
    pub fn mark_not_found(&mut self, key: EntryKey, code: &str) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.key == key) else {
            return false;
        };
        if slot.state != LineState::Resolving {
            return false;
        }
        slot.line = SaleProductLine::sentinel(code);
        slot.state = LineState::NotFound;
        true
    }

    /// Rolls a `Resolving` line back to `Unresolved` after a transport
    /// or pricing failure, leaving its contents untouched.
    pub fn abort_resolve(&mut self, key: EntryKey) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.key == key) {
            if slot.state == LineState::Resolving {
                slot.state = LineState::Unresolved;
            }
        }
    }

    /// The line under `key`, if still in the list.
    pub fn get(&self, key: EntryKey) -> Option<&SaleProductLine> {
        self.slots.iter().find(|s| s.key == key).map(|s| &s.line)
    }

    /// The resolution state under `key`, if still in the list.
    pub fn state(&self, key: EntryKey) -> Option<&LineState> {
        self.slots.iter().find(|s| s.key == key).map(|s| &s.state)
    }

    /// Lines in wire order, with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (EntryKey, &SaleProductLine)> {
        self.slots.iter().map(|s| (s.key, &s.line))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sum of line totals. Sentinel and empty lines contribute zero, so
    /// this is the sale's recomputed `total_amount`.
    pub fn total(&self) -> Money {
        self.slots.iter().map(|s| s.line.total).sum()
    }

    /// Lines in wire order, keys dropped, for document assembly.
    pub fn to_lines(&self) -> Vec<SaleProductLine> {
        self.slots.iter().map(|s| s.line.clone()).collect()
    }

    fn slot_mut(&mut self, key: EntryKey) -> FormResult<&mut LineSlot> {
        self.slots
            .iter_mut()
            .find(|s| s.key == key)
            .ok_or(FormError::UnknownEntry)
    }
}

impl Default for ProductLines {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use venta_core::money::Rate;
    use venta_core::pricing::price_product;
    use venta_core::types::Product;

    use super::*;

    fn widget() -> Product {
        Product {
            code: "A-100".to_string(),
            name: "Widget".to_string(),
            supplier_cost: Money::from_major(100),
            micro: Money::from_major(10),
            iva: Rate::from_fraction(0.12),
            salvament_margin: Rate::from_fraction(0.2),
            profit_margin: Rate::from_fraction(0.25),
        }
    }

    #[test]
    fn test_new_list_holds_one_empty_line() {
        let lines = ProductLines::new();
        assert_eq!(lines.len(), 1);
        let (key, line) = lines.iter().next().unwrap();
        assert_eq!(line, &SaleProductLine::empty());
        assert_eq!(lines.state(key), Some(&LineState::Unresolved));
    }

    #[test]
    fn test_resolve_happy_path() {
        let mut lines = ProductLines::new();
        let key = lines.iter().next().unwrap().0;
        lines.set_code(key, "A-100").unwrap();

        let code = lines.begin_resolve(key).unwrap();
        assert_eq!(code, "A-100");
        assert_eq!(lines.state(key), Some(&LineState::Resolving));

        let priced = price_product(&widget(), 1).unwrap();
        assert!(lines.complete_resolve(key, priced));

        let line = lines.get(key).unwrap();
        assert_eq!(line.name, "Widget");
        assert_eq!(line.total, Money::from_mils(183_333));
        assert!(matches!(lines.state(key), Some(LineState::Resolved(_))));
    }

    #[test]
    fn test_stale_resolution_dropped_after_retype() {
        let mut lines = ProductLines::new();
        let key = lines.iter().next().unwrap().0;
        lines.set_code(key, "A-100").unwrap();
        lines.begin_resolve(key).unwrap();

        // User retypes the code while the lookup is in flight.
        lines.set_code(key, "B-200").unwrap();

        let priced = price_product(&widget(), 1).unwrap();
        assert!(!lines.complete_resolve(key, priced));

        let line = lines.get(key).unwrap();
        assert_eq!(line.code, "B-200");
        assert_eq!(lines.state(key), Some(&LineState::Unresolved));
    }

    #[test]
    fn test_stale_resolution_dropped_after_removal() {
        let mut lines = ProductLines::new();
        let first = lines.iter().next().unwrap().0;
        let second = lines.append();
        lines.set_code(second, "A-100").unwrap();
        lines.begin_resolve(second).unwrap();
        lines.remove(second).unwrap();

        let priced = price_product(&widget(), 1).unwrap();
        assert!(!lines.complete_resolve(second, priced));
        // The surviving line was not touched.
        assert_eq!(lines.get(first).unwrap().code, "");
    }

    #[test]
    fn test_not_found_writes_sentinel() {
        let mut lines = ProductLines::new();
        let key = lines.iter().next().unwrap().0;
        lines.set_code(key, "XYZ-404").unwrap();
        lines.begin_resolve(key).unwrap();

        assert!(lines.mark_not_found(key, "XYZ-404"));
        let line = lines.get(key).unwrap();
        assert!(line.is_sentinel());
        assert_eq!(line.code, "XYZ-404");
        assert_eq!(lines.state(key), Some(&LineState::NotFound));
    }

    #[test]
    fn test_retype_after_not_found_rearms_line() {
        let mut lines = ProductLines::new();
        let key = lines.iter().next().unwrap().0;
        lines.set_code(key, "XYZ-404").unwrap();
        lines.begin_resolve(key).unwrap();
        lines.mark_not_found(key, "XYZ-404");

        lines.set_code(key, "A-100").unwrap();
        assert_eq!(lines.state(key), Some(&LineState::Unresolved));
    }

    #[test]
    fn test_abort_resolve_preserves_contents() {
        let mut lines = ProductLines::new();
        let key = lines.iter().next().unwrap().0;
        lines.set_code(key, "A-100").unwrap();
        lines.begin_resolve(key).unwrap();

        lines.abort_resolve(key);
        assert_eq!(lines.state(key), Some(&LineState::Unresolved));
        assert_eq!(lines.get(key).unwrap().code, "A-100");
    }

    #[test]
    fn test_qty_change_on_resolved_line_recomputes_total() {
        let mut lines = ProductLines::new();
        let key = lines.iter().next().unwrap().0;
        lines.set_code(key, "A-100").unwrap();
        lines.begin_resolve(key).unwrap();
        lines.complete_resolve(key, price_product(&widget(), 1).unwrap());

        lines.set_qty(key, 3).unwrap();
        assert_eq!(lines.get(key).unwrap().total, Money::from_mils(549_999));
    }

    #[test]
    fn test_total_sums_resolved_lines_and_skips_sentinels() {
        let mut lines = ProductLines::new();
        let first = lines.iter().next().unwrap().0;
        lines.set_code(first, "A-100").unwrap();
        lines.begin_resolve(first).unwrap();
        lines.complete_resolve(first, price_product(&widget(), 2).unwrap());

        let second = lines.append();
        lines.set_code(second, "XYZ-404").unwrap();
        lines.begin_resolve(second).unwrap();
        lines.mark_not_found(second, "XYZ-404");

        assert_eq!(lines.total(), Money::from_mils(366_666));
    }

    #[test]
    fn test_cannot_remove_last_line() {
        let mut lines = ProductLines::new();
        let key = lines.iter().next().unwrap().0;
        assert!(matches!(lines.remove(key), Err(FormError::LastEntry)));
    }

    #[test]
    fn test_loaded_lines_keep_totals() {
        let stored = vec![SaleProductLine {
            code: "A-100".to_string(),
            name: "Widget".to_string(),
            qty: 2,
            unit_price: Some(Money::from_mils(183_333)),
            discount: None,
            total: Money::from_mils(366_666),
        }];
        let lines = ProductLines::from_lines(stored);
        assert_eq!(lines.total(), Money::from_mils(366_666));
        let key = lines.iter().next().unwrap().0;
        assert_eq!(lines.state(key), Some(&LineState::Unresolved));
    }
}
