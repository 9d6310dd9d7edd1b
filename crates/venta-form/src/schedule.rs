//! # Payment Schedule
//!
//! The keyed list of payment method entries for one sale session.
//!
//! ## Why Keys Instead of Indices
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  index-addressed:                 key-addressed:                    │
//! │                                                                     │
//! │  edit(1, …)   ──┐                 edit(k2, …) ──┐                   │
//! │  remove(0)      │ reorder races   remove(k1)    │ keys are stable   │
//! │  edit(1, …)   ──┘ hit the wrong   edit(k2, …) ──┘ across removals   │
//! │                   row                                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entry gets a [`EntryKey`] when it joins the list and keeps it
//! until removed. Callers hold keys, never positions; wire order is
//! preserved separately by the underlying `Vec`.
//!
//! The schedule never empties: a new schedule starts with the default
//! entry, and removing the last remaining entry is refused.

use uuid::Uuid;

use venta_core::money::Money;
use venta_core::types::PaymentMethodEntry;

use crate::error::{FormError, FormResult};

// =============================================================================
// Entry Key
// =============================================================================

/// Stable identity of one entry in a keyed form list.
///
/// Keys are minted when the entry joins the list and are never reused
/// within a session, so a key held across a removal either still finds
/// its entry or finds nothing; it can never find a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey(Uuid);

impl EntryKey {
    pub(crate) fn mint() -> Self {
        EntryKey(Uuid::new_v4())
    }
}

// =============================================================================
// Payment Schedule
// =============================================================================

/// Keyed, ordered list of payment method entries.
#[derive(Debug, Clone)]
pub struct PaymentSchedule {
    entries: Vec<(EntryKey, PaymentMethodEntry)>,
}

impl PaymentSchedule {
    /// A fresh schedule holding the default entry.
    pub fn new() -> Self {
        PaymentSchedule {
            entries: vec![(EntryKey::mint(), PaymentMethodEntry::default())],
        }
    }

    /// Rebuilds a schedule from persisted entries, minting fresh keys.
    /// An empty input is seeded with the default entry so the invariant
    /// holds from the start.
    pub fn from_entries(entries: Vec<PaymentMethodEntry>) -> Self {
        if entries.is_empty() {
            return Self::new();
        }
        PaymentSchedule {
            entries: entries
                .into_iter()
                .map(|e| (EntryKey::mint(), e))
                .collect(),
        }
    }

    /// Appends the default entry and returns its key.
    pub fn append(&mut self) -> EntryKey {
        let key = EntryKey::mint();
        self.entries.push((key, PaymentMethodEntry::default()));
        key
    }

    /// Removes the entry under `key`.
    ///
    /// Refused with [`FormError::LastEntry`] when only one entry
    /// remains, and with [`FormError::UnknownEntry`] for a stale key.
    pub fn remove(&mut self, key: EntryKey) -> FormResult<PaymentMethodEntry> {
        if self.entries.len() == 1 {
            return Err(FormError::LastEntry);
        }
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| *k == key)
            .ok_or(FormError::UnknownEntry)?;
        Ok(self.entries.remove(pos).1)
    }

    /// Edits the entry under `key` in place.
    pub fn edit(
        &mut self,
        key: EntryKey,
        f: impl FnOnce(&mut PaymentMethodEntry),
    ) -> FormResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, e)| e)
            .ok_or(FormError::UnknownEntry)?;
        f(entry);
        Ok(())
    }

    /// The entry under `key`, if it is still in the list.
    pub fn get(&self, key: EntryKey) -> Option<&PaymentMethodEntry> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, e)| e)
    }

    /// Entries in wire order, with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (EntryKey, &PaymentMethodEntry)> {
        self.entries.iter().map(|(k, e)| (*k, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry amounts.
    pub fn total(&self) -> Money {
        self.entries.iter().map(|(_, e)| e.amount).sum()
    }

    /// Entries in wire order, keys dropped, for document assembly.
    pub fn to_entries(&self) -> Vec<PaymentMethodEntry> {
        self.entries.iter().map(|(_, e)| e.clone()).collect()
    }
}

impl Default for PaymentSchedule {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use venta_core::types::{PaymentMethod, TimeUnit};

    use super::*;

    #[test]
    fn test_new_schedule_holds_default_entry() {
        let schedule = PaymentSchedule::new();
        assert_eq!(schedule.len(), 1);
        let (_, entry) = schedule.iter().next().unwrap();
        assert_eq!(entry, &PaymentMethodEntry::default());
    }

    #[test]
    fn test_append_returns_usable_key() {
        let mut schedule = PaymentSchedule::new();
        let key = schedule.append();
        assert_eq!(schedule.len(), 2);
        assert!(schedule.get(key).is_some());
    }

    #[test]
    fn test_cannot_remove_last_entry() {
        let mut schedule = PaymentSchedule::new();
        let (key, _) = schedule.iter().next().unwrap();
        assert!(matches!(schedule.remove(key), Err(FormError::LastEntry)));
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_remove_unknown_key() {
        let mut schedule = PaymentSchedule::new();
        schedule.append();
        let stale = EntryKey::mint();
        assert!(matches!(
            schedule.remove(stale),
            Err(FormError::UnknownEntry)
        ));
    }

    #[test]
    fn test_keys_survive_removal_of_earlier_entry() {
        let mut schedule = PaymentSchedule::new();
        let first = schedule.iter().next().unwrap().0;
        let second = schedule.append();

        schedule
            .edit(second, |e| e.method = PaymentMethod::DineroElectronico)
            .unwrap();
        schedule.remove(first).unwrap();

        // The surviving key still addresses the same entry.
        assert_eq!(
            schedule.get(second).unwrap().method,
            PaymentMethod::DineroElectronico
        );
    }

    #[test]
    fn test_edit_after_remove_is_refused_not_misdirected() {
        let mut schedule = PaymentSchedule::new();
        let second = schedule.append();
        schedule.remove(second).unwrap();

        let result = schedule.edit(second, |e| e.time_value = 99);
        assert!(matches!(result, Err(FormError::UnknownEntry)));
        // The remaining entry was not touched.
        assert_eq!(schedule.iter().next().unwrap().1.time_value, 0);
    }

    #[test]
    fn test_removal_preserves_relative_order() {
        let mut schedule = PaymentSchedule::new();
        let keys: Vec<EntryKey> = (0..3).map(|_| schedule.append()).collect();
        for (i, key) in keys.iter().enumerate() {
            schedule
                .edit(*key, |e| e.time_value = (i + 1) as i64)
                .unwrap();
        }

        schedule.remove(keys[1]).unwrap();

        assert_eq!(schedule.len(), 3);
        let time_values: Vec<i64> =
            schedule.iter().map(|(_, e)| e.time_value).collect();
        assert_eq!(time_values, vec![0, 1, 3]);
    }

    #[test]
    fn test_total_sums_amounts() {
        let mut schedule = PaymentSchedule::new();
        let key = schedule.append();
        schedule
            .edit(key, |e| e.amount = Money::from_major(1500))
            .unwrap();
        // default 5000 + 1500
        assert_eq!(schedule.total(), Money::from_major(6500));
    }

    #[test]
    fn test_from_entries_preserves_order() {
        let entries = vec![
            PaymentMethodEntry {
                method: PaymentMethod::TarjetaCredito,
                amount: Money::from_major(100),
                time_unit: TimeUnit::Meses,
                time_value: 6,
            },
            PaymentMethodEntry::default(),
        ];
        let schedule = PaymentSchedule::from_entries(entries.clone());
        assert_eq!(schedule.to_entries(), entries);
    }

    #[test]
    fn test_from_empty_entries_seeds_default() {
        let schedule = PaymentSchedule::from_entries(Vec::new());
        assert_eq!(schedule.len(), 1);
    }
}
