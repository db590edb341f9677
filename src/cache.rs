//! Shared concurrent address-value cache.
//!
//! Per the spec's re-architecture note (§9): "an ordinary concurrent map
//! protected by fine-grained or read-optimised synchronisation". Each entry
//! is an independently-swapped record with no cross-entry invariants, so a
//! plain `RwLock<HashMap<_>>` is sufficient — readers never block writers
//! for long, and two racing writers to the same entry settle on
//! last-writer-wins, which is fine because updates carry monotonically
//! advancing timestamps and the cache is purely observational.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::addressing::GroupAddress;
use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// One address-value cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// DPT string this group address carries (e.g. `"9.001"`).
    pub dpt: String,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Last decoded value, or `None` if no sample has been seen yet.
    pub value: Option<DptValue>,
    /// Unix timestamp (seconds) of `value`'s last update, if any.
    pub last_update: Option<u64>,
}

impl CacheEntry {
    fn new(dpt: String, name: Option<String>) -> Self {
        Self { dpt, name, value: None, last_update: None }
    }
}

/// A hydration-state record as produced by [`Cache::to_hydration_state`].
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationRecord {
    /// Group address, as `"M/I/S"`.
    pub ga: String,
    /// The decoded value at `unix_seconds`.
    pub value: DptValue,
    /// Unix timestamp (seconds) the value was last observed at.
    pub unix_seconds: u64,
}

/// Shared concurrent map `GroupAddress -> CacheEntry`.
///
/// Cheap to clone: internally an `Arc<RwLock<_>>`, so every clone observes
/// the same underlying map.
#[derive(Clone, Default)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<GroupAddress, CacheEntry>>>,
}

impl Cache {
    /// Build an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one entry per group address in `group_addresses`.
    pub fn from_group_addresses(group_addresses: &HashMap<GroupAddress, String>) -> Self {
        let cache = Self::new();
        for (ga, dpt) in group_addresses {
            cache.configure(*ga, dpt.clone(), None);
        }
        cache
    }

    /// Insert or replace the DPT/name metadata for `ga`, leaving any
    /// existing value and timestamp untouched.
    ///
    /// # Errors
    ///
    /// Returns [`KnxError::Cache`] if `ga` is already configured with a
    /// different DPT (configuring twice with the same DPT is a no-op).
    pub fn add_group_address(&self, ga: GroupAddress, dpt: impl Into<String>) -> Result<()> {
        let dpt = dpt.into();
        let mut entries = self.entries.write().expect("cache lock poisoned");
        if let Some(existing) = entries.get(&ga) {
            if existing.dpt != dpt {
                return Err(KnxError::already_configured());
            }
            return Ok(());
        }
        entries.insert(ga, CacheEntry::new(dpt, None));
        Ok(())
    }

    /// Remove `ga` from the cache entirely.
    pub fn remove_group_address(&self, ga: GroupAddress) {
        self.entries.write().expect("cache lock poisoned").remove(&ga);
    }

    fn configure(&self, ga: GroupAddress, dpt: String, name: Option<String>) {
        self.entries.write().expect("cache lock poisoned").insert(ga, CacheEntry::new(dpt, name));
    }

    /// Snapshot of the currently known group-address -> DPT map.
    pub fn known_group_addresses(&self) -> HashMap<GroupAddress, String> {
        self.entries
            .read()
            .expect("cache lock poisoned")
            .iter()
            .map(|(ga, entry)| (*ga, entry.dpt.clone()))
            .collect()
    }

    /// The current entry for `ga`, if configured.
    pub fn get(&self, ga: GroupAddress) -> Option<CacheEntry> {
        self.entries.read().expect("cache lock poisoned").get(&ga).cloned()
    }

    /// Record a received value for `ga` (`group_write`/`group_response`).
    /// A no-op if `ga` is not configured.
    pub fn record_receive(&self, ga: GroupAddress, value: DptValue, unix_seconds: u64) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        if let Some(entry) = entries.get_mut(&ga) {
            entry.value = Some(value);
            entry.last_update = Some(unix_seconds);
        }
    }

    /// Write-through update after a successful send: identical to
    /// [`Cache::record_receive`], kept as a distinct name for call-site
    /// clarity (spec: "on success of the underlying send, update
    /// value+timestamp; on failure leave the cache untouched").
    pub fn record_write_through(&self, ga: GroupAddress, value: DptValue, unix_seconds: u64) {
        self.record_receive(ga, value, unix_seconds);
    }

    /// Hydrate from an externally-supplied snapshot (mode (b) in §4.8):
    /// inserts values without generating bus traffic.
    pub fn hydrate_from_state(&self, state: &[HydrationRecord]) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        for record in state {
            let Ok(ga) = record.ga.parse::<GroupAddress>() else { continue };
            if let Some(entry) = entries.get_mut(&ga) {
                entry.value = Some(record.value.clone());
                entry.last_update = Some(record.unix_seconds);
            }
        }
    }

    /// Snapshot of every entry that currently has a value, suitable for
    /// persistence via [`Cache::hydrate_from_state`] on next startup.
    pub fn to_hydration_state(&self) -> Vec<HydrationRecord> {
        self.entries
            .read()
            .expect("cache lock poisoned")
            .iter()
            .filter_map(|(ga, entry)| {
                let value = entry.value.clone()?;
                let unix_seconds = entry.last_update?;
                Some(HydrationRecord { ga: ga.to_string(), value, unix_seconds })
            })
            .collect()
    }
}

/// Current unix time in seconds, for stamping cache updates.
pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ga(m: u8, i: u8, s: u8) -> GroupAddress {
        GroupAddress::new(m, i, s).unwrap()
    }

    #[test]
    fn unconfigured_entry_is_absent() {
        let cache = Cache::new();
        assert!(cache.get(ga(1, 2, 3)).is_none());
    }

    #[test]
    fn configured_entry_starts_with_no_value() {
        let cache = Cache::new();
        cache.add_group_address(ga(1, 2, 3), "9.001").unwrap();
        let entry = cache.get(ga(1, 2, 3)).unwrap();
        assert_eq!(entry.dpt, "9.001");
        assert!(entry.value.is_none());
    }

    #[test]
    fn receive_updates_value_and_timestamp() {
        let cache = Cache::new();
        cache.add_group_address(ga(1, 2, 3), "1.001").unwrap();
        cache.record_receive(ga(1, 2, 3), DptValue::Bool(true), 1000);
        let entry = cache.get(ga(1, 2, 3)).unwrap();
        assert_eq!(entry.value, Some(DptValue::Bool(true)));
        assert_eq!(entry.last_update, Some(1000));
    }

    #[test]
    fn receive_on_unknown_ga_is_a_no_op() {
        let cache = Cache::new();
        cache.record_receive(ga(1, 2, 3), DptValue::Bool(true), 1000);
        assert!(cache.get(ga(1, 2, 3)).is_none());
    }

    #[test]
    fn reconfiguring_with_a_different_dpt_errors() {
        let cache = Cache::new();
        cache.add_group_address(ga(1, 2, 3), "1.001").unwrap();
        assert!(cache.add_group_address(ga(1, 2, 3), "9.001").is_err());
    }

    #[test]
    fn to_hydration_state_only_includes_entries_with_values() {
        let cache = Cache::new();
        cache.add_group_address(ga(1, 2, 3), "1.001").unwrap();
        cache.add_group_address(ga(4, 5, 6), "1.001").unwrap();
        cache.record_receive(ga(1, 2, 3), DptValue::Bool(true), 1000);

        let state = cache.to_hydration_state();
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].ga, "1/2/3");
    }

    #[test]
    fn hydrate_from_state_round_trips() {
        let cache = Cache::new();
        cache.add_group_address(ga(1, 2, 3), "1.001").unwrap();
        cache.record_receive(ga(1, 2, 3), DptValue::Bool(true), 1000);
        let state = cache.to_hydration_state();

        let cache2 = Cache::new();
        cache2.add_group_address(ga(1, 2, 3), "1.001").unwrap();
        cache2.hydrate_from_state(&state);

        assert_eq!(cache2.get(ga(1, 2, 3)).unwrap().value, Some(DptValue::Bool(true)));
    }

    #[test]
    fn remove_drops_the_entry() {
        let cache = Cache::new();
        cache.add_group_address(ga(1, 2, 3), "1.001").unwrap();
        cache.remove_group_address(ga(1, 2, 3));
        assert!(cache.get(ga(1, 2, 3)).is_none());
    }
}
