//! Registry of per-switch stores for concurrent callers.
//!
//! Each switch owns an isolated [`SwitchStats`] behind its own mutex, so
//! one polling cycle holds the lock of exactly one switch and different
//! switches proceed independently.

use crate::config_file::PortStatConfig;
use crate::error::{PortStatError, Result};
use crate::switch_stats::SwitchStats;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use sonic_types::DatapathId;
use std::sync::Arc;
use tracing::info;

/// Shared handle to one switch store.
pub type SharedSwitchStats = Arc<Mutex<SwitchStats>>;

/// Switch stores keyed by datapath.
#[derive(Debug)]
pub struct SwitchRegistry {
    config: PortStatConfig,
    switches: DashMap<DatapathId, SharedSwitchStats>,
}

impl SwitchRegistry {
    /// Creates an empty registry; every store is built from `config`.
    pub fn new(config: PortStatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            switches: DashMap::new(),
        })
    }

    /// Returns the store for `datapath`, creating it on first registration.
    pub fn register(&self, datapath: DatapathId) -> Result<SharedSwitchStats> {
        match self.switches.entry(datapath) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let stats = Arc::new(Mutex::new(SwitchStats::new(datapath, &self.config)?));
                entry.insert(stats.clone());
                info!(%datapath, "Switch registered");
                Ok(stats)
            }
        }
    }

    pub fn get(&self, datapath: DatapathId) -> Option<SharedSwitchStats> {
        self.switches.get(&datapath).map(|entry| entry.value().clone())
    }

    /// Drops the store for `datapath`, returning it if it was registered.
    pub fn unregister(&self, datapath: DatapathId) -> Option<SharedSwitchStats> {
        let removed = self.switches.remove(&datapath).map(|(_, stats)| stats);
        if removed.is_some() {
            info!(%datapath, "Switch unregistered");
        }
        removed
    }

    /// Runs `f` inside the exclusive section of one switch.
    pub fn with_switch<R>(
        &self,
        datapath: DatapathId,
        f: impl FnOnce(&mut SwitchStats) -> Result<R>,
    ) -> Result<R> {
        let stats = self
            .get(datapath)
            .ok_or(PortStatError::SwitchNotFound { datapath })?;
        let mut guard = stats.lock();
        f(&mut *guard)
    }

    /// Registered datapaths in ascending order.
    pub fn datapaths(&self) -> Vec<DatapathId> {
        let mut ids: Vec<_> = self.switches.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_types::PortNumber;

    fn registry() -> SwitchRegistry {
        SwitchRegistry::new(PortStatConfig::default().with_delta_window(2)).unwrap()
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = registry();
        let a = registry.register(DatapathId::new(1)).unwrap();
        let b = registry.register(DatapathId::new(1)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_switches_are_isolated() {
        let registry = registry();
        registry.register(DatapathId::new(1)).unwrap();
        registry.register(DatapathId::new(2)).unwrap();

        registry
            .with_switch(DatapathId::new(1), |s| {
                s.add_port(PortNumber::new(3));
                Ok(())
            })
            .unwrap();

        let other = registry
            .with_switch(DatapathId::new(2), |s| Ok(s.contains_port(PortNumber::new(3))))
            .unwrap();
        assert!(!other);
        assert_eq!(
            registry.datapaths(),
            vec![DatapathId::new(1), DatapathId::new(2)]
        );
    }

    #[test]
    fn test_unknown_switch() {
        let registry = registry();
        let err = registry.with_switch(DatapathId::new(9), |_| Ok(())).unwrap_err();
        assert!(err.is_not_found());
        assert!(registry.unregister(DatapathId::new(9)).is_none());
    }

    #[test]
    fn test_unregister() {
        let registry = registry();
        registry.register(DatapathId::new(4)).unwrap();
        assert!(registry.unregister(DatapathId::new(4)).is_some());
        assert!(registry.get(DatapathId::new(4)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(SwitchRegistry::new(PortStatConfig::default().with_delta_window(0)).is_err());
    }
}
