//! Per-switch port statistics store.
//!
//! [`SwitchStats`] owns the port records of one datapath. The polling loop
//! feeds one cumulative sample per raw counter and tick through the
//! `set_*` methods; readers call [`SwitchStats::get_current_values`], which
//! first advances the derived (SDN) counters of every port by one tick.
//!
//! The store does no locking. All mutating calls for one switch must be
//! serialized by the caller; see [`crate::registry::SwitchRegistry`].
//!
//! # SDN estimate
//!
//! For a port `p` with partner `q`:
//!
//! ```text
//! instant_sdn_rx(p)         = rx_bytes(p)   - tx_bytes(q)
//! instant_sdn_tx(p)         = tx_bytes(p)   - rx_bytes(q)
//! instant_sdn_rx_packets(p) = rx_packets(p) - tx_packets(q)
//! instant_sdn_tx_packets(p) = tx_packets(p) - rx_packets(q)
//! ```
//!
//! Each refresh writes `instant + noise` (rx side, noisy ports only) or
//! `instant - noise` (tx side, all ports) into the derived ring. The instant
//! value of a port without partner is `-1`.

use crate::config_file::PortStatConfig;
use crate::counter::CounterKind;
use crate::delta_ring::WarmupGuard;
use crate::error::{PortStatError, Result};
use crate::noise::{NoiseClassifier, NoiseTracker};
use crate::port_record::PortRecord;
use crate::snapshot::{PortSnapshot, NO_PARTNER_SENTINEL};
use sonic_types::{DatapathId, PortNumber};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Port statistics for one switch datapath.
#[derive(Debug, Clone)]
pub struct SwitchStats {
    datapath: DatapathId,
    window: NonZeroUsize,
    guard: WarmupGuard,
    classifier: NoiseClassifier,
    noise: NoiseTracker,
    ports: BTreeMap<PortNumber, PortRecord>,
}

impl SwitchStats {
    /// Creates an empty store for `datapath`.
    pub fn new(datapath: DatapathId, config: &PortStatConfig) -> Result<Self> {
        config.validate()?;
        debug!(%datapath, "Initializing switch stats");
        Ok(Self {
            datapath,
            window: config.delta_window()?,
            guard: config.window.warmup_guard,
            classifier: config.classifier(),
            noise: NoiseTracker::new(
                config.noise.growth,
                config.noise.lldp_noise_byte_s,
                config.noise.lldp_noise_pack_s,
            ),
            ports: BTreeMap::new(),
        })
    }

    /// Returns the datapath this store tracks.
    pub fn get_switch_id(&self) -> DatapathId {
        self.datapath
    }

    /// Ticks elapsed since creation (number of derived refreshes).
    pub fn ticks_elapsed(&self) -> u64 {
        self.noise.ticks()
    }

    pub fn window(&self) -> usize {
        self.window.get()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn contains_port(&self, port: PortNumber) -> bool {
        self.ports.contains_key(&port)
    }

    /// Tracked port numbers in ascending order.
    pub fn port_numbers(&self) -> Vec<PortNumber> {
        self.ports.keys().copied().collect()
    }

    // ---- lifecycle -------------------------------------------------------

    /// Starts tracking a port with zeroed state.
    ///
    /// An existing record for the same number is replaced.
    pub fn add_port(&mut self, port: PortNumber) {
        let replaced = self
            .ports
            .insert(port, PortRecord::new(port, self.window, self.guard))
            .is_some();
        info!(datapath = %self.datapath, %port, replaced, "Port added");
    }

    /// Stops tracking a port.
    ///
    /// Partner links of other ports pointing here are left as they are.
    pub fn delete_port(&mut self, port: PortNumber) -> Result<()> {
        self.ports
            .remove(&port)
            .ok_or_else(|| PortStatError::port_not_found(port))?;
        info!(datapath = %self.datapath, %port, "Port deleted");
        Ok(())
    }

    pub fn get_port(&self, port: PortNumber) -> Result<&PortRecord> {
        self.ports
            .get(&port)
            .ok_or_else(|| PortStatError::port_not_found(port))
    }

    fn port_mut(&mut self, port: PortNumber) -> Result<&mut PortRecord> {
        self.ports
            .get_mut(&port)
            .ok_or_else(|| PortStatError::port_not_found(port))
    }

    // ---- identity --------------------------------------------------------

    pub fn set_port_name(&mut self, port: PortNumber, name: impl Into<String>) -> Result<()> {
        self.port_mut(port)?.set_name(name);
        Ok(())
    }

    /// Returns the port name, `None` if never set.
    pub fn get_port_name(&self, port: PortNumber) -> Result<Option<&str>> {
        Ok(self.get_port(port)?.name())
    }

    /// Sets the directed partner of `port`.
    ///
    /// The partner's own link is not touched; call again with the roles
    /// swapped for a symmetric pairing.
    pub fn set_partner(&mut self, port: PortNumber, partner: PortNumber) -> Result<()> {
        self.port_mut(port)?.set_partner(partner);
        info!(datapath = %self.datapath, %port, %partner, "Partner set");
        Ok(())
    }

    /// Removes the partner link of `port`, returning the previous partner.
    pub fn clear_partner(&mut self, port: PortNumber) -> Result<Option<PortNumber>> {
        let previous = self.port_mut(port)?.clear_partner();
        info!(datapath = %self.datapath, %port, ?previous, "Partner cleared");
        Ok(previous)
    }

    /// Returns the partner of `port`, `None` when unset.
    pub fn get_partner(&self, port: PortNumber) -> Result<Option<PortNumber>> {
        Ok(self.get_port(port)?.partner())
    }

    /// Returns the partner of `port`, failing when unset.
    pub fn require_partner(&self, port: PortNumber) -> Result<PortNumber> {
        self.get_partner(port)?
            .ok_or(PortStatError::PartnerNotConfigured { port })
    }

    // ---- raw counters ----------------------------------------------------

    /// Feeds one cumulative sample into a raw counter.
    ///
    /// Returns the delta added to the cumulative total, `None` while the
    /// evicted slot was still warming up.
    pub fn set_counter(
        &mut self,
        port: PortNumber,
        kind: CounterKind,
        sample: i64,
        noise: i64,
    ) -> Result<Option<i64>> {
        let datapath = self.datapath;
        let record = self.port_mut(port)?;
        let delta = record.record(kind, sample, noise);
        match delta {
            Some(delta) => debug!(
                %datapath, %port, counter = %kind, sample, noise, delta,
                total = record.total(kind),
                "Counter updated"
            ),
            None => debug!(
                %datapath, %port, counter = %kind, sample,
                "Counter buffer not yet warm, total unchanged"
            ),
        }
        Ok(delta)
    }

    /// Cumulative total of a raw counter.
    pub fn counter_total(&self, port: PortNumber, kind: CounterKind) -> Result<i64> {
        Ok(self.get_port(port)?.total(kind))
    }

    pub fn set_rx_bytes(&mut self, port: PortNumber, rx_bytes: i64, noise: i64) -> Result<()> {
        self.set_counter(port, CounterKind::RxBytes, rx_bytes, noise)
            .map(|_| ())
    }

    pub fn set_tx_bytes(&mut self, port: PortNumber, tx_bytes: i64, noise: i64) -> Result<()> {
        self.set_counter(port, CounterKind::TxBytes, tx_bytes, noise)
            .map(|_| ())
    }

    pub fn set_rx_packets(&mut self, port: PortNumber, rx_packets: i64, noise: i64) -> Result<()> {
        self.set_counter(port, CounterKind::RxPackets, rx_packets, noise)
            .map(|_| ())
    }

    pub fn set_tx_packets(&mut self, port: PortNumber, tx_packets: i64, noise: i64) -> Result<()> {
        self.set_counter(port, CounterKind::TxPackets, tx_packets, noise)
            .map(|_| ())
    }

    pub fn get_rx_bytes(&self, port: PortNumber) -> Result<i64> {
        self.counter_total(port, CounterKind::RxBytes)
    }

    pub fn get_tx_bytes(&self, port: PortNumber) -> Result<i64> {
        self.counter_total(port, CounterKind::TxBytes)
    }

    pub fn get_rx_packets(&self, port: PortNumber) -> Result<i64> {
        self.counter_total(port, CounterKind::RxPackets)
    }

    pub fn get_tx_packets(&self, port: PortNumber) -> Result<i64> {
        self.counter_total(port, CounterKind::TxPackets)
    }

    // ---- derived counters ------------------------------------------------

    /// Instant SDN estimate from the current totals of `port` and its partner.
    ///
    /// `Ok(None)` when no partner is configured; `PortNotFound` when either
    /// `port` or its partner is not tracked.
    pub fn instant_sdn(&self, port: PortNumber, kind: CounterKind) -> Result<Option<i64>> {
        let record = self.get_port(port)?;
        let Some(partner) = record.partner() else {
            return Ok(None);
        };
        let partner_total = self.counter_total(partner, kind.mirror())?;
        Ok(Some(record.total(kind).saturating_sub(partner_total)))
    }

    /// Latest derived value of `port`.
    ///
    /// `Ok(None)` when no partner is configured or no refresh has written a
    /// value since the port was added.
    pub fn sdn_value(&self, port: PortNumber, kind: CounterKind) -> Result<Option<i64>> {
        let record = self.get_port(port)?;
        if record.partner().is_none() {
            return Ok(None);
        }
        Ok(record.sdn_latest(kind))
    }

    /// Legacy derived read: [`NO_PARTNER_SENTINEL`] without a partner and
    /// 0 for a ring that has not been written yet.
    fn sdn_or_sentinel(&self, port: PortNumber, kind: CounterKind) -> Result<i64> {
        let record = self.get_port(port)?;
        if record.partner().is_none() {
            return Ok(NO_PARTNER_SENTINEL);
        }
        Ok(record.sdn_latest(kind).unwrap_or(0))
    }

    pub fn get_sdn_rx_bytes(&self, port: PortNumber) -> Result<i64> {
        self.sdn_or_sentinel(port, CounterKind::RxBytes)
    }

    pub fn get_sdn_tx_bytes(&self, port: PortNumber) -> Result<i64> {
        self.sdn_or_sentinel(port, CounterKind::TxBytes)
    }

    pub fn get_sdn_rx_packets(&self, port: PortNumber) -> Result<i64> {
        self.sdn_or_sentinel(port, CounterKind::RxPackets)
    }

    pub fn get_sdn_tx_packets(&self, port: PortNumber) -> Result<i64> {
        self.sdn_or_sentinel(port, CounterKind::TxPackets)
    }

    /// Advances the derived counters of every port by one tick.
    ///
    /// A port without partner gets [`NO_PARTNER_SENTINEL`] as its instant
    /// value, corrected like any other port.
    ///
    /// All instant estimates are computed before anything is written, so a
    /// dangling partner reference fails the whole refresh and leaves the
    /// store, including the tick counter, untouched.
    pub fn refresh_all(&mut self) -> Result<()> {
        let mut instants = Vec::with_capacity(self.ports.len());
        for &port in self.ports.keys() {
            let mut values = [None; 4];
            for kind in CounterKind::ALL {
                values[kind.index()] = self.instant_sdn(port, kind).inspect_err(|e| {
                    warn!(datapath = %self.datapath, %port, error = %e, "SDN refresh failed");
                })?;
            }
            instants.push((port, values));
        }

        self.noise.advance();
        debug!(
            datapath = %self.datapath,
            tick = self.noise.ticks(),
            ports = instants.len(),
            "Refreshing SDN stats"
        );

        for (port, values) in instants {
            let Some(record) = self.ports.get_mut(&port) else {
                continue;
            };
            let rx_noisy = self.classifier.is_rx_noisy(record.name(), port);
            for kind in CounterKind::ALL {
                let instant = values[kind.index()].unwrap_or(NO_PARTNER_SENTINEL);
                let correction = self.noise.correction(kind.unit());
                let value = if kind.is_rx() {
                    if rx_noisy {
                        instant.saturating_add(correction)
                    } else {
                        instant
                    }
                } else {
                    instant.saturating_sub(correction)
                };
                record.record_sdn(kind, value);
            }
        }
        Ok(())
    }

    /// Refreshes the derived counters, then returns all eight counters of `port`.
    pub fn get_current_values(&mut self, port: PortNumber) -> Result<PortSnapshot> {
        self.get_port(port)?;
        self.refresh_all()?;
        self.snapshot(port)
    }

    /// Returns all eight counters of `port` without refreshing.
    pub fn snapshot(&self, port: PortNumber) -> Result<PortSnapshot> {
        let record = self.get_port(port)?;
        let has_partner = record.partner().is_some();
        let sdn = |kind| has_partner.then(|| record.sdn_latest(kind)).flatten();
        Ok(PortSnapshot {
            port,
            rx_bytes: record.total(CounterKind::RxBytes),
            tx_bytes: record.total(CounterKind::TxBytes),
            rx_packets: record.total(CounterKind::RxPackets),
            tx_packets: record.total(CounterKind::TxPackets),
            sdn_rx_bytes: sdn(CounterKind::RxBytes),
            sdn_tx_bytes: sdn(CounterKind::TxBytes),
            sdn_rx_packets: sdn(CounterKind::RxPackets),
            sdn_tx_packets: sdn(CounterKind::TxPackets),
        })
    }
}
