//! Point-in-time view of one port's eight counters.

use crate::counter::CounterKind;
use serde::Serialize;
use sonic_types::PortNumber;

/// Value reported for a derived counter when no partner is configured.
pub const NO_PARTNER_SENTINEL: i64 = -1;

/// Snapshot returned by `get_current_values`.
///
/// Derived fields are `None` when the port has no partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortSnapshot {
    pub port: PortNumber,
    pub rx_bytes: i64,
    pub tx_bytes: i64,
    pub rx_packets: i64,
    pub tx_packets: i64,
    pub sdn_rx_bytes: Option<i64>,
    pub sdn_tx_bytes: Option<i64>,
    pub sdn_rx_packets: Option<i64>,
    pub sdn_tx_packets: Option<i64>,
}

impl PortSnapshot {
    /// Raw counter total by kind.
    pub fn raw(&self, kind: CounterKind) -> i64 {
        match kind {
            CounterKind::RxBytes => self.rx_bytes,
            CounterKind::TxBytes => self.tx_bytes,
            CounterKind::RxPackets => self.rx_packets,
            CounterKind::TxPackets => self.tx_packets,
        }
    }

    /// Derived counter by kind.
    pub fn sdn(&self, kind: CounterKind) -> Option<i64> {
        match kind {
            CounterKind::RxBytes => self.sdn_rx_bytes,
            CounterKind::TxBytes => self.sdn_tx_bytes,
            CounterKind::RxPackets => self.sdn_rx_packets,
            CounterKind::TxPackets => self.sdn_tx_packets,
        }
    }

    /// Flat field/value mapping with [`NO_PARTNER_SENTINEL`] for missing
    /// derived values, in field order.
    pub fn field_values(&self) -> Vec<(&'static str, i64)> {
        let raw = CounterKind::ALL.iter().map(|&k| (k.name(), self.raw(k)));
        let sdn = CounterKind::ALL
            .iter()
            .map(|&k| (k.sdn_name(), self.sdn(k).unwrap_or(NO_PARTNER_SENTINEL)));
        raw.chain(sdn).collect()
    }
}
