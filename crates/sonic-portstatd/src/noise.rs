//! LLDP background noise handling.
//!
//! LLDP frames add a small, roughly constant amount of traffic to every
//! port on every tick. The derived (SDN) counters compensate for it with a
//! correction that is added on the receive side of noisy ports and
//! subtracted on the transmit side of every port.

use crate::counter::CounterUnit;
use serde::{Deserialize, Serialize};
use sonic_types::PortNumber;

/// Name prefix of uplink/trunk ports, which never carry rx noise.
pub const UPLINK_PORT_PREFIX: &str = "cro";

/// Port exempt from rx noise when its name does not decide.
pub const DEFAULT_EXEMPT_PORT: PortNumber = PortNumber::new(1);

/// Returns true if the rx-side noise correction applies to a port.
///
/// Rules, first match wins:
/// 1. name starts with [`UPLINK_PORT_PREFIX`] => not noisy
/// 2. port number is not [`DEFAULT_EXEMPT_PORT`] => noisy
/// 3. otherwise not noisy
pub fn is_rx_noisy(port_name: &str, port_number: PortNumber) -> bool {
    rx_noisy(
        UPLINK_PORT_PREFIX,
        DEFAULT_EXEMPT_PORT,
        Some(port_name),
        port_number,
    )
}

fn rx_noisy(
    exempt_prefix: &str,
    exempt_port: PortNumber,
    port_name: Option<&str>,
    port_number: PortNumber,
) -> bool {
    if port_name.is_some_and(|name| name.starts_with(exempt_prefix)) {
        return false;
    }
    port_number != exempt_port
}

/// Configurable form of [`is_rx_noisy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseClassifier {
    exempt_prefix: String,
    exempt_port: PortNumber,
}

impl NoiseClassifier {
    pub fn new(exempt_prefix: impl Into<String>, exempt_port: PortNumber) -> Self {
        Self {
            exempt_prefix: exempt_prefix.into(),
            exempt_port,
        }
    }

    /// Classifies a port. A port without a name never matches the prefix.
    pub fn is_rx_noisy(&self, port_name: Option<&str>, port_number: PortNumber) -> bool {
        rx_noisy(&self.exempt_prefix, self.exempt_port, port_name, port_number)
    }
}

impl Default for NoiseClassifier {
    fn default() -> Self {
        Self::new(UPLINK_PORT_PREFIX, DEFAULT_EXEMPT_PORT)
    }
}

/// How the noise correction evolves with elapsed ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseGrowth {
    /// Correction is `ticks * per_tick`, growing without bound.
    #[default]
    Cumulative,
    /// Correction is `per_tick` regardless of elapsed ticks.
    PerTick,
}

/// Switch-scoped tick counter and running noise correction.
///
/// The cumulative correction is accumulated once per tick instead of being
/// recomputed as `ticks * constant`; with integer constants both are equal.
#[derive(Debug, Clone)]
pub struct NoiseTracker {
    growth: NoiseGrowth,
    bytes_per_tick: i64,
    packets_per_tick: i64,
    ticks: u64,
    bytes: i64,
    packets: i64,
}

impl NoiseTracker {
    pub fn new(growth: NoiseGrowth, bytes_per_tick: i64, packets_per_tick: i64) -> Self {
        Self {
            growth,
            bytes_per_tick,
            packets_per_tick,
            ticks: 0,
            bytes: 0,
            packets: 0,
        }
    }

    /// Advances by one tick and updates the corrections.
    pub fn advance(&mut self) {
        self.ticks += 1;
        match self.growth {
            NoiseGrowth::Cumulative => {
                self.bytes = self.bytes.saturating_add(self.bytes_per_tick);
                self.packets = self.packets.saturating_add(self.packets_per_tick);
            }
            NoiseGrowth::PerTick => {
                self.bytes = self.bytes_per_tick;
                self.packets = self.packets_per_tick;
            }
        }
    }

    /// Ticks elapsed since the switch store was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current correction for a counter unit.
    pub fn correction(&self, unit: CounterUnit) -> i64 {
        match unit {
            CounterUnit::Bytes => self.bytes,
            CounterUnit::Packets => self.packets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uplink_prefix_exempts() {
        assert!(!is_rx_noisy("cro-uplink", PortNumber::new(7)));
        assert!(!is_rx_noisy("cro", PortNumber::new(1)));
    }

    #[test]
    fn test_other_ports_are_noisy() {
        assert!(is_rx_noisy("eth7", PortNumber::new(7)));
        assert!(is_rx_noisy("", PortNumber::new(2)));
    }

    #[test]
    fn test_port_one_exempt() {
        assert!(!is_rx_noisy("eth1", PortNumber::new(1)));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(is_rx_noisy("CRO1", PortNumber::new(4)));
        assert!(is_rx_noisy("cr", PortNumber::new(4)));
    }

    #[test]
    fn test_classifier_without_name() {
        let classifier = NoiseClassifier::default();
        assert!(classifier.is_rx_noisy(None, PortNumber::new(3)));
        assert!(!classifier.is_rx_noisy(None, PortNumber::new(1)));
    }

    #[test]
    fn test_custom_classifier() {
        let classifier = NoiseClassifier::new("up", PortNumber::new(9));
        assert!(!classifier.is_rx_noisy(Some("uplink0"), PortNumber::new(3)));
        assert!(classifier.is_rx_noisy(Some("cro0"), PortNumber::new(3)));
        assert!(!classifier.is_rx_noisy(Some("eth9"), PortNumber::new(9)));
    }

    #[test]
    fn test_cumulative_matches_ticks_times_constant() {
        let mut tracker = NoiseTracker::new(NoiseGrowth::Cumulative, 19, 2);
        for t in 1..=50u64 {
            tracker.advance();
            assert_eq!(tracker.ticks(), t);
            assert_eq!(tracker.correction(CounterUnit::Bytes), t as i64 * 19);
            assert_eq!(tracker.correction(CounterUnit::Packets), t as i64 * 2);
        }
    }

    #[test]
    fn test_per_tick_stays_constant() {
        let mut tracker = NoiseTracker::new(NoiseGrowth::PerTick, 19, 2);
        assert_eq!(tracker.correction(CounterUnit::Bytes), 0);
        for _ in 0..10 {
            tracker.advance();
            assert_eq!(tracker.correction(CounterUnit::Bytes), 19);
            assert_eq!(tracker.correction(CounterUnit::Packets), 2);
        }
        assert_eq!(tracker.ticks(), 10);
    }
}
