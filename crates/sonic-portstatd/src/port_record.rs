//! Per-port counter state.
//!
//! A [`PortRecord`] holds the identity of one port (name and directed
//! partner link) together with its counter channels:
//!
//! | Channel | Ring | Exposed value |
//! |---------|------|---------------|
//! | raw (rx/tx bytes/packets) | cumulative samples | running total of windowed deltas |
//! | derived (sdn_*) | instant SDN estimates | most recently written cell |

use crate::counter::CounterKind;
use crate::delta_ring::{DeltaRing, WarmupGuard};
use sonic_types::PortNumber;
use std::num::NonZeroUsize;

/// Raw counter channel: ring plus cumulative total.
#[derive(Debug, Clone)]
pub struct CounterChannel {
    total: i64,
    ring: DeltaRing,
}

impl CounterChannel {
    fn new(window: NonZeroUsize, guard: WarmupGuard) -> Self {
        Self {
            total: 0,
            ring: DeltaRing::new(window, guard),
        }
    }

    /// Pushes a cumulative sample and folds the windowed delta into the total.
    fn record(&mut self, sample: i64, noise: i64) -> Option<i64> {
        let delta = self.ring.push(sample, noise);
        if let Some(delta) = delta {
            self.total = self.total.saturating_add(delta);
        }
        delta
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn ring(&self) -> &DeltaRing {
        &self.ring
    }
}

/// Derived counter channel: ring only, no total.
#[derive(Debug, Clone)]
pub struct DerivedChannel {
    ring: DeltaRing,
}

impl DerivedChannel {
    fn new(window: NonZeroUsize, guard: WarmupGuard) -> Self {
        Self {
            ring: DeltaRing::new(window, guard),
        }
    }

    fn record(&mut self, value: i64) {
        self.ring.write(value);
    }

    /// Most recently written value, `None` before the first write.
    pub fn latest(&self) -> Option<i64> {
        self.ring.latest()
    }

    pub fn ring(&self) -> &DeltaRing {
        &self.ring
    }
}

/// State of one tracked port.
#[derive(Debug, Clone)]
pub struct PortRecord {
    number: PortNumber,
    name: Option<String>,
    partner: Option<PortNumber>,
    raw: [CounterChannel; 4],
    sdn: [DerivedChannel; 4],
}

impl PortRecord {
    /// Creates a zeroed record: totals at 0, empty rings, cursors at 0.
    pub fn new(number: PortNumber, window: NonZeroUsize, guard: WarmupGuard) -> Self {
        Self {
            number,
            name: None,
            partner: None,
            raw: std::array::from_fn(|_| CounterChannel::new(window, guard)),
            sdn: std::array::from_fn(|_| DerivedChannel::new(window, guard)),
        }
    }

    pub fn number(&self) -> PortNumber {
        self.number
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Directed partner link, never inferred from the partner's own link.
    pub fn partner(&self) -> Option<PortNumber> {
        self.partner
    }

    pub fn set_partner(&mut self, partner: PortNumber) {
        self.partner = Some(partner);
    }

    /// Removes the partner link, returning the previous partner.
    pub fn clear_partner(&mut self) -> Option<PortNumber> {
        self.partner.take()
    }

    /// Cumulative total of a raw counter.
    pub fn total(&self, kind: CounterKind) -> i64 {
        self.raw[kind.index()].total()
    }

    pub fn channel(&self, kind: CounterKind) -> &CounterChannel {
        &self.raw[kind.index()]
    }

    pub fn sdn_channel(&self, kind: CounterKind) -> &DerivedChannel {
        &self.sdn[kind.index()]
    }

    /// Latest derived value of a counter.
    pub fn sdn_latest(&self, kind: CounterKind) -> Option<i64> {
        self.sdn[kind.index()].latest()
    }

    pub(crate) fn record(&mut self, kind: CounterKind, sample: i64, noise: i64) -> Option<i64> {
        self.raw[kind.index()].record(sample, noise)
    }

    pub(crate) fn record_sdn(&mut self, kind: CounterKind, value: i64) {
        self.sdn[kind.index()].record(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(window: usize) -> PortRecord {
        PortRecord::new(
            PortNumber::new(1),
            NonZeroUsize::new(window).unwrap(),
            WarmupGuard::ZeroSentinel,
        )
    }

    #[test]
    fn test_new_record_is_zeroed() {
        let port = record(3);
        assert_eq!(port.name(), None);
        assert_eq!(port.partner(), None);
        for kind in CounterKind::ALL {
            assert_eq!(port.total(kind), 0);
            assert_eq!(port.channel(kind).ring().cursor(), 0);
            assert_eq!(port.channel(kind).ring().window(), 3);
            assert_eq!(port.sdn_latest(kind), None);
            assert_eq!(port.sdn_channel(kind).ring().cursor(), 0);
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let mut port = record(1);
        port.record(CounterKind::RxBytes, 100, 0);
        port.record(CounterKind::RxBytes, 150, 0);
        assert_eq!(port.total(CounterKind::RxBytes), 50);
        assert_eq!(port.total(CounterKind::TxBytes), 0);
        assert_eq!(port.channel(CounterKind::TxBytes).ring().cursor(), 0);
    }

    #[test]
    fn test_total_accumulates_deltas() {
        let mut port = record(2);
        for sample in [10, 20, 30, 40, 55] {
            port.record(CounterKind::TxPackets, sample, 0);
        }
        // (30 - 10) + (40 - 20) + (55 - 30)
        assert_eq!(port.total(CounterKind::TxPackets), 65);
    }

    #[test]
    fn test_partner_link() {
        let mut port = record(3);
        port.set_partner(PortNumber::new(2));
        assert_eq!(port.partner(), Some(PortNumber::new(2)));
        assert_eq!(port.clear_partner(), Some(PortNumber::new(2)));
        assert_eq!(port.partner(), None);
    }

    #[test]
    fn test_sdn_channel_exposes_last_write() {
        let mut port = record(3);
        port.record_sdn(CounterKind::RxBytes, 7);
        port.record_sdn(CounterKind::RxBytes, -4);
        assert_eq!(port.sdn_latest(CounterKind::RxBytes), Some(-4));
        assert_eq!(port.sdn_latest(CounterKind::TxBytes), None);
    }
}
