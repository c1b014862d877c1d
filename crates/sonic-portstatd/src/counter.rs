//! Counter channel selectors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit a counter is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterUnit {
    Bytes,
    Packets,
}

/// One of the four raw port counters.
///
/// Every raw counter has a derived (SDN) counterpart of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    RxBytes,
    TxBytes,
    RxPackets,
    TxPackets,
}

impl CounterKind {
    /// All counters in field order.
    pub const ALL: [CounterKind; 4] = [
        CounterKind::RxBytes,
        CounterKind::TxBytes,
        CounterKind::RxPackets,
        CounterKind::TxPackets,
    ];

    /// Returns the channel slot for per-port channel arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::RxBytes => 0,
            Self::TxBytes => 1,
            Self::RxPackets => 2,
            Self::TxPackets => 3,
        }
    }

    /// Returns the field name of the raw counter.
    pub const fn name(self) -> &'static str {
        match self {
            Self::RxBytes => "rx_bytes",
            Self::TxBytes => "tx_bytes",
            Self::RxPackets => "rx_packets",
            Self::TxPackets => "tx_packets",
        }
    }

    /// Returns the field name of the derived counter.
    pub const fn sdn_name(self) -> &'static str {
        match self {
            Self::RxBytes => "sdn_rx_bytes",
            Self::TxBytes => "sdn_tx_bytes",
            Self::RxPackets => "sdn_rx_packets",
            Self::TxPackets => "sdn_tx_packets",
        }
    }

    /// Returns true for receive-side counters.
    pub const fn is_rx(self) -> bool {
        matches!(self, Self::RxBytes | Self::RxPackets)
    }

    /// Returns the unit of this counter.
    pub const fn unit(self) -> CounterUnit {
        match self {
            Self::RxBytes | Self::TxBytes => CounterUnit::Bytes,
            Self::RxPackets | Self::TxPackets => CounterUnit::Packets,
        }
    }

    /// Returns the opposite direction with the same unit.
    ///
    /// Traffic received on a port was transmitted by its partner and
    /// vice versa, so partner subtraction pairs a counter with its mirror.
    pub const fn mirror(self) -> CounterKind {
        match self {
            Self::RxBytes => Self::TxBytes,
            Self::TxBytes => Self::RxBytes,
            Self::RxPackets => Self::TxPackets,
            Self::TxPackets => Self::RxPackets,
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CounterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rx_bytes" => Ok(Self::RxBytes),
            "tx_bytes" => Ok(Self::TxBytes),
            "rx_packets" => Ok(Self::RxPackets),
            "tx_packets" => Ok(Self::TxPackets),
            _ => Err(format!("Unknown counter: {}", s)),
        }
    }
}
