//! Windowed port counter-delta engine for SONiC switch telemetry.
//!
//! Turns cumulative per-port counters sampled once per polling tick into
//! rates over a fixed window of ticks, and derives an overlay (SDN) traffic
//! estimate per port by subtracting the traffic of a partner port.
//!
//! # Components
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`delta_ring`] | Fixed-size ring computing windowed deltas with a warm-up guard |
//! | [`port_record`] | Per-port identity, raw and derived channels |
//! | [`switch_stats`] | Per-switch store, SDN calculator, snapshots |
//! | [`noise`] | LLDP noise classifier and per-tick correction |
//! | [`registry`] | Per-switch exclusive sections for concurrent callers |
//! | [`replay`] | Offline replay of recorded counter traces |
//!
//! # Example
//!
//! ```
//! use sonic_portstatd::{PortStatConfig, SwitchStats};
//! use sonic_types::{DatapathId, PortNumber};
//!
//! let config = PortStatConfig::default().with_delta_window(3);
//! let mut stats = SwitchStats::new(DatapathId::new(1), &config)?;
//! let port = PortNumber::new(4);
//! stats.add_port(port);
//!
//! for sample in [10, 20, 30, 45] {
//!     stats.set_rx_bytes(port, sample, 0)?;
//! }
//! assert_eq!(stats.get_rx_bytes(port)?, 35);
//!
//! let snapshot = stats.get_current_values(port)?;
//! assert_eq!(snapshot.sdn_rx_bytes, None);
//! # Ok::<(), sonic_portstatd::PortStatError>(())
//! ```

pub mod config_file;
pub mod counter;
pub mod delta_ring;
pub mod error;
pub mod noise;
pub mod port_record;
pub mod registry;
pub mod replay;
pub mod snapshot;
pub mod switch_stats;

pub use config_file::{NoiseConfig, PortStatConfig, WindowConfig, DEFAULT_CONFIG_PATH};
pub use counter::{CounterKind, CounterUnit};
pub use delta_ring::{DeltaRing, WarmupGuard};
pub use error::{PortStatError, Result};
pub use noise::{
    is_rx_noisy, NoiseClassifier, NoiseGrowth, NoiseTracker, DEFAULT_EXEMPT_PORT,
    UPLINK_PORT_PREFIX,
};
pub use port_record::{CounterChannel, DerivedChannel, PortRecord};
pub use registry::{SharedSwitchStats, SwitchRegistry};
pub use replay::{replay, CounterSample, PortEntry, ReplayRecord, ReplayTrace};
pub use snapshot::{PortSnapshot, NO_PARTNER_SENTINEL};
pub use switch_stats::SwitchStats;
