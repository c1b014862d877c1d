//! Offline replay of recorded counter samples.
//!
//! A trace describes one switch, its port table and a sequence of polling
//! ticks. Each tick feeds one cumulative sample per raw counter of every
//! listed port, then reads `get_current_values` for every tracked port the
//! same way a polling loop would.
//!
//! ```json
//! {
//!   "datapath": "00:00:00:00:00:00:00:01",
//!   "ports": [
//!     { "number": 1, "name": "cro1", "partner": 2 },
//!     { "number": 2, "name": "eth2", "partner": 1 }
//!   ],
//!   "ticks": [
//!     [ { "port": 1, "rx_bytes": 100, "tx_bytes": 80, "rx_packets": 2, "tx_packets": 1 } ]
//!   ]
//! }
//! ```

use crate::config_file::PortStatConfig;
use crate::counter::CounterKind;
use crate::error::{PortStatError, Result};
use crate::snapshot::PortSnapshot;
use crate::switch_stats::SwitchStats;
use serde::{Deserialize, Serialize};
use sonic_types::{DatapathId, PortNumber};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Port table entry of a trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortEntry {
    pub number: PortNumber,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub partner: Option<PortNumber>,
}

/// Cumulative device counters of one port at one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterSample {
    pub port: PortNumber,
    pub rx_bytes: i64,
    pub tx_bytes: i64,
    pub rx_packets: i64,
    pub tx_packets: i64,
    /// LLDP bytes to subtract from the rx_bytes delta of this tick
    #[serde(default)]
    pub lldp_noise: i64,
}

impl CounterSample {
    fn value(&self, kind: CounterKind) -> i64 {
        match kind {
            CounterKind::RxBytes => self.rx_bytes,
            CounterKind::TxBytes => self.tx_bytes,
            CounterKind::RxPackets => self.rx_packets,
            CounterKind::TxPackets => self.tx_packets,
        }
    }

    fn noise(&self, kind: CounterKind) -> i64 {
        match kind {
            CounterKind::RxBytes => self.lldp_noise,
            _ => 0,
        }
    }
}

/// Recorded polling session of one switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayTrace {
    pub datapath: DatapathId,
    pub ports: Vec<PortEntry>,
    #[serde(default)]
    pub ticks: Vec<Vec<CounterSample>>,
}

impl ReplayTrace {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PortStatError::Replay(format!("Failed to open trace {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Builds a store with the trace's port table.
    pub fn build_switch(&self, config: &PortStatConfig) -> Result<SwitchStats> {
        let mut stats = SwitchStats::new(self.datapath, config)?;
        for entry in &self.ports {
            stats.add_port(entry.number);
            if let Some(name) = &entry.name {
                stats.set_port_name(entry.number, name.clone())?;
            }
        }
        for entry in &self.ports {
            if let Some(partner) = entry.partner {
                stats.set_partner(entry.number, partner)?;
            }
        }
        Ok(stats)
    }
}

/// One output line of a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayRecord {
    pub tick: usize,
    pub datapath: DatapathId,
    #[serde(flatten)]
    pub snapshot: PortSnapshot,
}

/// Replays `trace`, handing every snapshot to `sink` as it is produced.
///
/// Returns the final store state.
pub fn replay(
    trace: &ReplayTrace,
    config: &PortStatConfig,
    mut sink: impl FnMut(ReplayRecord) -> Result<()>,
) -> Result<SwitchStats> {
    let mut stats = trace.build_switch(config)?;
    info!(
        datapath = %trace.datapath,
        ports = trace.ports.len(),
        ticks = trace.ticks.len(),
        "Starting replay"
    );

    for (tick, samples) in trace.ticks.iter().enumerate() {
        for sample in samples {
            for kind in CounterKind::ALL {
                stats.set_counter(sample.port, kind, sample.value(kind), sample.noise(kind))?;
            }
        }
        for port in stats.port_numbers() {
            let snapshot = stats.get_current_values(port)?;
            sink(ReplayRecord {
                tick,
                datapath: trace.datapath,
                snapshot,
            })?;
        }
    }

    info!(
        datapath = %trace.datapath,
        ticks_elapsed = stats.ticks_elapsed(),
        "Replay complete"
    );
    Ok(stats)
}
