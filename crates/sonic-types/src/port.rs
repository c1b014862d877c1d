//! Port identity types for switch ports.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of a port on a switch datapath.
///
/// Port numbers are unique within one datapath and are assigned by the
/// datapath itself; they carry no ordering semantics beyond being a key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PortNumber(u32);

impl PortNumber {
    /// Creates a port number from its raw value.
    pub const fn new(raw: u32) -> Self {
        PortNumber(raw)
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PortNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(PortNumber)
            .map_err(|_| ParseError::InvalidPortNumber(s.to_string()))
    }
}

impl From<u32> for PortNumber {
    fn from(raw: u32) -> Self {
        PortNumber(raw)
    }
}

impl From<PortNumber> for u32 {
    fn from(port: PortNumber) -> u32 {
        port.0
    }
}
