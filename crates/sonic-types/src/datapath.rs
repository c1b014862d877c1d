//! Datapath (switch) identifier with safe parsing and formatting.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 64-bit switch datapath identifier.
///
/// The lower 48 bits usually carry the switch MAC address and the upper
/// 16 bits an implementation-defined discriminator.
///
/// # Examples
///
/// ```
/// use sonic_types::DatapathId;
///
/// let dpid: DatapathId = "00:00:00:00:00:00:00:0a".parse().unwrap();
/// assert_eq!(dpid.as_u64(), 10);
/// assert_eq!(dpid.to_string(), "00:00:00:00:00:00:00:0a");
///
/// // Bare hex and decimal forms are accepted as well
/// assert_eq!("0x0a".parse::<DatapathId>().unwrap(), dpid);
/// assert_eq!("10".parse::<DatapathId>().unwrap(), dpid);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatapathId(u64);

impl DatapathId {
    /// Creates a datapath identifier from its raw value.
    pub const fn new(raw: u64) -> Self {
        DatapathId(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the identifier as eight big-endian octets.
    pub const fn to_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for DatapathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.to_bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

impl FromStr for DatapathId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidDatapathId(s.to_string());
        let trimmed = s.trim();

        if trimmed.contains(':') {
            let parts: Vec<&str> = trimmed.split(':').collect();
            if parts.len() != 8 {
                return Err(invalid());
            }
            let mut bytes = [0u8; 8];
            for (i, part) in parts.iter().enumerate() {
                bytes[i] = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            }
            return Ok(DatapathId(u64::from_be_bytes(bytes)));
        }

        let raw = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        raw.map(DatapathId).map_err(|_| invalid())
    }
}

impl TryFrom<String> for DatapathId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DatapathId> for String {
    fn from(dpid: DatapathId) -> String {
        dpid.to_string()
    }
}

impl From<u64> for DatapathId {
    fn from(raw: u64) -> Self {
        DatapathId(raw)
    }
}
