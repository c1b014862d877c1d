//! Common SONiC identity types for switch port telemetry.
//!
//! - [`DatapathId`]: 64-bit switch datapath identifier
//! - [`PortNumber`]: port number, unique within one datapath

mod datapath;
mod port;

pub use datapath::DatapathId;
pub use port::PortNumber;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid datapath id format: {0}")]
    InvalidDatapathId(String),

    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),
}
