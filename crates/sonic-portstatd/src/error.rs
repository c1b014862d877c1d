//! Error types for portstatd

use sonic_types::{DatapathId, PortNumber};
use thiserror::Error;

/// Port statistics errors
#[derive(Error, Debug)]
pub enum PortStatError {
    /// Port number is not tracked by the switch store
    #[error("Port {port} not found")]
    PortNotFound {
        /// The port number that was addressed.
        port: PortNumber,
    },

    /// Operation requires a partner port but none is configured
    #[error("Partner port not configured for port {port}")]
    PartnerNotConfigured {
        /// The port without a partner.
        port: PortNumber,
    },

    /// Switch is not registered
    #[error("Switch {datapath} not registered")]
    SwitchNotFound {
        /// The datapath that was addressed.
        datapath: DatapathId,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Replay trace error
    #[error("Replay error: {0}")]
    Replay(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PortStatError {
    /// Creates a port not found error.
    pub fn port_not_found(port: PortNumber) -> Self {
        Self::PortNotFound { port }
    }

    /// Returns true if this error reports an untracked port.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PortStatError::PortNotFound { .. } | PortStatError::SwitchNotFound { .. }
        )
    }
}

/// Result type for portstatd operations
pub type Result<T> = std::result::Result<T, PortStatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortStatError::port_not_found(PortNumber::new(5));
        assert_eq!(err.to_string(), "Port 5 not found");
    }

    #[test]
    fn test_partner_not_configured() {
        let err = PortStatError::PartnerNotConfigured {
            port: PortNumber::new(3),
        };
        assert_eq!(err.to_string(), "Partner port not configured for port 3");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found() {
        assert!(PortStatError::port_not_found(PortNumber::new(1)).is_not_found());
        assert!(PortStatError::SwitchNotFound {
            datapath: DatapathId::new(1)
        }
        .is_not_found());
        assert!(!PortStatError::Configuration("bad".to_string()).is_not_found());
    }
}
