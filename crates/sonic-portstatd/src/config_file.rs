//! Configuration file support for portstatd
//!
//! Loads and validates portstatd configuration from TOML files.
//! Default location: /etc/sonic/portstatd.conf

use crate::delta_ring::WarmupGuard;
use crate::error::{PortStatError, Result};
use crate::noise::{NoiseClassifier, NoiseGrowth, DEFAULT_EXEMPT_PORT, UPLINK_PORT_PREFIX};
use serde::{Deserialize, Serialize};
use sonic_types::PortNumber;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/portstatd.conf";

/// Delta window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Ring capacity for every counter channel (DELTA_WINDOW)
    #[serde(default = "default_delta_window")]
    pub delta_window: usize,

    /// How an evicted cell is judged warm
    #[serde(default)]
    pub warmup_guard: WarmupGuard,
}

/// LLDP noise compensation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// LLDP bytes per tick (LLDP_NOISE_BYTE_S)
    #[serde(default)]
    pub lldp_noise_byte_s: i64,

    /// LLDP packets per tick (LLDP_NOISE_PACK_S)
    #[serde(default)]
    pub lldp_noise_pack_s: i64,

    /// How the correction grows with elapsed ticks
    #[serde(default)]
    pub growth: NoiseGrowth,

    /// Port name prefix exempt from rx noise
    #[serde(default = "default_exempt_prefix")]
    pub exempt_prefix: String,

    /// Port number exempt from rx noise
    #[serde(default = "default_exempt_port")]
    pub exempt_port: PortNumber,
}

/// Complete portstatd configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortStatConfig {
    /// Delta window configuration
    #[serde(default)]
    pub window: WindowConfig,

    /// Noise compensation configuration
    #[serde(default)]
    pub noise: NoiseConfig,
}

fn default_delta_window() -> usize {
    10
}

fn default_exempt_prefix() -> String {
    UPLINK_PORT_PREFIX.to_string()
}

fn default_exempt_port() -> PortNumber {
    DEFAULT_EXEMPT_PORT
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            delta_window: default_delta_window(),
            warmup_guard: WarmupGuard::default(),
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            lldp_noise_byte_s: 0,
            lldp_noise_pack_s: 0,
            growth: NoiseGrowth::default(),
            exempt_prefix: default_exempt_prefix(),
            exempt_port: default_exempt_port(),
        }
    }
}

impl PortStatConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let config: Self = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                PortStatError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "Config file not found, using defaults"
                );
                Self::default()
            }
            Err(e) => return Err(PortStatError::Io(e)),
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            PortStatError::Configuration(format!("Failed to serialize config: {}", e))
        })
    }

    /// Returns a copy with a different delta window
    pub fn with_delta_window(mut self, delta_window: usize) -> Self {
        self.window.delta_window = delta_window;
        self
    }

    /// Returns a copy with different per-tick noise constants
    pub fn with_noise(mut self, byte_s: i64, pack_s: i64) -> Self {
        self.noise.lldp_noise_byte_s = byte_s;
        self.noise.lldp_noise_pack_s = pack_s;
        self
    }

    /// Get the delta window as a ring capacity
    pub fn delta_window(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.window.delta_window).ok_or_else(|| {
            PortStatError::Configuration("delta_window must be >= 1".to_string())
        })
    }

    /// Build the rx noise classifier
    pub fn classifier(&self) -> NoiseClassifier {
        NoiseClassifier::new(self.noise.exempt_prefix.clone(), self.noise.exempt_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.delta_window()?;

        if self.noise.exempt_prefix.is_empty() {
            return Err(PortStatError::Configuration(
                "exempt_prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortStatConfig::default();
        assert_eq!(config.window.delta_window, 10);
        assert_eq!(config.window.warmup_guard, WarmupGuard::ZeroSentinel);
        assert_eq!(config.noise.growth, NoiseGrowth::Cumulative);
        assert_eq!(config.noise.exempt_prefix, "cro");
        assert_eq!(config.noise.exempt_port, PortNumber::new(1));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(PortStatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_window() {
        let config = PortStatConfig::default().with_delta_window(0);
        assert!(config.validate().is_err());
        assert!(config.delta_window().is_err());
    }

    #[test]
    fn test_validate_accepts_signed_noise() {
        let config = PortStatConfig::default().with_noise(-1, 0);
        assert!(config.validate().is_ok());
        let config = PortStatConfig::default().with_noise(0, -3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_prefix() {
        let mut config = PortStatConfig::default();
        config.noise.exempt_prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[window]
delta_window = 3
warmup_guard = "written_flag"

[noise]
lldp_noise_byte_s = 19
growth = "per_tick"
"#;
        let config: PortStatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.window.delta_window, 3);
        assert_eq!(config.window.warmup_guard, WarmupGuard::WrittenFlag);
        assert_eq!(config.noise.lldp_noise_byte_s, 19);
        assert_eq!(config.noise.growth, NoiseGrowth::PerTick);
        // Unspecified values should use defaults
        assert_eq!(config.noise.lldp_noise_pack_s, 0);
        assert_eq!(config.noise.exempt_prefix, "cro");
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = PortStatConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("delta_window = 10"));
        assert!(toml_str.contains("zero_sentinel"));
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = PortStatConfig::load_or_default("/nonexistent/portstatd.conf").unwrap();
        assert_eq!(config.window.delta_window, 10);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portstatd.conf");
        let config = PortStatConfig::default()
            .with_delta_window(4)
            .with_noise(7, 1);
        config.save(&path).unwrap();

        let loaded = PortStatConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.window.delta_window, 4);
        assert_eq!(loaded.noise.lldp_noise_byte_s, 7);
        assert_eq!(loaded.noise.lldp_noise_pack_s, 1);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portstatd.conf");
        fs::write(&path, "[window]\ndelta_window = 0\n").unwrap();
        assert!(PortStatConfig::load_or_default(&path).is_err());

        fs::write(&path, "not = [valid").unwrap();
        assert!(PortStatConfig::load_or_default(&path).is_err());
    }
}
