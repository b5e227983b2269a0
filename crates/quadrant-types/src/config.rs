// ─────────────────────────────────────────────────────────────────────
// SCPN Quadrant Residual — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SUBDOMAIN_LENGTH;
use crate::error::{QuadrantError, QuadrantResult};

/// Geometry parameters of the residual evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualConfig {
    /// Physical side length of one quadrant (default: 0.5, unit global square).
    #[serde(default = "default_subdomain_length")]
    pub subdomain_length: f64,
}

fn default_subdomain_length() -> f64 {
    DEFAULT_SUBDOMAIN_LENGTH
}

impl Default for ResidualConfig {
    fn default() -> Self {
        ResidualConfig {
            subdomain_length: default_subdomain_length(),
        }
    }
}

impl ResidualConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> QuadrantResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> QuadrantResult<()> {
        if !self.subdomain_length.is_finite() || self.subdomain_length <= 0.0 {
            return Err(QuadrantError::Config(format!(
                "subdomain_length must be finite > 0, got {}",
                self.subdomain_length
            )));
        }
        Ok(())
    }

    /// Mesh spacing h = L / (n - 1) for a local grid of n points per side.
    pub fn mesh_spacing(&self, n: usize) -> QuadrantResult<f64> {
        self.validate()?;
        if n < 2 {
            return Err(QuadrantError::Config(format!(
                "mesh spacing needs n >= 2, got {n}"
            )));
        }
        Ok(self.subdomain_length / (n as f64 - 1.0))
    }
}

/// Settings of the in-process communicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommConfig {
    /// Upper bound on a single blocking receive. `None` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_timeout_ms: Option<u64>,
}

impl CommConfig {
    /// Timeouts are stored in whole milliseconds, rounded up so that a
    /// non-zero timeout never becomes an immediate failure.
    pub fn with_timeout(timeout: Duration) -> Self {
        let ms = timeout.as_micros().div_ceil(1000);
        CommConfig {
            recv_timeout_ms: Some(u64::try_from(ms).unwrap_or(u64::MAX)),
        }
    }

    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_mesh_spacing_matches_unit_square() {
        let cfg = ResidualConfig::default();
        let h = cfg.mesh_spacing(5).unwrap();
        assert!((h - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_mesh_spacing_rejects_degenerate_grid() {
        let cfg = ResidualConfig::default();
        assert!(cfg.mesh_spacing(1).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_length() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = ResidualConfig {
                subdomain_length: bad,
            };
            match cfg.validate() {
                Err(QuadrantError::Config(msg)) => assert!(msg.contains("subdomain_length")),
                other => panic!("Unexpected result for {bad}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let cfg: ResidualConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ResidualConfig::default());
        let comm: CommConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(comm.recv_timeout(), None);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "quadrant_residual_config_{}.json",
            std::process::id()
        ));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            write!(file, "{{\"subdomain_length\": 2.0}}").unwrap();
        }
        let cfg = ResidualConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!((cfg.subdomain_length - 2.0).abs() < 1e-15);
        assert!((cfg.mesh_spacing(3).unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ResidualConfig::from_file("/nonexistent/quadrant.json").unwrap_err();
        assert!(matches!(err, QuadrantError::Io(_)));
    }

    #[test]
    fn test_comm_timeout_roundtrip() {
        let cfg = CommConfig::with_timeout(Duration::from_millis(250));
        assert_eq!(cfg.recv_timeout(), Some(Duration::from_millis(250)));
        let json = serde_json::to_string(&cfg).unwrap();
        let back: CommConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn test_sub_millisecond_timeout_rounds_up() {
        let requested = Duration::from_micros(500);
        let cfg = CommConfig::with_timeout(requested);
        assert_eq!(cfg.recv_timeout_ms, Some(1));
        assert!(cfg.recv_timeout().unwrap() >= requested);

        let cfg = CommConfig::with_timeout(Duration::from_micros(2_001));
        assert_eq!(cfg.recv_timeout(), Some(Duration::from_millis(3)));

        // Zero stays zero.
        let cfg = CommConfig::with_timeout(Duration::ZERO);
        assert_eq!(cfg.recv_timeout(), Some(Duration::ZERO));
    }
}
