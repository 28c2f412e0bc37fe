use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Deployment configuration, loaded from `zerovault.toml`.
///
/// Every field has a sensible default so the crate works out-of-the-box
/// without any config file at all.  The token-signing secret is *not*
/// part of this file; it is supplied programmatically to the
/// credential issuer so it never lands in a checked-in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Session token lifetime in seconds (default: 1 day).
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_token_ttl_secs() -> u64 {
    86_400 // 1 day
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the deployment directory.
    const FILE_NAME: &'static str = "zerovault.toml";

    /// Load settings from `<dir>/zerovault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> crate::crypto::kdf::Argon2Params {
        crate::crypto::kdf::Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert_eq!(s.token_ttl_secs, 86_400);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
token_ttl_secs = 3600
"#;
        fs::write(tmp.path().join("zerovault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
        assert_eq!(settings.token_ttl_secs, 3_600);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("zerovault.toml"), "token_ttl_secs = 60\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.token_ttl_secs, 60);
        // Rest should be defaults
        assert_eq!(settings.argon2_memory_kib, 65_536);
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("zerovault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn argon2_params_mirror_settings() {
        let s = Settings {
            argon2_memory_kib: 16_384,
            argon2_iterations: 2,
            argon2_parallelism: 1,
            ..Settings::default()
        };
        let p = s.argon2_params();
        assert_eq!(p.memory_kib, 16_384);
        assert_eq!(p.iterations, 2);
        assert_eq!(p.parallelism, 1);
    }
}
