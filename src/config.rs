//! Environment-driven configuration, loaded once at process start.
//!
//! Mirrors the host crate's environment-driven `redb` file paths: there is no additional
//! config-file format here, just the handful of paths a build needs. Missing required variables
//! surface as [`crate::Error::MissingConfig`] before any store connection is attempted, per §7's
//! "Config errors are thrown at validation time before any side effect."

use std::path::PathBuf;

/// `SSE_PLAINTEXT_DB_PATH` — path to the plaintext source database.
pub const PLAINTEXT_DB_PATH: &str = "SSE_PLAINTEXT_DB_PATH";

/// `SSE_ENCRYPTED_DB_PATH` — path to the encrypted target database this crate writes.
pub const ENCRYPTED_DB_PATH: &str = "SSE_ENCRYPTED_DB_PATH";

/// `SSE_MASTER_SECRET_PATH` — path to a file holding the master secret.
pub const MASTER_SECRET_PATH: &str = "SSE_MASTER_SECRET_PATH";

/// `SSE_SCRATCH_DIR` — optional scratch directory; defaults to the platform temp directory.
pub const SCRATCH_DIR: &str = "SSE_SCRATCH_DIR";

/// The resolved configuration for one build invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub plaintext_db_path: PathBuf,
    pub encrypted_db_path: PathBuf,
    pub master_secret_path: PathBuf,
    pub scratch_dir: PathBuf,
}

impl Config {
    /// Loads configuration from the environment, falling back to CLI-supplied overrides for each
    /// field (the CLI's flags take precedence over the corresponding environment variable).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingConfig`] if a required variable is absent and no override
    /// was supplied.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, crate::Error> {
        Ok(Self {
            plaintext_db_path: resolve(overrides.plaintext_db_path, PLAINTEXT_DB_PATH)?,
            encrypted_db_path: resolve(overrides.encrypted_db_path, ENCRYPTED_DB_PATH)?,
            master_secret_path: resolve(overrides.master_secret_path, MASTER_SECRET_PATH)?,
            scratch_dir: resolve(overrides.scratch_dir, SCRATCH_DIR)
                .unwrap_or_else(|_| std::env::temp_dir()),
        })
    }
}

/// CLI-supplied overrides, one per [`Config`] field; `None` defers to the environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub plaintext_db_path: Option<PathBuf>,
    pub encrypted_db_path: Option<PathBuf>,
    pub master_secret_path: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
}

fn resolve(overridden: Option<PathBuf>, variable: &'static str) -> Result<PathBuf, crate::Error> {
    if let Some(path) = overridden {
        return Ok(path);
    }
    std::env::var(variable)
        .map(PathBuf::from)
        .map_err(|_| crate::Error::MissingConfig { variable })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_override_takes_precedence_over_missing_env() {
        let overrides = ConfigOverrides {
            plaintext_db_path: Some("/tmp/plain.redb".into()),
            encrypted_db_path: Some("/tmp/enc.redb".into()),
            master_secret_path: Some("/tmp/secret".into()),
            scratch_dir: None,
        };

        let config = Config::load(overrides).expect("all required fields overridden");
        assert_eq!(config.plaintext_db_path, PathBuf::from("/tmp/plain.redb"));
        assert!(config.scratch_dir.as_os_str().len() > 0);
    }

    #[test]
    fn missing_required_field_is_a_config_error() {
        let overrides = ConfigOverrides::default();
        // SAFETY-equivalent: this just asserts absence of the override/env pair in a clean
        // environment; CI does not set these variables.
        if std::env::var(PLAINTEXT_DB_PATH).is_err() {
            assert!(matches!(
                Config::load(overrides),
                Err(crate::Error::MissingConfig { variable: PLAINTEXT_DB_PATH })
            ));
        }
    }
}
