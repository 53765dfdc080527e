//! Application configuration.
//!
//! Settings come from three layers, later ones winning: built-in
//! defaults, an optional `atrium.toml` next to the binary, and
//! `ATRIUM_*` environment variables. Secrets (DATABASE_URL, SECRET_KEY,
//! SALT) stay plain environment variables and never live in the file.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Socket address the HTTP server binds.
    pub listen_addr: String,
    /// Set in production; left off so local HTTP logins work.
    pub cookie_secure: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            cookie_secure: false,
        }
    }
}

pub fn load() -> Result<AppConfig, config::ConfigError> {
    load_from("atrium")
}

/// `basename` is the config file path without extension, as the
/// `config` crate expects it.
pub fn load_from(basename: &str) -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(basename).required(false))
        .add_source(config::Environment::with_prefix("ATRIUM"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn defaults_apply_without_file_or_env() {
        std::env::remove_var("ATRIUM_LISTEN_ADDR");
        let config = load_from("definitely_missing_config").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    #[serial]
    fn file_values_override_defaults() {
        std::env::remove_var("ATRIUM_LISTEN_ADDR");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atrium.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "listen_addr = \"127.0.0.1:9090\"").unwrap();
        writeln!(file, "cookie_secure = true").unwrap();

        let basename = dir.path().join("atrium");
        let config = load_from(basename.to_str().unwrap()).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9090");
        assert!(config.cookie_secure);
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atrium.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "listen_addr = \"127.0.0.1:9090\"").unwrap();

        std::env::set_var("ATRIUM_LISTEN_ADDR", "127.0.0.1:7070");
        let basename = dir.path().join("atrium");
        let config = load_from(basename.to_str().unwrap()).unwrap();
        std::env::remove_var("ATRIUM_LISTEN_ADDR");

        assert_eq!(config.listen_addr, "127.0.0.1:7070");
    }
}
