//! CLI configuration
//!
//! Loads the JSON configuration file and keeps the result in a process-wide
//! singleton.

use crate::error::{CliError, CliResult};
use fsio_config::Config;
use once_cell::sync::OnceCell;
use std::path::Path;

static GLOBAL_CONFIG: OnceCell<Config> = OnceCell::new();

/// Read a configuration file. `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_json(&text).map_err(|source| CliError::ParseConfig {
        path: path.to_path_buf(),
        source,
    })
}

/// Install the global configuration.
///
/// # Errors
/// Hands the config back if one is already installed
pub fn init_config(config: Config) -> Result<(), Config> {
    GLOBAL_CONFIG.set(config)
}

/// The global configuration, or the defaults if none was installed
pub fn config() -> &'static Config {
    GLOBAL_CONFIG.get_or_init(Config::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsio_config::{ByteOrderSetting, LogLevel};
    use std::path::PathBuf;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fsio_cli_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_load_config_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.io.chunk_size, 64 * 1024);
    }

    #[test]
    fn test_load_config_from_file() {
        let path = temp_file("config.json");
        std::fs::write(
            &path,
            r#"{"buffer": {"byte_order": "little"}, "io": {"chunk_size": 16}, "log": {"facade": "debug"}}"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.buffer.byte_order, ByteOrderSetting::Little);
        assert_eq!(config.io.chunk_size, 16);
        assert_eq!(config.log.facade, Some(LogLevel::Debug));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_config_errors() {
        let missing = temp_file("missing.json");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(CliError::ReadConfig { .. })
        ));

        let broken = temp_file("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        let err = load_config(Some(&broken)).unwrap_err();
        assert!(matches!(err, CliError::ParseConfig { .. }));
        assert!(err.to_string().contains("broken.json"));
        let _ = std::fs::remove_file(&broken);
    }

    #[test]
    fn test_global_config() {
        let _ = init_config(Config::default());
        assert!(init_config(Config::default()).is_err());
        assert_eq!(config().io.chunk_size, 64 * 1024);
    }
}
