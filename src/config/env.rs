//! Environment variable handling and .env file management

use crate::{
    config::params::{ProbeParameters, KNOWN_PARAMS},
    error::{AppError, Result},
};
use std::path::Path;

/// Prefix of environment variables that map onto probe options
pub const ENV_PREFIX: &str = "AMQP_PROBE_";

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; a missing file is not an error
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                println!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            println!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Environment variable name for a probe option
    pub fn var_name(param: &str) -> String {
        format!("{}{}", ENV_PREFIX, param.to_uppercase())
    }

    /// Collect probe options from the process environment
    ///
    /// Only the `AMQP_PROBE_*` names for known options are read; a value that
    /// is not valid Unicode is skipped.
    pub fn params_from_env() -> ProbeParameters {
        Self::params_from_lookup(|name| std::env::var(name).ok())
    }

    /// Collect probe options through an arbitrary variable lookup
    pub fn params_from_lookup<F>(lookup: F) -> ProbeParameters
    where
        F: Fn(&str) -> Option<String>,
    {
        KNOWN_PARAMS
            .iter()
            .filter_map(|param| lookup(&Self::var_name(param)).map(|value| (*param, value)))
            .collect()
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# AMQP Publish Probe Configuration\n\
             #\n\
             # Each variable maps onto one probe option. Command-line --param\n\
             # values override anything set here.\n\n",
        );

        for (param, value) in ProbeParameters::default_parameters().iter() {
            content.push_str(&format!("# {}={}\n", Self::var_name(param), value));
        }

        content
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        use std::fs;

        let content = Self::create_example_env_content();
        fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_var_name() {
        assert_eq!(EnvManager::var_name("routing_key"), "AMQP_PROBE_ROUTING_KEY");
    }

    #[test]
    fn test_params_from_lookup() {
        let env = vars(&[
            ("AMQP_PROBE_URI", "amqp://broker:5672"),
            ("AMQP_PROBE_PERSISTENT", "yes"),
            ("AMQP_PROBE_UNKNOWN", "ignored"),
            ("PATH", "/usr/bin"),
        ]);
        let params = EnvManager::params_from_lookup(|name| env.get(name).cloned());

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("uri"), Some("amqp://broker:5672"));
        assert_eq!(params.get("persistent"), Some("yes"));
    }

    #[test]
    fn test_lookup_only_asks_for_known_names() {
        let asked = std::sync::Mutex::new(Vec::new());
        let params = EnvManager::params_from_lookup(|name| {
            asked.lock().unwrap().push(name.to_string());
            None
        });

        assert!(params.is_empty());
        let asked = asked.into_inner().unwrap();
        assert_eq!(asked.len(), KNOWN_PARAMS.len());
        assert!(asked.iter().all(|name| name.starts_with(ENV_PREFIX)));
    }

    #[test]
    fn test_example_env_content() {
        let content = EnvManager::create_example_env_content();
        assert!(content.contains("AMQP Publish Probe Configuration"));
        assert!(content.contains("# AMQP_PROBE_URI=amqp://localhost:5672"));
        assert!(content.contains("# AMQP_PROBE_ROUTING_KEY=test.key"));
        assert!(content.contains("# AMQP_PROBE_CONNECT_TIMEOUT_MS=5000"));
    }

    #[test]
    fn test_save_example_env_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("AMQP_PROBE_MESSAGE_SIZE_BYTES"));
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".env");
        assert!(EnvManager::load_env_file_from(&missing, false).is_ok());
    }
}
