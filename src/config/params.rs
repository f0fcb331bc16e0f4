//! Raw option mapping and lenient resolution into `ProbeConfig`

use crate::{
    error::{AppError, Result},
    models::ProbeConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PARAM_URI: &str = "uri";
pub const PARAM_USERNAME: &str = "username";
pub const PARAM_PASSWORD: &str = "password";
pub const PARAM_EXCHANGE: &str = "exchange";
pub const PARAM_ROUTING_KEY: &str = "routing_key";
pub const PARAM_MESSAGE_BODY: &str = "message_body";
pub const PARAM_MESSAGE_SIZE_BYTES: &str = "message_size_bytes";
pub const PARAM_CONTENT_TYPE: &str = "content_type";
pub const PARAM_PERSISTENT: &str = "persistent";
pub const PARAM_CONNECT_TIMEOUT_MS: &str = "connect_timeout_ms";

/// Every option name the probe recognizes
pub const KNOWN_PARAMS: &[&str] = &[
    PARAM_URI,
    PARAM_USERNAME,
    PARAM_PASSWORD,
    PARAM_EXCHANGE,
    PARAM_ROUTING_KEY,
    PARAM_MESSAGE_BODY,
    PARAM_MESSAGE_SIZE_BYTES,
    PARAM_CONTENT_TYPE,
    PARAM_PERSISTENT,
    PARAM_CONNECT_TIMEOUT_MS,
];

/// Flat option-name to string mapping supplied by the harness
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeParameters {
    values: BTreeMap<String, String>,
}

impl ProbeParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameter table a harness offers its user before a run
    pub fn default_parameters() -> Self {
        let defaults = [
            (PARAM_URI, crate::defaults::DEFAULT_URI.to_string()),
            (PARAM_USERNAME, String::new()),
            (PARAM_PASSWORD, String::new()),
            (PARAM_EXCHANGE, String::new()),
            (PARAM_ROUTING_KEY, crate::defaults::DEFAULT_ROUTING_KEY.to_string()),
            (PARAM_MESSAGE_BODY, String::new()),
            (PARAM_MESSAGE_SIZE_BYTES, crate::defaults::DEFAULT_MESSAGE_SIZE_BYTES.to_string()),
            (PARAM_CONTENT_TYPE, crate::defaults::DEFAULT_CONTENT_TYPE.to_string()),
            (PARAM_PERSISTENT, "false".to_string()),
            (PARAM_CONNECT_TIMEOUT_MS, crate::defaults::DEFAULT_CONNECT_TIMEOUT_MS.to_string()),
        ];
        defaults.into_iter().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }

    /// Overlay `other` on top of this mapping
    pub fn merge(&mut self, other: &ProbeParameters) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Option names that the probe does not recognize
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|key| !KNOWN_PARAMS.contains(key))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProbeParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Parse a `KEY=VALUE` assignment; the value may be empty or contain `=`
pub fn parse_assignment(input: &str) -> Result<(String, String)> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| AppError::config(format!("Expected KEY=VALUE, got '{}'", input)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::config(format!("Missing parameter name in '{}'", input)));
    }

    Ok((key.to_string(), value.to_string()))
}

/// Resolve raw options into a typed config; never fails
pub fn resolve_config(raw: &ProbeParameters) -> ProbeConfig {
    let defaults = ProbeConfig::default();

    ProbeConfig {
        uri: string_or(raw.get(PARAM_URI), &defaults.uri),
        username: raw.get(PARAM_USERNAME).unwrap_or_default().to_string(),
        password: raw.get(PARAM_PASSWORD).unwrap_or_default().to_string(),
        exchange: raw.get(PARAM_EXCHANGE).unwrap_or_default().to_string(),
        routing_key: string_or(raw.get(PARAM_ROUTING_KEY), &defaults.routing_key),
        message_body: raw.get(PARAM_MESSAGE_BODY).unwrap_or_default().to_string(),
        message_size_bytes: parse_int_or(raw.get(PARAM_MESSAGE_SIZE_BYTES), defaults.message_size_bytes.into())
            .try_into()
            .unwrap_or(defaults.message_size_bytes),
        content_type: raw
            .get(PARAM_CONTENT_TYPE)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string),
        persistent: parse_bool_or(raw.get(PARAM_PERSISTENT), defaults.persistent),
        connect_timeout_ms: parse_int_or(raw.get(PARAM_CONNECT_TIMEOUT_MS), defaults.connect_timeout_ms as i64)
            .try_into()
            .unwrap_or(defaults.connect_timeout_ms),
    }
}

fn string_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// Signed integer, falling back to `default` when absent or malformed
pub fn parse_int_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Accepts true/1/yes/y and false/0/no/n in any case
pub fn parse_bool_or(value: Option<&str>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };

    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        _ => default,
    }
}

/// Render the parameters as aligned `key = value` lines, masking the password
pub fn display_parameters(params: &ProbeParameters) -> String {
    let width = params.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    params
        .iter()
        .map(|(key, value)| {
            let shown = if key == PARAM_PASSWORD && !value.is_empty() { "****" } else { value };
            format!("{:width$} = {}", key, shown, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &ProbeConfig) -> String {
    let mut summary = Vec::new();

    summary.push(format!("URI: {}", config.redacted_uri()));
    summary.push(format!(
        "Exchange: {}",
        if config.exchange.is_empty() { "(default)" } else { &config.exchange }
    ));
    summary.push(format!("Routing key: {}", config.routing_key));
    if config.has_literal_body() {
        summary.push(format!("Payload: literal body ({} bytes)", config.message_body.len()));
    } else {
        summary.push(format!("Payload: synthetic ({} bytes)", config.message_size_bytes.max(1)));
    }
    summary.push(format!(
        "Content type: {}",
        crate::models::envelope::resolve_content_type(config)
    ));
    summary.push(format!("Persistent: {}", config.persistent));
    summary.push(format!("Connect timeout: {}ms", config.connect_timeout_ms));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_resolve_to_defaults() {
        let config = resolve_config(&ProbeParameters::new());
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn test_default_parameters_table() {
        let params = ProbeParameters::default_parameters();
        assert_eq!(params.len(), KNOWN_PARAMS.len());
        assert_eq!(params.get(PARAM_CONTENT_TYPE), Some("application/json"));
        assert_eq!(params.get(PARAM_MESSAGE_SIZE_BYTES), Some("256"));
        assert!(params.unknown_keys().is_empty());

        let config = resolve_config(&params);
        assert_eq!(config.content_type.as_deref(), Some("application/json"));
        assert_eq!(config.routing_key, "test.key");
    }

    #[test]
    fn test_blank_strings_fall_back() {
        let params = ProbeParameters::new()
            .with(PARAM_URI, "  ")
            .with(PARAM_ROUTING_KEY, "")
            .with(PARAM_CONTENT_TYPE, " ");
        let config = resolve_config(&params);
        assert_eq!(config.uri, "amqp://localhost:5672");
        assert_eq!(config.routing_key, "test.key");
        assert!(config.content_type.is_none());
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let params = ProbeParameters::new()
            .with(PARAM_MESSAGE_SIZE_BYTES, "lots")
            .with(PARAM_CONNECT_TIMEOUT_MS, "-5");
        let config = resolve_config(&params);
        assert_eq!(config.message_size_bytes, 256);
        assert_eq!(config.connect_timeout_ms, 5000);
    }

    #[test]
    fn test_numbers_are_trimmed() {
        let params = ProbeParameters::new()
            .with(PARAM_MESSAGE_SIZE_BYTES, " 1024 ")
            .with(PARAM_CONNECT_TIMEOUT_MS, "0");
        let config = resolve_config(&params);
        assert_eq!(config.message_size_bytes, 1024);
        assert_eq!(config.connect_timeout_ms, 0);
    }

    #[test]
    fn test_size_outside_i32_falls_back() {
        for value in ["2147483648", "100000000000000", "-2147483649", "99999999999999999999"] {
            let params = ProbeParameters::new().with(PARAM_MESSAGE_SIZE_BYTES, value);
            assert_eq!(resolve_config(&params).message_size_bytes, 256, "{value}");
        }

        let params = ProbeParameters::new().with(PARAM_MESSAGE_SIZE_BYTES, "2147483647");
        assert_eq!(resolve_config(&params).message_size_bytes, i32::MAX);
    }

    #[test]
    fn test_negative_size_is_kept_for_payload_policy() {
        let params = ProbeParameters::new().with(PARAM_MESSAGE_SIZE_BYTES, "-3");
        assert_eq!(resolve_config(&params).message_size_bytes, -3);
    }

    #[test]
    fn test_bool_parsing() {
        for value in ["true", "TRUE", " yes ", "Y", "1"] {
            assert!(parse_bool_or(Some(value), false), "{value}");
        }
        for value in ["false", "No", "n", "0"] {
            assert!(!parse_bool_or(Some(value), true), "{value}");
        }
        assert!(parse_bool_or(Some("maybe"), true));
        assert!(!parse_bool_or(None, false));
    }

    #[test]
    fn test_unknown_keys() {
        let params = ProbeParameters::new()
            .with(PARAM_URI, "amqp://broker")
            .with("amqp_uri", "amqp://old-name");
        assert_eq!(params.unknown_keys(), vec!["amqp_uri"]);
    }

    #[test]
    fn test_merge_overrides() {
        let mut params = ProbeParameters::default_parameters();
        params.merge(&ProbeParameters::new().with(PARAM_ROUTING_KEY, "orders.created"));
        assert_eq!(params.get(PARAM_ROUTING_KEY), Some("orders.created"));
        assert_eq!(params.get(PARAM_URI), Some("amqp://localhost:5672"));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("message_body={\"a\":1}").unwrap(),
            ("message_body".to_string(), "{\"a\":1}".to_string())
        );
        assert_eq!(
            parse_assignment("uri=amqp://u:p@h/?heartbeat=10").unwrap().1,
            "amqp://u:p@h/?heartbeat=10"
        );
        assert_eq!(parse_assignment("exchange=").unwrap().1, "");
        assert!(parse_assignment("no-equals").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn test_display_parameters_masks_password() {
        let params = ProbeParameters::new()
            .with(PARAM_PASSWORD, "secret")
            .with(PARAM_USERNAME, "guest");
        let shown = display_parameters(&params);
        assert!(shown.contains("password = ****"));
        assert!(shown.contains("username = guest"));
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&ProbeConfig::default());
        assert!(summary.contains("Exchange: (default)"));
        assert!(summary.contains("Payload: synthetic (256 bytes)"));
        assert!(summary.contains("Content type: application/octet-stream"));
    }
}
