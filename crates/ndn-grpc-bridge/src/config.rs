// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge configuration.
//!
//! Values are layered, highest priority first:
//!
//! 1. Explicit overrides (command line)
//! 2. Environment variables (dotted key upper-cased, `.` -> `_`,
//!    e.g. `GRPC_SERVER_PORT`)
//! 3. Configuration file (YAML, or TOML when the extension is `.toml`)
//! 4. Built-in defaults

use crate::name::Name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Running mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Bridge node: NDN producer + gRPC server forwarding to NDN.
    Server,
    /// gRPC client sending test data to a bridge node.
    Client,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "client" => Ok(Self::Client),
            other => Err(ConfigError::Invalid(format!(
                "Unknown mode '{}' (expected server or client)",
                other
            ))),
        }
    }
}

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Running mode.
    #[serde(default)]
    pub mode: Option<Mode>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ndn: NdnConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub grpc: GrpcConfig,

    #[serde(default)]
    pub broker: BrokerSettings,

    /// Statistics reporting interval (seconds, 0 to disable).
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// NDN endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdnConfig {
    /// PIB database location (opaque to the bridge).
    #[serde(default)]
    pub pib_path: Option<String>,

    /// TPM directory location (opaque to the bridge).
    #[serde(default)]
    pub tpm_path: Option<String>,

    /// Content store capacity of the local forwarder (packets).
    #[serde(default = "default_cs_capacity")]
    pub content_store_capacity: usize,

    /// Maximum pending Interests before the forwarder reports congestion.
    #[serde(default = "default_max_pending")]
    pub max_pending_interests: usize,
}

impl Default for NdnConfig {
    fn default() -> Self {
        Self {
            pib_path: None,
            tpm_path: None,
            content_store_capacity: default_cs_capacity(),
            max_pending_interests: default_max_pending(),
        }
    }
}

/// NDN producer side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Prefixes to serve.
    #[serde(default)]
    pub routes: Vec<RouteSpec>,

    /// Static content, keyed by full name.
    #[serde(default)]
    pub data: BTreeMap<String, String>,

    /// Default freshness period for published Data (milliseconds).
    #[serde(default = "default_freshness")]
    pub freshness_period_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            data: BTreeMap::new(),
            freshness_period_ms: default_freshness(),
        }
    }
}

impl ServerConfig {
    /// Default freshness period.
    pub fn freshness_period(&self) -> Duration {
        Duration::from_millis(self.freshness_period_ms)
    }
}

/// A served prefix: either a bare name (static route) or a detailed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteSpec {
    Prefix(String),
    Detailed(RouteConfig),
}

impl RouteSpec {
    /// Normalize to a detailed route configuration.
    pub fn to_config(&self) -> RouteConfig {
        match self {
            Self::Prefix(prefix) => RouteConfig::new(prefix.clone()),
            Self::Detailed(config) => config.clone(),
        }
    }

    /// Route prefix.
    pub fn prefix(&self) -> &str {
        match self {
            Self::Prefix(prefix) => prefix,
            Self::Detailed(config) => &config.prefix,
        }
    }
}

/// Detailed route configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Name prefix.
    pub prefix: String,

    /// What to do with matching Interests.
    #[serde(default)]
    pub mode: RouteModeConfig,

    /// Handler name (custom mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Content returned when the data store has no entry (static mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Freshness override (milliseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness_period_ms: Option<u64>,
}

impl RouteConfig {
    /// Static route for `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            mode: RouteModeConfig::Static,
            handler: None,
            content: None,
            freshness_period_ms: None,
        }
    }

    /// Custom handler route.
    pub fn custom(prefix: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            mode: RouteModeConfig::Custom,
            handler: Some(handler.into()),
            ..Self::new(prefix)
        }
    }

    /// Cross-protocol forward route.
    pub fn forward(prefix: impl Into<String>) -> Self {
        Self {
            mode: RouteModeConfig::Forward,
            ..Self::new(prefix)
        }
    }

    /// Set freshness override.
    pub fn freshness_ms(mut self, ms: u64) -> Self {
        self.freshness_period_ms = Some(ms);
        self
    }
}

/// Route mode as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteModeConfig {
    #[default]
    Static,
    Custom,
    Forward,
}

/// NDN consumer side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Interest names; the first one is the gRPC -> NDN forwarding prefix.
    #[serde(default)]
    pub interests: Vec<String>,

    /// Interest lifetime (milliseconds).
    #[serde(default = "default_interest_lifetime", alias = "interest_lifetime")]
    pub interest_lifetime_ms: u64,

    /// Set MustBeFresh on forwarded Interests.
    #[serde(default)]
    pub disable_cache: bool,

    /// Append `<value>/<payload>` to the forwarding prefix.
    #[serde(default = "default_true")]
    pub append_request_to_name: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            interest_lifetime_ms: default_interest_lifetime(),
            disable_cache: false,
            append_request_to_name: true,
        }
    }
}

impl ClientConfig {
    /// Interest lifetime.
    pub fn interest_lifetime(&self) -> Duration {
        Duration::from_millis(self.interest_lifetime_ms)
    }
}

/// gRPC configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrpcConfig {
    #[serde(default)]
    pub server: GrpcServerConfig,

    #[serde(default)]
    pub client: GrpcClientConfig,
}

/// gRPC server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrpcServerConfig {
    #[serde(default = "default_grpc_port")]
    pub port: u16,
}

impl Default for GrpcServerConfig {
    fn default() -> Self {
        Self {
            port: default_grpc_port(),
        }
    }
}

/// gRPC client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrpcClientConfig {
    /// Server address (`host:port`).
    #[serde(default = "default_grpc_host")]
    pub host: String,

    /// Per-call deadline (milliseconds).
    #[serde(default = "default_grpc_timeout")]
    pub timeout_ms: u64,

    /// `(value, payload)` pairs sent by the `client` command.
    #[serde(default = "default_test_data")]
    pub test_data: Vec<(i64, String)>,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            host: default_grpc_host(),
            timeout_ms: default_grpc_timeout(),
            test_data: default_test_data(),
        }
    }
}

impl GrpcClientConfig {
    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Cross-protocol broker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSettings {
    /// Outbound request queue capacity.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Added on top of the outbound protocol's own timeout.
    #[serde(default = "default_grace_margin")]
    pub grace_margin_ms: u64,

    /// Bounded wait for the outbound adapter to become ready.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_ms: u64,

    /// Delay before the single retry of a not-ready call.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            grace_margin_ms: default_grace_margin(),
            ready_timeout_ms: default_ready_timeout(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stats_interval() -> u64 {
    10
}

fn default_cs_capacity() -> usize {
    1024
}

fn default_max_pending() -> usize {
    4096
}

fn default_freshness() -> u64 {
    10_000
}

fn default_interest_lifetime() -> u64 {
    4000
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_grpc_host() -> String {
    "localhost:50051".to_string()
}

fn default_grpc_timeout() -> u64 {
    5000
}

fn default_test_data() -> Vec<(i64, String)> {
    (1..=4).map(|i| (i, format!("data{}", i))).collect()
}

fn default_queue_capacity() -> usize {
    256
}

fn default_grace_margin() -> u64 {
    1000
}

fn default_ready_timeout() -> u64 {
    5000
}

fn default_retry_delay() -> u64 {
    1000
}

/// Explicit overrides (highest priority).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mode: Option<Mode>,
    pub log_level: Option<String>,
    pub grpc_port: Option<u16>,
    pub grpc_host: Option<String>,
}

impl BridgeConfig {
    /// Load from `path`, or from the first default location that exists.
    ///
    /// Environment variables are applied on top of the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::find_default_file() {
                Some(found) => {
                    tracing::info!("Loaded configuration from: {}", found.display());
                    Self::from_file(&found)?
                }
                None => {
                    tracing::debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a configuration file (YAML, or TOML for `.toml`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Ok(toml::from_str(&content)?)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse YAML content. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn find_default_file() -> Option<PathBuf> {
        let mut candidates = vec![
            PathBuf::from("config.yaml"),
            PathBuf::from("config.yml"),
            PathBuf::from("config.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            candidates.push(Path::new(&home).join(".ndn").join("config.yaml"));
        }
        candidates.into_iter().find(|p| p.is_file())
    }

    /// Apply environment variables through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = get("MODE") {
            self.mode = Some(mode.parse()?);
        }
        if let Some(level) = get("LOG_LEVEL").or_else(|| get("LOGGING_LEVEL")) {
            self.logging.level = level;
        }
        if let Some(path) = get("NDN_PIB_PATH") {
            self.ndn.pib_path = Some(path);
        }
        if let Some(path) = get("NDN_TPM_PATH") {
            self.ndn.tpm_path = Some(path);
        }
        if let Some(routes) = get("SERVER_ROUTES") {
            self.server.routes = split_list(&routes)
                .into_iter()
                .map(RouteSpec::Prefix)
                .collect();
        }
        if let Some(v) = get("SERVER_FRESHNESS_PERIOD_MS") {
            self.server.freshness_period_ms = parse_env("SERVER_FRESHNESS_PERIOD_MS", &v)?;
        }
        if let Some(interests) = get("CLIENT_INTERESTS") {
            self.client.interests = split_list(&interests);
        }
        if let Some(v) = get("CLIENT_INTEREST_LIFETIME_MS") {
            self.client.interest_lifetime_ms = parse_env("CLIENT_INTEREST_LIFETIME_MS", &v)?;
        }
        if let Some(v) = get("CLIENT_DISABLE_CACHE") {
            self.client.disable_cache = parse_bool(&v);
        }
        if let Some(v) = get("GRPC_SERVER_PORT") {
            self.grpc.server.port = parse_env("GRPC_SERVER_PORT", &v)?;
        }
        if let Some(host) = get("GRPC_CLIENT_HOST") {
            self.grpc.client.host = host;
        }
        Ok(())
    }

    /// Apply explicit overrides.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(mode) = overrides.mode {
            self.mode = Some(mode);
        }
        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(port) = overrides.grpc_port {
            self.grpc.server.port = port;
        }
        if let Some(ref host) = overrides.grpc_host {
            self.grpc.client.host = host.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grpc.server.port == 0 {
            return Err(ConfigError::Invalid("grpc.server.port cannot be 0".into()));
        }
        if self.client.interest_lifetime_ms == 0 {
            return Err(ConfigError::Invalid(
                "client.interest_lifetime_ms cannot be 0".into(),
            ));
        }
        if self.grpc.client.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "grpc.client.timeout_ms cannot be 0".into(),
            ));
        }
        if self.broker.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "broker.queue_capacity cannot be 0".into(),
            ));
        }
        if self.ndn.max_pending_interests == 0 {
            return Err(ConfigError::Invalid(
                "ndn.max_pending_interests cannot be 0".into(),
            ));
        }

        for (i, spec) in self.server.routes.iter().enumerate() {
            let route = spec.to_config();
            parse_name("server.routes", &route.prefix)?;
            match route.mode {
                RouteModeConfig::Custom if route.handler.is_none() => {
                    return Err(ConfigError::Invalid(format!(
                        "Route {} ({}) is custom but names no handler",
                        i, route.prefix
                    )));
                }
                RouteModeConfig::Forward if self.grpc.client.host.trim().is_empty() => {
                    return Err(ConfigError::Invalid(format!(
                        "Route {} ({}) forwards to gRPC but grpc.client.host is empty",
                        i, route.prefix
                    )));
                }
                _ => {}
            }
        }

        for name in self.server.data.keys() {
            parse_name("server.data", name)?;
        }
        for name in &self.client.interests {
            parse_name("client.interests", name)?;
        }

        Ok(())
    }

    /// Example configuration used by `gen-config`.
    pub fn example() -> Self {
        let mut data = BTreeMap::new();
        data.insert("/example/data".into(), "Hello from NDN Server!".into());
        data.insert("/example/test".into(), "This is a test message".into());

        Self {
            mode: Some(Mode::Server),
            server: ServerConfig {
                routes: vec![
                    RouteSpec::Prefix("/example".into()),
                    RouteSpec::Detailed(RouteConfig::custom("/grpc/process", "process")),
                    RouteSpec::Detailed(RouteConfig::forward("/bridge/grpc").freshness_ms(0)),
                ],
                data,
                freshness_period_ms: default_freshness(),
            },
            client: ClientConfig {
                interests: vec!["/grpc/process".into()],
                ..ClientConfig::default()
            },
            ..Self::default()
        }
    }
}

fn parse_name(field: &str, value: &str) -> Result<Name, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", field, e)))
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{}={}: {}", key, value, e)))
}

fn parse_bool(value: &str) -> bool {
    let v = value.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SAMPLE_YAML: &str = r#"
mode: server
server:
  routes:
    - /example
    - prefix: /grpc/process
      mode: custom
      handler: process
    - prefix: /bridge
      mode: forward
      freshness_period_ms: 0
  data:
    /example/data: "Hello from NDN Server!"
  freshness_period_ms: 5000
client:
  interests: ["/grpc/process"]
  interest_lifetime: 2000
  disable_cache: true
grpc:
  server:
    port: 6000
  client:
    host: "127.0.0.1:6000"
    test_data:
      - [7, "seven"]
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.grpc.server.port, 50051);
        assert_eq!(config.grpc.client.host, "localhost:50051");
        assert_eq!(config.client.interest_lifetime_ms, 4000);
        assert_eq!(config.server.freshness_period_ms, 10_000);
        assert!(!config.client.disable_cache);
        assert_eq!(config.grpc.client.test_data.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let config = BridgeConfig::from_yaml(SAMPLE_YAML).expect("parse");
        assert_eq!(config.mode, Some(Mode::Server));
        assert_eq!(config.server.routes.len(), 3);
        assert_eq!(config.server.routes[0].prefix(), "/example");

        let custom = config.server.routes[1].to_config();
        assert_eq!(custom.mode, RouteModeConfig::Custom);
        assert_eq!(custom.handler.as_deref(), Some("process"));

        let forward = config.server.routes[2].to_config();
        assert_eq!(forward.mode, RouteModeConfig::Forward);
        assert_eq!(forward.freshness_period_ms, Some(0));

        assert_eq!(config.client.interest_lifetime_ms, 2000);
        assert!(config.client.disable_cache);
        assert_eq!(config.grpc.server.port, 6000);
        assert_eq!(config.grpc.client.test_data, vec![(7, "seven".to_string())]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = BridgeConfig::from_yaml("   \n").expect("parse");
        assert!(config.mode.is_none());
        assert_eq!(config.grpc.server.port, 50051);
    }

    #[test]
    fn test_from_file_toml() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(
            file,
            r#"
mode = "client"

[grpc.client]
host = "10.0.0.1:7000"

[client]
interests = ["/a/b"]
"#
        )
        .expect("write");

        let config = BridgeConfig::from_file(file.path()).expect("load");
        assert_eq!(config.mode, Some(Mode::Client));
        assert_eq!(config.grpc.client.host, "10.0.0.1:7000");
        assert_eq!(config.client.interests, vec!["/a/b".to_string()]);
    }

    #[test]
    fn test_from_file_yaml() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("tempfile");
        file.write_all(SAMPLE_YAML.as_bytes()).expect("write");

        let config = BridgeConfig::from_file(file.path()).expect("load");
        assert_eq!(config.grpc.server.port, 6000);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = BridgeConfig::from_yaml(SAMPLE_YAML).expect("parse");
        config
            .apply_env_with(env(&[
                ("GRPC_SERVER_PORT", "7001"),
                ("CLIENT_INTERESTS", "/x, /y"),
                ("CLIENT_DISABLE_CACHE", "false"),
                ("MODE", "CLIENT"),
                ("LOG_LEVEL", "debug"),
            ]))
            .expect("env");

        assert_eq!(config.grpc.server.port, 7001);
        assert_eq!(config.client.interests, vec!["/x", "/y"]);
        assert!(!config.client.disable_cache);
        assert_eq!(config.mode, Some(Mode::Client));
        assert_eq!(config.logging.level, "debug");
        // Untouched values keep the file's setting.
        assert_eq!(config.client.interest_lifetime_ms, 2000);
    }

    #[test]
    fn test_env_invalid_value() {
        let mut config = BridgeConfig::default();
        let err = config
            .apply_env_with(env(&[("GRPC_SERVER_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(err.to_string().contains("GRPC_SERVER_PORT"));
    }

    #[test]
    fn test_overrides_beat_env() {
        let mut config = BridgeConfig::default();
        config
            .apply_env_with(env(&[("GRPC_CLIENT_HOST", "env:1")]))
            .expect("env");
        config.apply_overrides(&ConfigOverrides {
            grpc_host: Some("cli:2".into()),
            ..Default::default()
        });
        assert_eq!(config.grpc.client.host, "cli:2");
    }

    #[test]
    fn test_validation() {
        let mut config = BridgeConfig::default();
        config.grpc.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.server.routes.push(RouteSpec::Prefix("no-slash".into()));
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.server.routes.push(RouteSpec::Detailed(RouteConfig {
            mode: RouteModeConfig::Custom,
            ..RouteConfig::new("/a")
        }));
        assert!(config.validate().is_err());

        let mut config = BridgeConfig::default();
        config.grpc.client.host.clear();
        config
            .server
            .routes
            .push(RouteSpec::Detailed(RouteConfig::forward("/fwd")));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_round_trips_through_yaml() {
        let example = BridgeConfig::example();
        assert!(example.validate().is_ok());

        let yaml = serde_yaml::to_string(&example).expect("serialize");
        let back = BridgeConfig::from_yaml(&yaml).expect("parse");
        assert_eq!(back.server.routes.len(), example.server.routes.len());
        assert_eq!(back.client.interests, example.client.interests);
    }
}
