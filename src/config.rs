use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub publishing: PublishingConfig,
    pub registry: RegistryConfig,
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// WebSocket URL of the update feed (ws:// or wss://).
    pub url: String,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Max channel events queued for the worker before the client waits.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_event_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of dashboard views kept in the broadcast channel for /ws/dashboard (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub base_url: String,
    #[serde(default = "default_registry_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_registry_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (ws_dashboard clients, updates applied, stale drops) at INFO level.
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingConfig {
    /// Package to start tracking at startup.
    pub initial_package: Option<String>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.upstream.url.starts_with("ws://") || self.upstream.url.starts_with("wss://"),
            "upstream.url must start with ws:// or wss://, got {:?}",
            self.upstream.url
        );
        anyhow::ensure!(
            self.upstream.reconnect_delay_ms > 0,
            "upstream.reconnect_delay_ms must be > 0, got {}",
            self.upstream.reconnect_delay_ms
        );
        anyhow::ensure!(
            self.upstream.event_capacity > 0,
            "upstream.event_capacity must be > 0, got {}",
            self.upstream.event_capacity
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.registry.base_url.starts_with("http://")
                || self.registry.base_url.starts_with("https://"),
            "registry.base_url must start with http:// or https://, got {:?}",
            self.registry.base_url
        );
        anyhow::ensure!(
            self.registry.timeout_secs > 0,
            "registry.timeout_secs must be > 0, got {}",
            self.registry.timeout_secs
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        if let Some(name) = &self.tracking.initial_package {
            anyhow::ensure!(
                !name.trim().is_empty(),
                "tracking.initial_package must be non-empty when set"
            );
        }
        Ok(())
    }
}
