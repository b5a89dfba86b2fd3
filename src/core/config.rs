use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub tracker: TrackerConfig,
    pub compliance: ComplianceConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Interval (seconds) clients are told to announce at
    #[serde(default = "default_announce_interval")]
    pub announce_interval: i64,
    /// Minimum interval (seconds) clients may announce at
    #[serde(default = "default_min_announce_interval")]
    pub min_announce_interval: i64,
    /// How often (seconds) the stale-peer sweep runs
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
    /// Peers silent for longer than this (seconds) are dropped
    #[serde(default = "default_peer_timeout")]
    pub peer_timeout: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceConfig {
    /// Minutes a peer must seed after downloading before stopping.
    /// Startup value only; adjustable at runtime via the admin API.
    #[serde(default = "default_required_seeding_minutes")]
    pub required_seeding_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_announce_interval() -> i64 {
    1800 // 30 minutes
}

fn default_min_announce_interval() -> i64 {
    900 // 15 minutes
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

fn default_peer_timeout() -> i64 {
    3600 // 1 hour
}

fn default_required_seeding_minutes() -> u64 {
    2880 // 48 hours
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.tracker.announce_interval <= 0 {
            bail!("announce_interval must be greater than 0");
        }

        if self.tracker.min_announce_interval <= 0 {
            bail!("min_announce_interval must be greater than 0");
        }

        if self.tracker.min_announce_interval > self.tracker.announce_interval {
            bail!(
                "min_announce_interval ({}) must not exceed announce_interval ({})",
                self.tracker.min_announce_interval,
                self.tracker.announce_interval
            );
        }

        if self.tracker.cleanup_interval == 0 {
            bail!("cleanup_interval must be greater than 0");
        }

        if self.tracker.peer_timeout <= self.tracker.cleanup_interval as i64 {
            bail!(
                "peer_timeout ({}) must be greater than cleanup_interval ({})",
                self.tracker.peer_timeout,
                self.tracker.cleanup_interval
            );
        }

        if self.api.api_key.is_empty() {
            bail!("api_key must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 6969,
                num_threads: default_num_threads(),
            },
            tracker: TrackerConfig {
                announce_interval: default_announce_interval(),
                min_announce_interval: default_min_announce_interval(),
                cleanup_interval: default_cleanup_interval(),
                peer_timeout: default_peer_timeout(),
            },
            compliance: ComplianceConfig {
                required_seeding_minutes: default_required_seeding_minutes(),
            },
            api: ApiConfig {
                api_key: String::new(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    const MINIMAL: &str = r#"
        [server]
        port = 6969

        [tracker]

        [compliance]

        [api]
        api_key = "secret"

        [logging]
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(MINIMAL).unwrap();

        assert_eq!(config.server.port, 6969);
        assert_eq!(config.tracker.announce_interval, 1800);
        assert_eq!(config.compliance.required_seeding_minutes, 2880);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config = parse(
            r#"
            [server]
            port = 8080
            num_threads = 2

            [tracker]
            announce_interval = 600
            min_announce_interval = 300
            cleanup_interval = 60
            peer_timeout = 900

            [compliance]
            required_seeding_minutes = 60

            [api]
            api_key = "secret"

            [logging]
            level = "debug"
            format = "console"
        "#,
        )
        .unwrap();

        assert_eq!(config.server.num_threads, 2);
        assert_eq!(config.compliance.required_seeding_minutes, 60);
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_zero_port_rejected() {
        let result = parse(&MINIMAL.replace("port = 6969", "port = 0"));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = parse(&MINIMAL.replace(r#"api_key = "secret""#, r#"api_key = """#));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut toml_str = MINIMAL.to_string();
        toml_str.push_str("level = \"verbose\"\n");
        assert!(parse(&toml_str).is_err());
    }

    #[test]
    fn test_min_interval_must_not_exceed_interval() {
        let mut toml_str = MINIMAL.replace(
            "[tracker]",
            "[tracker]\nannounce_interval = 600\nmin_announce_interval = 1200",
        );
        toml_str.push('\n');
        assert!(parse(&toml_str).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
