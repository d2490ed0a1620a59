//! fleet.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default enumeration page bound when `[provider] max_results` is unset.
const DEFAULT_MAX_RESULTS: u32 = 1000;

/// Default wait-for-convergence deadline when `[wait] timeout` is unset.
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    pub pool: PoolConfig,
    pub provider: ProviderConfig,
    pub wait: Option<WaitConfig>,
}

/// `[pool]` — which group of instances the pool watches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Scoping boundary for membership (e.g. a network identifier).
    pub group: String,
    /// Regular expression tested against instance display names.
    pub filter: String,
    /// Provider region the client is bound to.
    pub region: Option<String>,
}

/// `[provider]` — which provider backend to construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend kind ("memory" is the only kind shipped in-tree).
    pub kind: String,
    /// Maximum instances fetched per enumeration (single page).
    pub max_results: Option<u32>,
    /// Seed instances for the memory provider.
    pub instances: Option<Vec<SeedInstance>>,
}

/// One seeded instance for the memory provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedInstance {
    pub id: String,
    pub name: Option<String>,
    /// Run-state name, e.g. "running" or "stopped".
    pub state: String,
}

/// `[wait]` — wait-for-convergence parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Deadline like "300s" or "5m".
    pub timeout: Option<String>,
}

impl FleetConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FleetConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Enumeration page bound, with default.
    pub fn max_results(&self) -> u32 {
        self.provider.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }

    /// Wait deadline, with default. `None` if the configured string
    /// does not parse as a duration.
    pub fn wait_timeout(&self) -> Option<Duration> {
        match self.wait.as_ref().and_then(|w| w.timeout.as_deref()) {
            Some(s) => parse_duration(s),
            None => Some(DEFAULT_WAIT_TIMEOUT),
        }
    }
}

/// Parse a duration string like "30s", "500ms", "5m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[pool]
group = "vpc-0abc"
filter = "web"

[provider]
kind = "memory"
"#;

    #[test]
    fn parse_minimal() {
        let config: FleetConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.pool.group, "vpc-0abc");
        assert_eq!(config.pool.filter, "web");
        assert_eq!(config.provider.kind, "memory");
        assert_eq!(config.max_results(), 1000);
        assert_eq!(config.wait_timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn parse_full_with_seed_instances() {
        let toml_str = r#"
[pool]
group = "vpc-0abc"
filter = "^web-"
region = "us-west-2"

[provider]
kind = "memory"
max_results = 50

[[provider.instances]]
id = "i-1"
name = "web-1"
state = "running"

[[provider.instances]]
id = "i-2"
name = "web-2"
state = "stopped"

[wait]
timeout = "2m"
"#;
        let config: FleetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pool.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.max_results(), 50);
        assert_eq!(config.wait_timeout(), Some(Duration::from_secs(120)));

        let seeds = config.provider.instances.unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].id, "i-1");
        assert_eq!(seeds[1].state, "stopped");
    }

    #[test]
    fn invalid_wait_timeout_is_none() {
        let config: FleetConfig = toml::from_str(
            r#"
[pool]
group = "vpc-0abc"
filter = "web"

[provider]
kind = "memory"

[wait]
timeout = "soon"
"#,
        )
        .unwrap();
        assert_eq!(config.wait_timeout(), None);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = FleetConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pool.group, "vpc-0abc");
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("soon"), None);
    }
}
