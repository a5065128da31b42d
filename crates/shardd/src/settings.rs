//! Daemon settings.
//!
//! Resolution order per field: CLI flag, then environment variable, then
//! default. Secrets (the cluster token) only come from the environment.

use std::path::PathBuf;

/// Environment variables honored by the daemon.
const ENV_PORT: &str = "SHARDHOST_PORT";
const ENV_DATA_DIR: &str = "SHARDHOST_DATA_DIR";
const ENV_CLUSTER_URL: &str = "SHARDHOST_CLUSTER_URL";
const ENV_CLUSTER_TOKEN: &str = "SHARDHOST_CLUSTER_TOKEN";
const ENV_PROFILES: &str = "SHARDHOST_PROFILES";

/// Fully resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Cluster agent base URL; absent means the in-memory backend.
    pub cluster_url: Option<String>,
    pub cluster_token: Option<String>,
    /// Optional profiles.toml override file.
    pub profiles_path: Option<PathBuf>,
}

/// CLI-provided overrides, all optional.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub cluster_url: Option<String>,
    pub profiles_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from CLI overrides and the process environment.
    pub fn resolve(overrides: Overrides) -> anyhow::Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        overrides: Overrides,
        getenv: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let port = match overrides.port {
            Some(port) => port,
            None => match getenv(ENV_PORT) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("{ENV_PORT} is not a valid port: {raw}"))?,
                None => 8000,
            },
        };

        let data_dir = overrides
            .data_dir
            .or_else(|| getenv(ENV_DATA_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("/var/lib/shardhost"));

        let cluster_url = overrides.cluster_url.or_else(|| getenv(ENV_CLUSTER_URL));
        let cluster_token = getenv(ENV_CLUSTER_TOKEN);
        let profiles_path = overrides
            .profiles_path
            .or_else(|| getenv(ENV_PROFILES).map(PathBuf::from));

        Ok(Self {
            port,
            data_dir,
            cluster_url,
            cluster_token,
            profiles_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env_or_flags() {
        let settings = Settings::resolve_with(Overrides::default(), |_| None).unwrap();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/shardhost"));
        assert!(settings.cluster_url.is_none());
        assert!(settings.cluster_token.is_none());
    }

    #[test]
    fn env_fills_in_when_flags_absent() {
        let settings = Settings::resolve_with(
            Overrides::default(),
            env(&[
                ("SHARDHOST_PORT", "9000"),
                ("SHARDHOST_CLUSTER_URL", "https://agent:7443"),
                ("SHARDHOST_CLUSTER_TOKEN", "tok"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.cluster_url.as_deref(), Some("https://agent:7443"));
        assert_eq!(settings.cluster_token.as_deref(), Some("tok"));
    }

    #[test]
    fn flags_beat_env() {
        let overrides = Overrides {
            port: Some(8100),
            cluster_url: Some("https://flag:1".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::resolve_with(
            overrides,
            env(&[
                ("SHARDHOST_PORT", "9000"),
                ("SHARDHOST_CLUSTER_URL", "https://env:1"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.port, 8100);
        assert_eq!(settings.cluster_url.as_deref(), Some("https://flag:1"));
    }

    #[test]
    fn bad_port_env_is_an_error() {
        let result = Settings::resolve_with(
            Overrides::default(),
            env(&[("SHARDHOST_PORT", "not-a-port")]),
        );
        assert!(result.is_err());
    }
}
