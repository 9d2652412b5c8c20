use crate::application_port::{RotationPolicy, SessionConfig, SessionConfigError};
use anyhow::{Result, anyhow};
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

/// Environment overrides look like `TOKENWARD__SESSION__GRACE_PERIOD_MS=5000`.
pub const ENV_PREFIX: &str = "TOKENWARD";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub session: Session,
    pub store: Store,
    pub recheck: Recheck,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub duration_ms: u64,
    pub grace_period_ms: u64,
    pub token_length: usize,
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_purge_interval_ms")]
    pub purge_interval_ms: u64, // memory backend only
}

#[derive(Debug, Deserialize)]
pub struct Recheck {
    pub backend: String, // "allow_all" or "static"
    #[serde(default)]
    pub revoked: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

fn default_key_prefix() -> String {
    "session".to_string()
}

fn default_purge_interval_ms() -> u64 {
    60_000
}

impl TryFrom<&Session> for SessionConfig {
    type Error = SessionConfigError;

    fn try_from(s: &Session) -> Result<Self, Self::Error> {
        Ok(SessionConfig::new(
            Duration::from_millis(s.duration_ms),
            Duration::from_millis(s.grace_period_ms),
            s.token_length,
        )?
        .with_rotation(s.rotation))
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);
    load(Config::builder().add_source(File::with_name(path)))
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    load(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn load(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[session]
duration_ms = 100000
grace_period_ms = 10000
token_length = 32
rotation = "revoke"

[store]
backend = "memory"

[recheck]
backend = "static"
revoked = ["mallory"]

[log]
filter = "tokenward=debug"
"#;

    #[test]
    fn test_parse_settings_str_reads_all_sections() {
        let settings = parse_settings_str(SAMPLE).unwrap();

        assert_eq!(settings.session.duration_ms, 100_000);
        assert_eq!(settings.session.rotation, RotationPolicy::Revoke);
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.store.key_prefix, "session");
        assert_eq!(settings.store.purge_interval_ms, 60_000);
        assert!(settings.store.redis_url.is_none());
        assert_eq!(settings.recheck.revoked, vec!["mallory".to_string()]);
        assert_eq!(settings.log.filter, "tokenward=debug");
    }

    #[test]
    fn test_parse_settings_str_missing_section_fails() {
        let result = parse_settings_str("[log]\nfilter = \"info\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_session_config_try_from_settings() {
        let settings = parse_settings_str(SAMPLE).unwrap();

        let cfg = SessionConfig::try_from(&settings.session).unwrap();

        assert_eq!(cfg.session_duration(), Duration::from_millis(100_000));
        assert_eq!(cfg.grace_period(), Duration::from_millis(10_000));
        assert_eq!(cfg.token_length(), 32);
        assert_eq!(cfg.rotation(), RotationPolicy::Revoke);
    }

    #[test]
    fn test_session_config_try_from_rejects_short_tokens() {
        let session = Session {
            duration_ms: 1_000,
            grace_period_ms: 0,
            token_length: 8,
            rotation: RotationPolicy::Overlap,
        };

        let err = SessionConfig::try_from(&session).unwrap_err();

        assert_eq!(err, SessionConfigError::TokenLength(8));
    }
}
