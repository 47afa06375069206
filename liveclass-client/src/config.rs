use liveclass_core::utils::DEFAULT_POLL_INTERVAL_MS;
use liveclass_core::{ClassId, IceServerConfig, ParticipantId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::session::SessionOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub relay_url: String,
    /// Session token sent as a bearer credential.
    pub token: String,
    /// Expected identity behind `token`. The relay has the final say; a
    /// mismatch aborts startup.
    pub participant_id: Option<ParticipantId>,
    pub class_id: Option<ClassId>,
    pub poll_interval_ms: u64,
    pub failure_warn_threshold: u32,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:8080".to_owned(),
            token: String::new(),
            participant_id: None,
            class_id: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            failure_warn_threshold: 5,
            ice_servers: vec![IceServerConfig::default()],
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.relay_url.starts_with("http://") || self.relay_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "relay_url must be an http(s) URL, got '{}'",
                self.relay_url
            )));
        }
        if self.token.trim().is_empty() {
            return Err(ConfigError::Invalid("token is required".into()));
        }
        if self.class_id.is_none() {
            return Err(ConfigError::Invalid("class_id is required".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.failure_warn_threshold == 0 {
            return Err(ConfigError::Invalid(
                "failure_warn_threshold must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Settles the local participant id from the relay-reported identity.
    pub fn resolve_identity(&self, reported: ParticipantId) -> Result<ParticipantId, ConfigError> {
        match self.participant_id {
            Some(expected) if expected != reported => Err(ConfigError::Invalid(format!(
                "participant_id {} does not match the session token's participant {}",
                expected, reported
            ))),
            _ => Ok(reported),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            poll_interval: self.poll_interval(),
            failure_warn_threshold: self.failure_warn_threshold,
        }
    }
}
