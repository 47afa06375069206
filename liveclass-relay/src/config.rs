use crate::api::RelayService;
use crate::auth::TokenRegistry;
use crate::directory::StaticClassDirectory;
use crate::store::MemoryStore;
use liveclass_core::utils::DEFAULT_SIGNAL_TTL_SECS;
use liveclass_core::{ClassId, ParticipantId};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

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
pub struct ClassEntry {
    pub id: ClassId,
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEntry {
    pub token: String,
    pub participant: ParticipantId,
}

/// Relay settings. Every field has a default so a config file only needs to
/// list what it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    /// Undelivered signals older than this are dropped.
    pub signal_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub classes: Vec<ClassEntry>,
    pub sessions: Vec<SessionEntry>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            signal_ttl_secs: DEFAULT_SIGNAL_TTL_SECS,
            sweep_interval_secs: 60,
            classes: Vec::new(),
            sessions: Vec::new(),
        }
    }
}

impl RelayConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RelayConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signal_ttl_secs == 0 {
            return Err(ConfigError::Invalid("signal_ttl_secs must be positive".into()));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sweep_interval_secs must be positive".into(),
            ));
        }
        if let Some(entry) = self.sessions.iter().find(|s| s.token.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "empty session token for participant {}",
                entry.participant
            )));
        }
        Ok(())
    }

    pub fn signal_ttl(&self) -> Duration {
        Duration::from_secs(self.signal_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Wires the in-memory store, token registry and class directory together.
    pub fn build_service(&self) -> RelayService {
        let tokens = TokenRegistry::new();
        for session in &self.sessions {
            tokens.insert(session.token.clone(), session.participant);
        }

        let directory = StaticClassDirectory::new();
        for class in &self.classes {
            directory.insert_class(class.id, class.participants.clone());
        }

        RelayService::new(
            Arc::new(MemoryStore::new(self.signal_ttl())),
            Arc::new(tokens),
            Arc::new(directory),
        )
    }
}
