use crate::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

impl Default for IceServerConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
            username: None,
            credential: None,
        }
    }
}
