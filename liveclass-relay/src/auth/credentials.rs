use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};

pub const TOKEN_COOKIE: &str = "token";

/// Raw session credential presented by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Looks for `Authorization: Bearer <token>` first, then a `token` cookie.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(token) = bearer {
            return Some(Self::new(token));
        }

        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
            .map(|(_, value)| Self::new(value))
    }
}
