use crate::model::participant::IdParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct ClassId(pub Uuid);

impl ClassId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ClassId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| IdParseError {
                kind: "class",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
