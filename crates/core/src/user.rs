//! UserId - Identity of a position owner

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::asset::IdError;

/// Maximum length of a user identifier
pub const MAX_USER_ID_LEN: usize = 64;

/// User identity (will be uppercased)
///
/// Wallet and key management live outside the core, so a user is only an
/// opaque, validated name here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdError> {
        let id = id.as_ref().trim().to_uppercase();

        if id.is_empty() {
            return Err(IdError::Empty);
        }

        if id.len() > MAX_USER_ID_LEN {
            return Err(IdError::TooLong {
                value: id,
                max: MAX_USER_ID_LEN,
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IdError::InvalidFormat(id));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<UserId> for String {
    fn from(user: UserId) -> Self {
        user.0
    }
}
