//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Stable key of a chat room.
///
/// Backends address rooms by whatever key they use (numeric index, path
/// segment, ...); the router only ever compares room ids by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a new RoomId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("room_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for RoomId {
    fn from(idx: u64) -> Self {
        Self(idx.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// User identifier (as reported by the identity provider).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
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
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_rejects_empty_string() {
        assert!(RoomId::new("").is_err());
        assert!(RoomId::new("   ").is_err());
    }

    #[test]
    fn room_id_from_index_matches_string_form() {
        let from_idx = RoomId::from(101);
        let from_str: RoomId = "101".parse().unwrap();
        assert_eq!(from_idx, from_str);
        assert_eq!(from_idx.as_str(), "101");
    }

    #[test]
    fn room_id_serializes_transparently() {
        let id = RoomId::from(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"7\"");
    }

    #[test]
    fn user_id_rejects_empty_string() {
        let err = UserId::new("").unwrap_err();
        assert_eq!(err.to_string(), "Field 'user_id' cannot be empty");
    }

    #[test]
    fn user_id_displays_inner_value() {
        let id = UserId::new("u9").unwrap();
        assert_eq!(format!("{}", id), "u9");
    }
}
