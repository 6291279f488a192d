//! Domain types for the ghmir configuration document.
//!
//! Every field of an entity entry defaults to empty so that a missing key
//! surfaces as an entity-specific validation error rather than a generic
//! YAML parse failure.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Destination host used when an entity does not name one.
pub const DEFAULT_DESTINATION_HOST: &str = "gitlab.com";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A GitHub user or organization name as requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityName(pub String);

impl EntityName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Credential material. Never printed; use [`Secret::expose`] at the point
/// of use.
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of GitHub account; selects the cloning tool's clone type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    User,
    Org,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::User => write!(f, "user"),
            EntityType::Org => write!(f, "org"),
        }
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EntityType::User),
            "org" => Ok(EntityType::Org),
            other => Err(other.to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Document structs
// ---------------------------------------------------------------------------

/// Where an entity's repositories are pushed (the `gitlab:` block).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DestinationConfig {
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub token: Secret,
    #[serde(default)]
    pub group_name: String,
    /// Destination host; `gitlab.com` when omitted.
    #[serde(default)]
    pub host: Option<String>,
}

impl DestinationConfig {
    pub fn host(&self) -> &str {
        match self.host.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => DEFAULT_DESTINATION_HOST,
        }
    }

    /// Non-empty segments of `group_name`; more than one addresses a subgroup.
    pub fn group_segments(&self) -> impl Iterator<Item = &str> {
        self.group_name.split('/').filter(|s| !s.trim().is_empty())
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.token_name.is_empty()
            && !self.token.is_empty()
            && self.group_segments().next().is_some()
    }
}

/// One entity entry as written in the document. `entity_type` stays a raw
/// string until validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EntityConfig {
    #[serde(default)]
    pub github_token: Secret,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default)]
    pub gitlab: DestinationConfig,
}

/// Root of the YAML configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
    #[serde(default)]
    pub discord_webhook: Option<String>,
    #[serde(default)]
    pub entities: BTreeMap<EntityName, EntityConfig>,
}

impl Config {
    /// Notification endpoint, treating an empty string as unset.
    pub fn webhook(&self) -> Option<&str> {
        self.discord_webhook.as_deref().filter(|w| !w.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
