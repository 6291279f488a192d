//! Configuration loading and the pre-run validation gate.
//!
//! # API pattern
//!
//! - `load_config_at(path)`: explicit path; used in tests with `TempDir`
//! - `default_config_path()`: `<home>/.config/ghmir/config.yaml` via `dirs`
//!
//! [`validate_entities`] runs once before any external command. It stops at
//! the first invalid entity.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{Config, DestinationConfig, EntityName, EntityType, Secret};

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// `<home>/.config/ghmir/config.yaml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(home.join(".config").join("ghmir").join("config.yaml"))
}

/// Read and parse the YAML document at `path`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_config_at(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// 2. Validate
// ---------------------------------------------------------------------------

/// An entity whose configuration passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntity {
    pub name: EntityName,
    pub entity_type: EntityType,
    pub source_token: Secret,
    pub destination: DestinationConfig,
}

/// Check every requested entity, in order, and return them typed.
///
/// Fails on the first entity that is missing, lacks a source token, has an
/// incomplete destination, or has a type outside {user, org}.
pub fn validate_entities(
    config: &Config,
    requested: &[EntityName],
) -> Result<Vec<ValidatedEntity>, ConfigError> {
    let mut validated = Vec::with_capacity(requested.len());
    for name in requested {
        let entry = config
            .entities
            .get(name)
            .ok_or_else(|| ConfigError::EntityNotFound(name.clone()))?;

        if entry.github_token.is_empty() {
            return Err(ConfigError::MissingSourceToken(name.clone()));
        }
        if !entry.gitlab.is_complete() {
            return Err(ConfigError::IncompleteDestination(name.clone()));
        }
        let entity_type =
            entry
                .entity_type
                .parse::<EntityType>()
                .map_err(|found| ConfigError::InvalidEntityType {
                    entity: name.clone(),
                    found,
                })?;

        validated.push(ValidatedEntity {
            name: name.clone(),
            entity_type,
            source_token: entry.github_token.clone(),
            destination: entry.gitlab.clone(),
        });
    }
    Ok(validated)
}

// ---------------------------------------------------------------------------
// 3. Command-surface helpers
// ---------------------------------------------------------------------------

/// Split a comma-separated entity list, trimming whitespace around each name.
pub fn parse_entity_list(csv: &str) -> Result<Vec<EntityName>, ConfigError> {
    if csv.trim().is_empty() {
        return Err(ConfigError::NoEntities);
    }
    csv.split(',')
        .map(|raw| {
            let name = raw.trim();
            if name.is_empty() {
                Err(ConfigError::EmptyEntityName)
            } else {
                Ok(EntityName::from(name))
            }
        })
        .collect()
}

/// Expand `$VAR` and `${VAR}` from the process environment.
pub fn expand_env(input: &str) -> String {
    expand_env_with(input, |name| std::env::var(name).ok())
}

/// [`expand_env`] with an explicit variable lookup. Unset variables expand
/// to the empty string; a `$` not followed by a name is kept literally.
pub fn expand_env_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some((start, '{')) => {
                chars.next();
                let rest = &input[start + 1..];
                match rest.find('}') {
                    Some(end) => {
                        out.push_str(&lookup(&rest[..end]).unwrap_or_default());
                        // Skip the name and the closing brace.
                        for _ in 0..=rest[..end].chars().count() {
                            chars.next();
                        }
                    }
                    None => {
                        out.push_str("${");
                    }
                }
            }
            Some((start, n)) if is_name_char(n) => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if !is_name_char(ch) {
                        break;
                    }
                    end = i + ch.len_utf8();
                    chars.next();
                }
                out.push_str(&lookup(&input[start..end]).unwrap_or_default());
            }
            _ => out.push('$'),
        }
    }
    out
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
