//! ghmir core library: domain types, configuration document, validation.
//!
//! - [`types`]: newtypes and configuration structs
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / validate / env expansion / entity list parsing

pub mod config;
pub mod error;
pub mod types;

pub use config::ValidatedEntity;
pub use error::ConfigError;
pub use types::{Config, DestinationConfig, EntityConfig, EntityName, EntityType, Secret};
