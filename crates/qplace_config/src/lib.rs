//! Parsing and validation of `qplace.toml` placer configuration files.
//!
//! This crate reads the configuration file, produces a strongly-typed
//! [`QplaceConfig`], and merges command-line overrides on top of it.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_settings, Overrides, ResolvedSettings};
pub use types::*;
