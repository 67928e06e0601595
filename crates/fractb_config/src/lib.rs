//! Parsing and validation of `fractb.toml` testbench configuration files.
//!
//! This crate reads the testbench configuration and produces a strongly-typed
//! [`HarnessConfig`], then resolves its named sweeps into runnable
//! [`ResolvedSweep`]s with per-family pin-name overrides applied.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_path, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{pin_map, resolve_matching, resolve_sweep, sweep_spec, ResolvedSweep};
pub use types::*;
