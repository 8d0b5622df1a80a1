//! Configuration loading
//!
//! Reads the application configuration from an optional file plus
//! environment variables.

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_env, load_from_file, find_config_path, validate};
