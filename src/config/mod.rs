//! Health Configuration Module
//!
//! Scoring thresholds loaded from TOML, replacing hardcoded constants with
//! operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `ASSET_HEALTH_CONFIG` environment variable (path to TOML file)
//! 2. `asset_health.toml` in the current working directory
//! 3. Built-in defaults (the reference scoring constants)
//!
//! ## Usage
//!
//! The config is an ordinary value handed to whoever needs it; there is no
//! process-wide instance.
//!
//! ```ignore
//! let config = HealthConfig::load();
//! let summaries = aggregate_vibration_history_with(&readings, &config);
//! ```

mod health_config;
pub mod defaults;
pub mod validation;

pub use health_config::*;
