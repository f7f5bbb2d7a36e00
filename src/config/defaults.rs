//! System-wide default constants.

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "ASSET_HEALTH_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "asset_health.toml";

// ============================================================================
// Snapshot Store
// ============================================================================

/// Default sled directory for persisted snapshots.
pub const STORAGE_PATH: &str = "./data/snapshots.db";

/// Snapshot key under which the equipment registry is saved.
pub const EQUIPMENT_LIST_KEY: &str = "equipmentList";
