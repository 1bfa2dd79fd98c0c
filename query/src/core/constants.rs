// =============================================================================
// Application Identity
// =============================================================================

/// Application name (binary and display)
pub const APP_NAME: &str = "mgo-query";

/// Crate name as used by tracing targets
pub const APP_NAME_LOWER: &str = "mgo_query";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".mgo-query";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "mgo-query.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "MGO_QUERY_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "MGO_QUERY_LOG";

/// Environment variable for the maximum rows per page
pub const ENV_MAX_LIMIT: &str = "MGO_QUERY_MAX_LIMIT";

/// Environment variable for the column whitelist (comma-separated)
pub const ENV_WHITELIST: &str = "MGO_QUERY_WHITELIST";

// =============================================================================
// Logging Defaults
// =============================================================================

/// Default log level of the application target
pub const DEFAULT_LOG_LEVEL: &str = "warn";
