//! Application constants shared by the session layer and binaries.

/// Application name used when no configuration overrides it.
pub const DEFAULT_APP_NAME: &str = "miles";

/// Title shown by the presentation layer when none is configured.
pub const DEFAULT_APP_TITLE: &str = "Miles";

/// File name of the settings file inside the configuration directory.
pub const DEFAULT_CONFIG_FILE: &str = "settings.toml";

/// Prefix for environment variables overriding file configuration.
///
/// Nested keys use a double underscore, e.g. `MILES_LOG_LEVEL` or
/// `MILES_NETWORK`.
pub const ENV_PREFIX: &str = "MILES";

/// Default tracing filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log output format ("text" or "json").
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Capacity of the wallet event broadcast channel used by local providers.
pub const WALLET_EVENT_CAPACITY: usize = 16;
