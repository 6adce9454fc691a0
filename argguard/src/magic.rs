//! Reserved names and fixed constants shared across the crate.

/// Registry key and schema entry name of the arguments-object placeholder.
///
/// The registry maps it to the plain-object matcher; a schema made of this single entry
/// (see [`crate::schema::Schema::arguments_object`]) asks the guard to re-validate the
/// matched record as a call of its own.
pub const ARGUMENTS_OBJECT_KEY: &str = "@@argguard/argumentsObject";

/// Registry key of the matcher invoked for names with no registry entry.
pub const DEFAULT_MATCHER_KEY: &str = "@@argguard/defaultMatcher";

/// Registry name the array-suffix form resolves to check the container itself.
pub const ARRAY_MATCHER: &str = "array";

/// Registry name of the plain-object matcher.
pub const PLAIN_OBJECT_MATCHER: &str = "Object";

/// Separator for compound matcher keys such as `"s|str|string"`.
pub const ALIAS_SEPARATOR: char = '|';

/// Default number of alias hops followed before a chain is treated as a cycle.
pub const DEFAULT_MAX_ALIAS_HOPS: usize = 64;

/// Number of characters of an unexpected value quoted in strict-mode failures.
pub const PREVIEW_MAX_CHARS: usize = 15;

/// Name of the environment variable containing the path to the configuration file.
/// If not set, defaults to `$XDG_CONFIG_HOME/argguard/config.toml` or
/// `$HOME/.config/argguard/config.toml`.
pub const ENV_CONFIG_PATH: &str = "ARGGUARD_CONFIG_PATH";
