//! Guard configuration
//!
//! [`GuardConfig`] is read from TOML and turned into a guard by
//! [`crate::Guard::from_config`].
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{GuardError, GuardResult},
    magic::{DEFAULT_MAX_ALIAS_HOPS, ENV_CONFIG_PATH},
    registry::{Matcher, MatcherSet},
};

/// Guard settings loaded from a TOML file.
///
/// ```toml
/// strict = true
/// soft_fail = false
/// max_alias_hops = 16
///
/// [aliases]
/// "int|integer" = "number"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Strictness of [`crate::Guard::check`].
    pub strict: bool,
    /// Log validation failures instead of raising them.
    pub soft_fail: bool,
    pub max_alias_hops: usize,
    /// Extra aliases; keys may list several names separated by `|`.
    pub aliases: IndexMap<String, String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            strict: false,
            soft_fail: false,
            max_alias_hops: DEFAULT_MAX_ALIAS_HOPS,
            aliases: IndexMap::new(),
        }
    }
}

impl GuardConfig {
    /// Path of the user configuration file: `$ARGGUARD_CONFIG_PATH` when set, otherwise
    /// `argguard/config.toml` under the platform configuration directory (`%APPDATA%`, or
    /// `$XDG_CONFIG_HOME` falling back to `$HOME/.config`). Relative to the working
    /// directory when none of those variables is set.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(ENV_CONFIG_PATH) {
            return path.into();
        }

        let config_dir = if cfg!(target_os = "windows") {
            std::env::var_os("APPDATA").map(PathBuf::from)
        } else {
            std::env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))
        };

        config_dir.unwrap_or_default().join("argguard").join("config.toml")
    }

    pub fn from_toml_str(toml_str: &str, file: &str) -> GuardResult<Self> {
        toml::from_str(toml_str).map_err(|source| GuardError::ConfigParse {
            source,
            file: file.to_string(),
        })
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> GuardResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    /// The configured aliases as a matcher set.
    pub fn matcher_set(&self) -> MatcherSet {
        self.aliases
            .iter()
            .map(|(names, target)| (names.as_str(), Matcher::alias(target.as_str())))
            .collect()
    }
}
