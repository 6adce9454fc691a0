//! Matcher registry
//!
//! A [`MatcherRegistry`] maps type names to [`Matcher`]s: either a predicate over a
//! [`Value`] or an alias naming another entry. Matcher declarations are written as
//! [`MatcherSet`]s whose keys may bundle several names (`"s|str|string"`); building or
//! extending a registry unfolds those keys so every alias lookup afterwards is a single
//! map access.
//!
//! Registries are immutable once built. [`MatcherRegistry::with`] returns a new registry
//! and never touches its parent, which makes a published registry safe to share between
//! threads without locking.
use std::{collections::HashMap, fmt, sync::Arc};

use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;

use crate::{
    error::{GuardError, GuardResult},
    magic::{
        ALIAS_SEPARATOR, ARGUMENTS_OBJECT_KEY, DEFAULT_MATCHER_KEY, DEFAULT_MAX_ALIAS_HOPS,
        PLAIN_OBJECT_MATCHER,
    },
    value::Value,
};

/// Predicate deciding whether a value belongs to a type.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

static REJECT_ALL: Lazy<Predicate> = Lazy::new(|| Arc::new(|_: &Value| false));

/// A registry entry.
#[derive(Clone)]
pub enum Matcher {
    Predicate(Predicate),
    /// Another type name, looked up again in the same registry.
    Alias(String),
}

impl Matcher {
    pub fn predicate(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Matcher::Predicate(Arc::new(predicate))
    }

    pub fn alias(target: impl Into<String>) -> Self {
        Matcher::Alias(target.into())
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
            Matcher::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
        }
    }
}

/// Matcher declarations as written by a consumer, before unfolding.
///
/// ```rust
/// # use argguard::registry::{MatcherRegistry, MatcherSet};
/// # use argguard::value::Value;
/// let set = MatcherSet::new()
///     .predicate("Name", |v| matches!(v, Value::String(s) if s.len() > 1))
///     .alias("n|nm", "Name");
/// let registry = MatcherRegistry::builtin().with(&set);
/// assert_eq!(registry.resolve("nm").name(), "Name");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    entries: IndexMap<String, Matcher>,
}

impl MatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, matcher: Matcher) {
        self.entries.insert(key.into(), matcher);
    }

    pub fn predicate(
        mut self,
        key: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.insert(key, Matcher::predicate(predicate));
        self
    }

    pub fn alias(mut self, key: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(key, Matcher::alias(target));
        self
    }

    /// Build an alias-only set from a record whose values are target names.
    pub fn from_value(value: &Value) -> GuardResult<Self> {
        let Value::Object(record) = value else {
            return Err(GuardError::InvalidMatcherSet { found: value.kind() });
        };

        let mut set = Self::new();
        for (key, target) in record {
            match target {
                Value::String(target) => set.insert(key.clone(), Matcher::alias(target.clone())),
                other => return Err(GuardError::InvalidMatcherSet { found: other.kind() }),
            }
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Matcher)> {
        self.entries.iter().map(|(k, m)| (k.as_str(), m))
    }

    /// Expand compound keys into one entry per name, all sharing the same matcher.
    /// Later declarations win on collision.
    pub fn unfold(&self) -> IndexMap<String, Matcher> {
        let mut unfolded = IndexMap::with_capacity(self.entries.len());
        for (key, matcher) in &self.entries {
            for variant in key.split(ALIAS_SEPARATOR) {
                unfolded.insert(variant.to_string(), matcher.clone());
            }
        }
        unfolded
    }
}

impl<K: Into<String>> FromIterator<(K, Matcher)> for MatcherSet {
    fn from_iter<I: IntoIterator<Item = (K, Matcher)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, matcher) in iter {
            set.insert(key, matcher);
        }
        set
    }
}

/// The matchers every guard starts from.
pub fn builtin_matchers() -> MatcherSet {
    MatcherSet::new()
        .predicate("string", |v| v.is_string())
        .alias("s|str", "string")
        .predicate("number", |v| v.is_number())
        .alias("n|num", "number")
        .predicate("boolean", |v| v.is_bool())
        .alias("b|bool", "boolean")
        .predicate("function", |v| v.is_function())
        .alias("f|fun|func", "function")
        .predicate("array", |v| v.is_array())
        .alias("a|arr", "array")
        .predicate("object", Value::is_object_like)
        .alias("o|obj", "object")
        .predicate("regexp", |v| v.is_reg_exp())
        .alias("r|rx|regex", "regexp")
        .predicate("date", |v| v.is_date())
        .alias("d", "date")
        .predicate(PLAIN_OBJECT_MATCHER, Value::is_plain_object)
        .alias("Obj", PLAIN_OBJECT_MATCHER)
}

/// Outcome of a name lookup: the name the alias chain stopped at and its predicate.
pub struct Resolution<'r> {
    name: &'r str,
    predicate: &'r Predicate,
}

impl<'r> Resolution<'r> {
    /// Last name reached through the alias chain. Failure messages cite this name.
    pub fn name(&self) -> &'r str {
        self.name
    }

    pub fn matches(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

/// An immutable, unfolded name-to-matcher mapping.
#[derive(Debug, Clone)]
pub struct MatcherRegistry {
    entries: HashMap<String, Matcher>,
    max_alias_hops: usize,
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MatcherRegistry {
    /// A registry holding only the reserved entries: the default matcher (rejects
    /// everything) and the arguments-object placeholder (aliased to `Object`).
    pub fn empty() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            ARGUMENTS_OBJECT_KEY.to_string(),
            Matcher::alias(PLAIN_OBJECT_MATCHER),
        );
        entries.insert(
            DEFAULT_MATCHER_KEY.to_string(),
            Matcher::Predicate(Arc::clone(&REJECT_ALL)),
        );
        Self {
            entries,
            max_alias_hops: DEFAULT_MAX_ALIAS_HOPS,
        }
    }

    /// The reserved entries plus [`builtin_matchers`].
    pub fn builtin() -> Self {
        Self::empty().with(&builtin_matchers())
    }

    /// A new registry holding this registry's entries overridden by `overrides`.
    pub fn with(&self, overrides: &MatcherSet) -> Self {
        let mut entries = self.entries.clone();
        let unfolded = overrides.unfold();
        debug!(
            "Extending matcher registry of {} entries with {} ({} after unfolding)",
            entries.len(),
            overrides.len(),
            unfolded.len()
        );
        entries.extend(unfolded);
        Self {
            entries,
            max_alias_hops: self.max_alias_hops,
        }
    }

    /// Same entries, different limit on alias chain length.
    pub fn with_max_alias_hops(mut self, max_alias_hops: usize) -> Self {
        self.max_alias_hops = max_alias_hops;
        self
    }

    pub fn max_alias_hops(&self) -> usize {
        self.max_alias_hops
    }

    pub fn get(&self, name: &str) -> Option<&Matcher> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn default_predicate(&self) -> &Predicate {
        match self.entries.get(DEFAULT_MATCHER_KEY) {
            Some(Matcher::Predicate(predicate)) => predicate,
            _ => &*REJECT_ALL,
        }
    }

    /// Follow the alias chain starting at `name` down to a predicate.
    ///
    /// Names without an entry resolve to the default matcher. A chain longer than
    /// [`Self::max_alias_hops`] is treated as a cycle and also falls back to the default
    /// matcher.
    pub fn resolve<'r>(&'r self, name: &'r str) -> Resolution<'r> {
        let mut current = name;
        let mut hops = 0usize;

        loop {
            match self.entries.get(current) {
                Some(Matcher::Predicate(predicate)) => {
                    return Resolution {
                        name: current,
                        predicate,
                    };
                }
                Some(Matcher::Alias(target)) if hops < self.max_alias_hops => {
                    hops += 1;
                    current = target.as_str();
                }
                Some(Matcher::Alias(_)) => {
                    warn!(
                        "Alias chain starting at `{}` exceeds {} hops, stopped at `{}`",
                        name, self.max_alias_hops, current
                    );
                    return Resolution {
                        name: current,
                        predicate: self.default_predicate(),
                    };
                }
                None => {
                    return Resolution {
                        name: current,
                        predicate: self.default_predicate(),
                    };
                }
            }
        }
    }
}
