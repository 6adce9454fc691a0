//! Guard entry point
//!
//! [`Guard`] is the boundary between callers and the matching engine: it adapts the call
//! values, resolves them against the schemas, follows the arguments-object marker and hands
//! any failure reason to its [`Assertion`] strategy. The engine itself never raises a
//! validation failure.
use std::{fmt, sync::Arc};

use log::{debug, warn};

use crate::{
    call::CallView,
    config::GuardConfig,
    error::{GuardError, GuardResult},
    magic::ARGUMENTS_OBJECT_KEY,
    matching::{MatchResult, ParsedArgs, resolve_schemas},
    registry::{MatcherRegistry, MatcherSet},
    schema::Schemas,
    value::Value,
};

/// What the guard does with a validation failure.
///
/// Returning `Ok(())` lets the guard carry on with the partially parsed arguments.
pub trait Assertion: Send + Sync {
    fn fail(&self, reason: &str) -> GuardResult<()>;
}

impl<F> Assertion for F
where
    F: Fn(&str) -> GuardResult<()> + Send + Sync,
{
    fn fail(&self, reason: &str) -> GuardResult<()> {
        self(reason)
    }
}

/// Raise the reason as [`GuardError::Validation`]. The default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaiseAssertion;

impl Assertion for RaiseAssertion {
    fn fail(&self, reason: &str) -> GuardResult<()> {
        Err(GuardError::Validation {
            reason: reason.to_string(),
        })
    }
}

/// Log the reason with `warn!` and continue.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAssertion;

impl Assertion for LogAssertion {
    fn fail(&self, reason: &str) -> GuardResult<()> {
        warn!("Argument validation failed: {}", reason);
        Ok(())
    }
}

/// Validates call values against schemas using a matcher registry.
///
/// Guards are cheap to clone; the registry is shared and never mutated once built.
#[derive(Clone)]
pub struct Guard {
    registry: Arc<MatcherRegistry>,
    assertion: Arc<dyn Assertion>,
    strict: bool,
}

impl Default for Guard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("matchers", &self.registry.len())
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl Guard {
    /// A guard over the builtin matchers, raising on failure, non-strict by default.
    pub fn new() -> Self {
        Self::from_registry(MatcherRegistry::builtin())
    }

    pub fn from_registry(registry: MatcherRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            assertion: Arc::new(RaiseAssertion),
            strict: false,
        }
    }

    /// Build a guard from a loaded configuration: builtin matchers extended with the
    /// configured aliases, the configured hop limit, strictness and failure strategy.
    pub fn from_config(config: &GuardConfig) -> Self {
        let registry = MatcherRegistry::builtin()
            .with(&config.matcher_set())
            .with_max_alias_hops(config.max_alias_hops);

        let guard = Self::from_registry(registry).strict(config.strict);
        if config.soft_fail {
            guard.with_assertion(LogAssertion)
        } else {
            guard
        }
    }

    /// A new guard whose registry is this one's extended with `matchers`. `self` is left
    /// untouched; the assertion strategy and strictness carry over.
    pub fn with(&self, matchers: &MatcherSet) -> Self {
        Self {
            registry: Arc::new(self.registry.with(matchers)),
            assertion: Arc::clone(&self.assertion),
            strict: self.strict,
        }
    }

    /// Set the strictness used by [`Guard::check`].
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn with_assertion(mut self, assertion: impl Assertion + 'static) -> Self {
        self.assertion = Arc::new(assertion);
        self
    }

    /// Replace the assertion strategy, returning the previous one so it can be restored.
    pub fn set_assertion(&mut self, assertion: Arc<dyn Assertion>) -> Arc<dyn Assertion> {
        std::mem::replace(&mut self.assertion, assertion)
    }

    pub fn assertion(&self) -> &Arc<dyn Assertion> {
        &self.assertion
    }

    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    /// Validate `values` and return the parsed arguments, using the guard's strictness.
    pub fn check(&self, values: &Value, schemas: &Schemas) -> GuardResult<ParsedArgs> {
        self.run(values, schemas, self.strict)
    }

    /// Like [`Guard::check`] but always strict.
    pub fn check_strict(&self, values: &Value, schemas: &Schemas) -> GuardResult<ParsedArgs> {
        self.run(values, schemas, true)
    }

    /// Resolve `values` against `schemas` without involving the assertion strategy.
    ///
    /// Usage errors are still returned as errors. When the picked result carries the
    /// arguments-object marker, its value is validated again as call values of its own
    /// against the same schemas, whatever the first outcome was.
    pub fn validate(
        &self,
        values: &Value,
        schemas: &Schemas,
        strict: bool,
    ) -> GuardResult<MatchResult> {
        let call = CallView::adapt(values)?;
        let mut result = resolve_schemas(&self.registry, schemas, &call, strict)?;

        match result.parsed.shift_remove(ARGUMENTS_OBJECT_KEY) {
            Some(nested) => {
                debug!(
                    "Arguments object found in {} call values, validating its fields",
                    call.shape()
                );
                self.validate(&nested, schemas, strict)
            }
            None => Ok(result),
        }
    }

    fn run(&self, values: &Value, schemas: &Schemas, strict: bool) -> GuardResult<ParsedArgs> {
        let result = self.validate(values, schemas, strict)?;
        if let Some(reason) = &result.fail {
            self.assertion.fail(reason)?;
        }
        Ok(result.parsed)
    }
}
