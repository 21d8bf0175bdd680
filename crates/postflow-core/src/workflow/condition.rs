//! Condition evaluation for gated steps.
//!
//! A condition names a boolean flag in the execution context. Registered
//! predicates are consulted first so callers can install richer checks
//! without the engine growing an expression grammar.

use std::collections::HashMap;
use std::sync::Arc;

use super::context::ExecutionContext;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A condition that could not be evaluated. Never propagated out of the
/// engine: the executor resolves it as `false` with a logged warning so a
/// bad step definition cannot take down the run.
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    #[error("empty condition name")]
    EmptyName,
}

// ---------------------------------------------------------------------------
// ConditionEvaluator
// ---------------------------------------------------------------------------

/// A named predicate over the execution context.
pub type Predicate = Arc<dyn Fn(&ExecutionContext) -> bool + Send + Sync>;

/// Decides whether a conditional step executes.
///
/// Baseline rule: the condition names a key in the context and the result is
/// that value coerced to boolean, defaulting to `false` when the key is
/// absent or not a boolean. `register` installs named predicates that take
/// precedence over flag lookup.
#[derive(Default)]
pub struct ConditionEvaluator {
    predicates: HashMap<String, Predicate>,
}

impl ConditionEvaluator {
    /// Create an evaluator with no registered predicates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named predicate. Replaces any existing predicate of the
    /// same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&ExecutionContext) -> bool + Send + Sync + 'static,
    ) {
        self.predicates.insert(name.into(), Arc::new(predicate));
    }

    /// Evaluate a condition against the context, resolving malformed
    /// conditions as `false` with a logged warning.
    pub fn evaluate(&self, condition: &str, ctx: &ExecutionContext) -> bool {
        match self.try_evaluate(condition, ctx) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(condition, error = %err, "condition resolved as false");
                false
            }
        }
    }

    fn try_evaluate(
        &self,
        condition: &str,
        ctx: &ExecutionContext,
    ) -> Result<bool, ConditionError> {
        let name = condition.trim();
        if name.is_empty() {
            return Err(ConditionError::EmptyName);
        }

        if let Some(predicate) = self.predicates.get(name) {
            return Ok(predicate(ctx));
        }

        Ok(ctx.flag(name).unwrap_or(false))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
