//! Execution context: the mutable parameter bag threaded across steps.
//!
//! Seeded from the caller's initial params, updated after each successful
//! step with the keys of that step's payload (when the payload is a JSON
//! object). A step observes only values written by itself or earlier steps
//! in the same run; concurrent runs never share a context.

use serde_json::{Map, Value, json};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum serialized size of a single context value (1 MB). Larger values
/// are replaced by a truncation marker instead of failing the run.
pub const MAX_VALUE_SIZE: usize = 1_048_576;

/// Maximum total serialized size of all context values (10 MB). Values that
/// would push the total past this cap are likewise replaced by a truncation
/// marker instead of failing the run.
pub const MAX_CONTEXT_SIZE: usize = 10_485_760;

// ---------------------------------------------------------------------------
// ExecutionContext
// ---------------------------------------------------------------------------

/// The mutable parameter mapping for one run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    values: Map<String, Value>,
}

impl ExecutionContext {
    /// Seed a context from the caller's initial params.
    pub fn new(initial: Map<String, Value>) -> Self {
        Self { values: initial }
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Read a value as a boolean flag. `None` when absent or not a boolean.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    /// Build the effective params for a step: static params merged with the
    /// context, where context values override same-named static params
    /// (context is considered more current).
    pub fn effective_params(&self, static_params: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = static_params.clone();
        for (key, value) in &self.values {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Merge a successful step's payload into the context.
    ///
    /// Only object payloads contribute keys; scalar and array payloads are
    /// recorded in the step result but do not update the context. A value
    /// over `MAX_VALUE_SIZE`, or one that would push the total past
    /// `MAX_CONTEXT_SIZE`, is replaced by a truncation marker so one giant
    /// payload cannot balloon every later step's params or the context as a
    /// whole.
    pub fn merge_payload(&mut self, step_name: &str, payload: &Value) {
        let Some(object) = payload.as_object() else {
            tracing::debug!(step = step_name, "non-object payload, context unchanged");
            return;
        };

        for (key, value) in object {
            let size = serde_json::to_string(value).map(|s| s.len()).unwrap_or(0);
            if size > MAX_VALUE_SIZE {
                tracing::warn!(
                    step = step_name,
                    key = key.as_str(),
                    size,
                    max = MAX_VALUE_SIZE,
                    "context value exceeds size limit, truncating"
                );
                self.values.insert(
                    key.clone(),
                    json!({
                        "_truncated": true,
                        "_original_size": size,
                    }),
                );
                continue;
            }

            // Replacing an existing value frees its share of the total first
            let replaced = self
                .values
                .get(key)
                .map(|v| serde_json::to_string(v).map(|s| s.len()).unwrap_or(0))
                .unwrap_or(0);
            if self.total_size() - replaced + size > MAX_CONTEXT_SIZE {
                tracing::warn!(
                    step = step_name,
                    key = key.as_str(),
                    size,
                    total = self.total_size(),
                    max = MAX_CONTEXT_SIZE,
                    "total context size limit reached, truncating value"
                );
                self.values.insert(
                    key.clone(),
                    json!({
                        "_truncated": true,
                        "_original_size": size,
                    }),
                );
            } else {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }

    /// Total serialized size of all context values in bytes.
    pub fn total_size(&self) -> usize {
        self.values
            .values()
            .map(|v| serde_json::to_string(v).map(|s| s.len()).unwrap_or(0))
            .sum()
    }

    /// Number of values currently in the context.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> ExecutionContext {
        let mut initial = Map::new();
        initial.insert("topic".to_string(), json!("city gardens"));
        initial.insert("user_confirmed".to_string(), json!(true));
        ExecutionContext::new(initial)
    }

    #[test]
    fn test_seed_and_get() {
        let ctx = seeded();
        assert_eq!(ctx.get("topic"), Some(&json!("city gardens")));
        assert_eq!(ctx.get("missing"), None);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_flag_coercion() {
        let ctx = seeded();
        assert_eq!(ctx.flag("user_confirmed"), Some(true));
        // Non-boolean values are not flags
        assert_eq!(ctx.flag("topic"), None);
        assert_eq!(ctx.flag("missing"), None);
    }

    // -----------------------------------------------------------------------
    // Effective params: context overrides static
    // -----------------------------------------------------------------------

    #[test]
    fn test_effective_params_context_wins() {
        let ctx = seeded();
        let mut static_params = Map::new();
        static_params.insert("topic".to_string(), json!("default topic"));
        static_params.insert("style".to_string(), json!("casual"));

        let merged = ctx.effective_params(&static_params);
        assert_eq!(merged["topic"], json!("city gardens"));
        assert_eq!(merged["style"], json!("casual"));
        assert_eq!(merged["user_confirmed"], json!(true));
    }

    // -----------------------------------------------------------------------
    // Payload merging
    // -----------------------------------------------------------------------

    #[test]
    fn test_merge_object_payload() {
        let mut ctx = seeded();
        ctx.merge_payload("draft", &json!({"title": "Ten rooftop gardens", "x": 5}));
        assert_eq!(ctx.get("title"), Some(&json!("Ten rooftop gardens")));
        assert_eq!(ctx.get("x"), Some(&json!(5)));
    }

    #[test]
    fn test_merge_ignores_non_object_payload() {
        let mut ctx = seeded();
        ctx.merge_payload("draft", &json!("just a string"));
        ctx.merge_payload("draft", &json!([1, 2, 3]));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_merge_overwrites_earlier_value() {
        let mut ctx = seeded();
        ctx.merge_payload("refine", &json!({"topic": "balcony gardens"}));
        assert_eq!(ctx.get("topic"), Some(&json!("balcony gardens")));
    }

    #[test]
    fn test_oversized_value_is_truncated() {
        let mut ctx = ExecutionContext::default();
        let big = "x".repeat(MAX_VALUE_SIZE + 100);
        ctx.merge_payload("bulk", &json!({ "blob": big }));

        let stored = ctx.get("blob").unwrap();
        assert_eq!(stored["_truncated"], json!(true));
    }

    #[test]
    fn test_total_size_tracks_values() {
        let mut ctx = ExecutionContext::default();
        assert_eq!(ctx.total_size(), 0);

        ctx.merge_payload("draft", &json!({ "title": "abc" }));
        // "abc" serializes with its quotes
        assert_eq!(ctx.total_size(), 5);
    }

    #[test]
    fn test_total_cap_truncates_overflowing_value() {
        let mut ctx = ExecutionContext::default();
        // Each chunk passes the per-value cap; eleven of them exceed the
        // 10 MB total
        let chunk = "x".repeat(MAX_VALUE_SIZE - 1000);
        for i in 0..11 {
            let mut payload = Map::new();
            payload.insert(format!("part{i}"), json!(chunk.clone()));
            ctx.merge_payload("bulk", &Value::Object(payload));
        }

        // Earlier values survive intact
        assert_eq!(ctx.get("part0").unwrap(), &json!(chunk));
        // The value that would cross the total cap became a marker
        let last = ctx.get("part10").unwrap();
        assert_eq!(last["_truncated"], json!(true));
        assert!(ctx.total_size() <= MAX_CONTEXT_SIZE);
    }
}
