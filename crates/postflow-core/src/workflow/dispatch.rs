//! Step dispatch: routing a (provider, tool) pair to its adapter.
//!
//! [`ProviderAdapter`] is the port implemented by postflow-infra, one
//! implementation per external tool-providing service. Since the trait uses
//! RPITIT it cannot be a trait object directly; [`BoxProviderAdapter`] wraps
//! it behind the object-safe [`ProviderAdapterDyn`] so adapters can be
//! registered by name in the [`StepDispatcher`] table.
//!
//! Dispatch is a pure routing boundary: no engine state is touched here, and
//! any side effect (actually publishing content, say) belongs to the adapter.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from dispatching a step to a provider.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No adapter is registered under this provider name.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The adapter reported a tool invocation failure.
    #[error("tool '{tool}' on provider '{provider}' failed: {message}")]
    ToolInvocation {
        provider: String,
        tool: String,
        message: String,
    },

    /// The per-step deadline expired before the adapter returned.
    #[error("tool '{tool}' on provider '{provider}' timed out")]
    Timeout { provider: String, tool: String },
}

// ---------------------------------------------------------------------------
// ProviderAdapter port
// ---------------------------------------------------------------------------

/// Adapter for one external tool-providing service.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The engine is
/// agnostic to transport; adapters own retries, authentication, and any
/// timeout beyond the engine's per-step deadline.
pub trait ProviderAdapter: Send + Sync {
    /// The provider name this adapter serves (e.g. "content", "publisher").
    fn name(&self) -> &str;

    /// Invoke a tool with the effective params, returning its JSON payload.
    fn invoke(
        &self,
        tool: &str,
        params: &Map<String, Value>,
    ) -> impl Future<Output = Result<Value, DispatchError>> + Send;
}

// ---------------------------------------------------------------------------
// Object-safe wrapper
// ---------------------------------------------------------------------------

/// Object-safe version of [`ProviderAdapter`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation covers
/// every `ProviderAdapter`.
pub trait ProviderAdapterDyn: Send + Sync {
    fn name(&self) -> &str;

    fn invoke_boxed<'a>(
        &'a self,
        tool: &'a str,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Value, DispatchError>> + Send + 'a>>;
}

impl<T: ProviderAdapter> ProviderAdapterDyn for T {
    fn name(&self) -> &str {
        ProviderAdapter::name(self)
    }

    fn invoke_boxed<'a>(
        &'a self,
        tool: &'a str,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Value, DispatchError>> + Send + 'a>> {
        Box::pin(self.invoke(tool, params))
    }
}

/// Type-erased provider adapter for runtime registration by name.
pub struct BoxProviderAdapter {
    inner: Box<dyn ProviderAdapterDyn>,
}

impl BoxProviderAdapter {
    /// Wrap a concrete adapter in a type-erased box.
    pub fn new<T: ProviderAdapter + 'static>(adapter: T) -> Self {
        Self {
            inner: Box::new(adapter),
        }
    }

    /// The provider name this adapter serves.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Invoke a tool on the wrapped adapter.
    pub async fn invoke(
        &self,
        tool: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, DispatchError> {
        self.inner.invoke_boxed(tool, params).await
    }
}

// ---------------------------------------------------------------------------
// StepDispatcher
// ---------------------------------------------------------------------------

/// Routes a single step to its provider adapter.
///
/// Adapters are selected by provider name from the table supplied at
/// construction time, so new providers can be added without touching the
/// executor.
#[derive(Default)]
pub struct StepDispatcher {
    adapters: HashMap<String, BoxProviderAdapter>,
}

impl StepDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name. Replaces any existing adapter
    /// of the same name.
    pub fn register(&mut self, adapter: BoxProviderAdapter) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    /// Names of all registered providers.
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Route a (provider, tool) invocation to the registered adapter.
    pub async fn dispatch(
        &self,
        provider: &str,
        tool: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, DispatchError> {
        let adapter = self
            .adapters
            .get(provider)
            .ok_or_else(|| DispatchError::UnknownProvider(provider.to_string()))?;

        tracing::debug!(provider, tool, "dispatching step");
        adapter.invoke(tool, params).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
