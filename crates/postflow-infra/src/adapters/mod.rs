//! Provider adapters for the external tool-providing services.
//!
//! One adapter instance per configured service (content generation, image
//! generation, publishing, analytics, scheduling), all sharing the HTTP
//! implementation in [`http`]. `build_dispatcher` assembles the registered
//! table the executor routes through.

use std::collections::HashMap;
use std::time::Duration;

use postflow_core::workflow::dispatch::{BoxProviderAdapter, StepDispatcher};
use secrecy::SecretString;

use crate::config::ProviderConfig;

pub mod http;

use self::http::HttpToolAdapter;

/// Default request timeout for provider calls, below the engine's own
/// per-step deadline so the adapter fails first with a better message.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build a dispatcher with one HTTP adapter per configured service.
///
/// API keys are resolved from the environment variable each service names;
/// a missing variable just means unauthenticated requests, which is fine for
/// local development services.
pub fn build_dispatcher(providers: &HashMap<String, ProviderConfig>) -> StepDispatcher {
    let mut dispatcher = StepDispatcher::new();

    for (name, config) in providers {
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .map(SecretString::from);
        if api_key.is_none() {
            tracing::debug!(provider = name.as_str(), "no API key configured");
        }

        let timeout =
            Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS));
        let adapter = HttpToolAdapter::new(name.clone(), config.base_url.clone(), api_key, timeout);
        dispatcher.register(BoxProviderAdapter::new(adapter));
    }

    tracing::info!(providers = ?dispatcher.provider_names(), "provider adapters registered");
    dispatcher
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
