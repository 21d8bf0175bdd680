//! Image-model registry: strategy-based selection over the model catalog.
//!
//! The image generation provider fronts several upstream model families.
//! Operators rank them by cost, quality, and speed in the catalog config;
//! the registry walks the chosen ranking and picks the first enabled model,
//! then resolves a concrete submodel against the requested aspect ratio.

use std::sync::RwLock;

use postflow_types::model::{
    ImageModelConfig, ModelCatalogConfig, SelectedModel, SelectionStrategy, SubmodelConfig,
};
use serde::Serialize;

// ---------------------------------------------------------------------------
// ModelSummary
// ---------------------------------------------------------------------------

/// Listing row for one model family.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub submodels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    pub api_key_required: bool,
}

// ---------------------------------------------------------------------------
// ImageModelRegistry
// ---------------------------------------------------------------------------

/// Registry over the deserialized model catalog. Enable/disable mutate the
/// in-memory catalog only; the config file is the source of truth across
/// restarts.
pub struct ImageModelRegistry {
    config: RwLock<ModelCatalogConfig>,
}

impl ImageModelRegistry {
    /// Build a registry over a loaded catalog.
    pub fn new(config: ModelCatalogConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// The built-in catalog used when no config file is present.
    pub fn default_catalog() -> ModelCatalogConfig {
        let sd3 = SubmodelConfig {
            name: "Stable Diffusion 3".to_string(),
            model_id: "sd3".to_string(),
            supported_ratios: vec!["1:1".to_string(), "3:4".to_string(), "16:9".to_string()],
        };
        let stability = ImageModelConfig {
            name: "Stability AI".to_string(),
            enabled: true,
            default_model: Some("sd3".to_string()),
            models: std::collections::HashMap::from([("sd3".to_string(), sd3)]),
            cost_estimate: std::collections::HashMap::from([("sd3".to_string(), 0.065)]),
            api_key_required: true,
        };
        ModelCatalogConfig {
            default_model: "stability".to_string(),
            model_selection_strategy: SelectionStrategy::CostFirst,
            cost_ranking: vec!["stability".to_string()],
            quality_ranking: vec!["stability".to_string()],
            speed_ranking: vec!["stability".to_string()],
            fallback_order: vec!["stability".to_string()],
            models: std::collections::HashMap::from([("stability".to_string(), stability)]),
        }
    }

    /// List model families, optionally including disabled ones.
    pub fn list_models(&self, include_disabled: bool) -> Vec<ModelSummary> {
        let config = self.config.read().expect("model catalog lock poisoned");
        let mut rows: Vec<ModelSummary> = config
            .models
            .iter()
            .filter(|(_, m)| m.enabled || include_disabled)
            .map(|(id, m)| {
                let mut submodels: Vec<String> = m.models.keys().cloned().collect();
                submodels.sort_unstable();
                ModelSummary {
                    id: id.clone(),
                    name: m.name.clone(),
                    enabled: m.enabled,
                    submodels,
                    default_model: m.default_model.clone(),
                    api_key_required: m.api_key_required,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows
    }

    /// Fetch one model family's configuration.
    pub fn get_model(&self, id: &str) -> Option<ImageModelConfig> {
        self.config
            .read()
            .expect("model catalog lock poisoned")
            .models
            .get(id)
            .cloned()
    }

    /// Enable or disable a model family. Returns `false` for unknown ids.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let mut config = self.config.write().expect("model catalog lock poisoned");
        match config.models.get_mut(id) {
            Some(model) => {
                model.enabled = enabled;
                tracing::info!(model = id, enabled, "image model availability changed");
                true
            }
            None => false,
        }
    }

    /// Select a model according to strategy, preference, and aspect ratio.
    ///
    /// A preferred model wins when it exists and is enabled. Otherwise the
    /// strategy's ranking is walked for the first enabled model, falling back
    /// to the configured default. Returns `None` only when nothing usable is
    /// enabled.
    pub fn select_model(
        &self,
        strategy: Option<SelectionStrategy>,
        preferred: Option<&str>,
        aspect_ratio: &str,
    ) -> Option<SelectedModel> {
        let config = self.config.read().expect("model catalog lock poisoned");

        if let Some(id) = preferred {
            match config.models.get(id) {
                Some(model) if model.enabled => {
                    tracing::debug!(model = id, "using preferred image model");
                    return Self::resolve_submodel(id, model, aspect_ratio);
                }
                _ => {
                    tracing::warn!(model = id, "preferred image model unavailable or disabled");
                }
            }
        }

        let strategy = strategy.unwrap_or(config.model_selection_strategy);
        let ranking = match strategy {
            SelectionStrategy::CostFirst => &config.cost_ranking,
            SelectionStrategy::QualityFirst => &config.quality_ranking,
            SelectionStrategy::SpeedFirst => &config.speed_ranking,
            SelectionStrategy::Balanced => &config.fallback_order,
        };

        for id in ranking {
            if let Some(model) = config.models.get(id) {
                if model.enabled {
                    tracing::debug!(model = id.as_str(), ?strategy, "selected image model");
                    return Self::resolve_submodel(id, model, aspect_ratio);
                }
            }
        }

        let default_id = config.default_model.clone();
        match config.models.get(&default_id) {
            Some(model) if model.enabled => {
                tracing::debug!(model = default_id.as_str(), "using default image model");
                Self::resolve_submodel(&default_id, model, aspect_ratio)
            }
            _ => {
                tracing::error!("no enabled image model available");
                None
            }
        }
    }

    /// Cost estimate for a submodel of a model family, when configured.
    pub fn estimate_cost(&self, model_id: &str, submodel_id: &str) -> Option<f64> {
        self.config
            .read()
            .expect("model catalog lock poisoned")
            .models
            .get(model_id)
            .and_then(|m| m.cost_estimate.get(submodel_id).copied())
    }

    /// Pick a concrete submodel: the default submodel when it supports the
    /// requested ratio (an empty ratio list means unconstrained), otherwise
    /// the first submodel that does, otherwise the default regardless,
    /// otherwise the first submodel. A family with any submodel always
    /// resolves one.
    fn resolve_submodel(
        model_id: &str,
        model: &ImageModelConfig,
        aspect_ratio: &str,
    ) -> Option<SelectedModel> {
        if model.models.is_empty() {
            tracing::warn!(model = model_id, "image model has no submodels configured");
            return None;
        }

        let supports = |sub: &SubmodelConfig| {
            sub.supported_ratios.is_empty()
                || sub.supported_ratios.iter().any(|r| r == aspect_ratio)
        };

        let mut sorted: Vec<(&str, &SubmodelConfig)> = model
            .models
            .iter()
            .map(|(id, sub)| (id.as_str(), sub))
            .collect();
        sorted.sort_by_key(|(id, _)| *id);

        let default_pick = model
            .default_model
            .as_deref()
            .and_then(|id| model.models.get(id).map(|sub| (id, sub)));

        let picked = default_pick
            .filter(|(_, sub)| supports(sub))
            .or_else(|| sorted.iter().copied().find(|(_, sub)| supports(sub)))
            .or(default_pick)
            .or_else(|| sorted.first().copied())?;

        let (submodel_id, submodel) = picked;
        Some(SelectedModel {
            model_id: model_id.to_string(),
            name: model.name.clone(),
            submodel_id: submodel_id.to_string(),
            submodel: submodel.clone(),
            cost_estimate: model.cost_estimate.get(submodel_id).copied(),
        })
    }
}

impl Default for ImageModelRegistry {
    fn default() -> Self {
        Self::new(Self::default_catalog())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn submodel(name: &str, ratios: &[&str]) -> SubmodelConfig {
        SubmodelConfig {
            name: name.to_string(),
            model_id: name.to_string(),
            supported_ratios: ratios.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn family(
        name: &str,
        enabled: bool,
        default: &str,
        submodels: Vec<(&str, SubmodelConfig)>,
        costs: Vec<(&str, f64)>,
    ) -> ImageModelConfig {
        ImageModelConfig {
            name: name.to_string(),
            enabled,
            default_model: Some(default.to_string()),
            models: submodels
                .into_iter()
                .map(|(id, s)| (id.to_string(), s))
                .collect(),
            cost_estimate: costs.into_iter().map(|(id, c)| (id.to_string(), c)).collect(),
            api_key_required: true,
        }
    }

    fn catalog() -> ModelCatalogConfig {
        ModelCatalogConfig {
            default_model: "stability".to_string(),
            model_selection_strategy: SelectionStrategy::CostFirst,
            cost_ranking: vec!["cheapo".to_string(), "stability".to_string()],
            quality_ranking: vec!["flux".to_string(), "stability".to_string()],
            speed_ranking: vec!["stability".to_string()],
            fallback_order: vec!["stability".to_string(), "flux".to_string()],
            models: [
                (
                    "stability",
                    family(
                        "Stability AI",
                        true,
                        "sd3",
                        vec![
                            ("sd3", submodel("sd3", &["1:1", "3:4"])),
                            ("sd3-wide", submodel("sd3-wide", &["16:9"])),
                        ],
                        vec![("sd3", 0.065), ("sd3-wide", 0.08)],
                    ),
                ),
                (
                    "flux",
                    family(
                        "Flux",
                        true,
                        "flux-pro",
                        vec![("flux-pro", submodel("flux-pro", &[]))],
                        vec![("flux-pro", 0.05)],
                    ),
                ),
                (
                    "cheapo",
                    family("Cheapo", false, "tiny", vec![("tiny", submodel("tiny", &[]))], vec![]),
                ),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        }
    }

    #[test]
    fn test_list_models_hides_disabled_by_default() {
        let registry = ImageModelRegistry::new(catalog());
        let visible = registry.list_models(false);
        let ids: Vec<&str> = visible.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["flux", "stability"]);

        let all = registry.list_models(true);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_cost_first_skips_disabled_leader() {
        let registry = ImageModelRegistry::new(catalog());
        // "cheapo" leads the cost ranking but is disabled
        let pick = registry
            .select_model(Some(SelectionStrategy::CostFirst), None, "3:4")
            .unwrap();
        assert_eq!(pick.model_id, "stability");
        assert_eq!(pick.submodel_id, "sd3");
        assert_eq!(pick.cost_estimate, Some(0.065));
    }

    #[test]
    fn test_quality_first_prefers_ranking_head() {
        let registry = ImageModelRegistry::new(catalog());
        let pick = registry
            .select_model(Some(SelectionStrategy::QualityFirst), None, "3:4")
            .unwrap();
        assert_eq!(pick.model_id, "flux");
    }

    #[test]
    fn test_preferred_model_wins_when_enabled() {
        let registry = ImageModelRegistry::new(catalog());
        let pick = registry
            .select_model(Some(SelectionStrategy::CostFirst), Some("flux"), "3:4")
            .unwrap();
        assert_eq!(pick.model_id, "flux");
    }

    #[test]
    fn test_disabled_preferred_falls_back_to_strategy() {
        let registry = ImageModelRegistry::new(catalog());
        let pick = registry
            .select_model(Some(SelectionStrategy::CostFirst), Some("cheapo"), "3:4")
            .unwrap();
        assert_eq!(pick.model_id, "stability");
    }

    #[test]
    fn test_aspect_ratio_reroutes_submodel() {
        let registry = ImageModelRegistry::new(catalog());
        // The default submodel sd3 does not support 16:9; sd3-wide does
        let pick = registry
            .select_model(Some(SelectionStrategy::SpeedFirst), None, "16:9")
            .unwrap();
        assert_eq!(pick.submodel_id, "sd3-wide");
    }

    #[test]
    fn test_family_without_default_still_resolves() {
        let mut config = catalog();
        // No default submodel, and no submodel supports the requested ratio
        config.models.get_mut("stability").unwrap().default_model = None;
        let registry = ImageModelRegistry::new(config);

        let pick = registry
            .select_model(Some(SelectionStrategy::SpeedFirst), None, "9:16")
            .unwrap();
        assert_eq!(pick.model_id, "stability");
        // Falls back to the first submodel by id
        assert_eq!(pick.submodel_id, "sd3");
    }

    #[test]
    fn test_unsupported_ratio_falls_back_to_default_submodel() {
        let registry = ImageModelRegistry::new(catalog());
        // Nothing in the stability family supports 9:16; the default wins
        let pick = registry
            .select_model(Some(SelectionStrategy::SpeedFirst), None, "9:16")
            .unwrap();
        assert_eq!(pick.submodel_id, "sd3");
    }

    #[test]
    fn test_enable_disable_round_trip() {
        let registry = ImageModelRegistry::new(catalog());
        assert!(registry.set_enabled("cheapo", true));
        let pick = registry
            .select_model(Some(SelectionStrategy::CostFirst), None, "1:1")
            .unwrap();
        assert_eq!(pick.model_id, "cheapo");

        assert!(registry.set_enabled("cheapo", false));
        assert!(!registry.set_enabled("never-heard-of-it", true));
    }

    #[test]
    fn test_nothing_enabled_returns_none() {
        let registry = ImageModelRegistry::new(catalog());
        registry.set_enabled("stability", false);
        registry.set_enabled("flux", false);
        assert!(registry
            .select_model(Some(SelectionStrategy::Balanced), None, "1:1")
            .is_none());
    }

    #[test]
    fn test_estimate_cost_lookup() {
        let registry = ImageModelRegistry::new(catalog());
        assert_eq!(registry.estimate_cost("stability", "sd3"), Some(0.065));
        assert_eq!(registry.estimate_cost("stability", "unknown"), None);
    }

    #[test]
    fn test_default_catalog_is_usable() {
        let registry = ImageModelRegistry::default();
        let pick = registry.select_model(None, None, "3:4").unwrap();
        assert_eq!(pick.model_id, "stability");
    }
}
