//! Image-model catalog configuration types.
//!
//! The image generation provider fronts several upstream models; operators
//! rank them by cost, quality, and speed, and the registry picks one per
//! request according to a selection strategy. These types are the serde
//! surface of that catalog file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Selection strategy
// ---------------------------------------------------------------------------

/// How the registry chooses among enabled models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Prefer the cheapest model first.
    #[default]
    CostFirst,
    /// Prefer the highest-quality model first.
    QualityFirst,
    /// Prefer the fastest model first.
    SpeedFirst,
    /// Use the configured fallback order.
    Balanced,
}

impl std::str::FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cost_first" => Ok(SelectionStrategy::CostFirst),
            "quality_first" => Ok(SelectionStrategy::QualityFirst),
            "speed_first" => Ok(SelectionStrategy::SpeedFirst),
            "balanced" => Ok(SelectionStrategy::Balanced),
            other => Err(format!(
                "unknown strategy '{other}' (expected cost_first, quality_first, speed_first, or balanced)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog configuration
// ---------------------------------------------------------------------------

/// The whole image-model catalog as loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalogConfig {
    /// Model used when no ranking produces a hit.
    pub default_model: String,
    /// Strategy applied when the caller does not specify one.
    #[serde(default)]
    pub model_selection_strategy: SelectionStrategy,
    /// Model ids cheapest first.
    #[serde(default)]
    pub cost_ranking: Vec<String>,
    /// Model ids best quality first.
    #[serde(default)]
    pub quality_ranking: Vec<String>,
    /// Model ids fastest first.
    #[serde(default)]
    pub speed_ranking: Vec<String>,
    /// Order tried under the balanced strategy.
    #[serde(default)]
    pub fallback_order: Vec<String>,
    /// All known models keyed by id.
    #[serde(default)]
    pub models: HashMap<String, ImageModelConfig>,
}

/// Configuration for one upstream image model family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageModelConfig {
    /// Display name.
    pub name: String,
    /// Whether this model may be selected.
    #[serde(default)]
    pub enabled: bool,
    /// Default submodel id within `models`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    /// Submodels keyed by id.
    #[serde(default)]
    pub models: HashMap<String, SubmodelConfig>,
    /// Per-submodel cost estimates in USD per image.
    #[serde(default)]
    pub cost_estimate: HashMap<String, f64>,
    /// Whether an API key must be configured before use.
    #[serde(default)]
    pub api_key_required: bool,
}

/// One concrete submodel of a model family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmodelConfig {
    /// Display name.
    pub name: String,
    /// Upstream model identifier sent to the provider.
    pub model_id: String,
    /// Aspect ratios this submodel accepts; empty means unconstrained.
    #[serde(default)]
    pub supported_ratios: Vec<String>,
}

/// A resolved selection: model family plus the chosen submodel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedModel {
    /// Id of the selected model family.
    pub model_id: String,
    /// Display name of the family.
    pub name: String,
    /// Id of the chosen submodel.
    pub submodel_id: String,
    /// The chosen submodel's configuration.
    pub submodel: SubmodelConfig,
    /// Cost estimate for the chosen submodel, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
