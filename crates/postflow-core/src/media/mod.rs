//! Image-model management for the image generation provider.

pub mod registry;
