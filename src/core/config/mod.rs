//! Configuration management for the pipeline.
//!
//! This module provides configuration types, validation traits, and utilities
//! for loading pipeline configuration from JSON.

pub mod errors;
pub mod parallel;
pub mod pipeline;

pub use errors::{ConfigError, ConfigValidator};
pub use parallel::ParallelPolicy;
pub use pipeline::PipelineConfig;
