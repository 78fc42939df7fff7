//! Core types for marshal-json.
//!
//! This module provides foundational types used throughout the crate:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration for observability, decoding and encoding

mod config;
mod errors;

pub use config::{
    Config, DecodeConfig, EncodeConfig, NonFinitePolicy, ObservabilityConfig, DEFAULT_MAX_DEPTH,
};
pub use errors::{Error, Result};
