//! Shared types and utilities for snapsift services
//!
//! Provides the common error type, TOML/env configuration loading, request
//! validation helpers, and SSE utilities used by the service crates.

pub mod config;
pub mod error;
pub mod sse;
pub mod validate;

pub use error::{Error, Result};
