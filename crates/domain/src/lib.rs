//! # RelayChat Domain
//!
//! Business domain types and models for the RelayChat client.
//!
//! This crate contains:
//! - Gateway request/response records (auth, users directory)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other RelayChat crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
