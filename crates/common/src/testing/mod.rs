//! Testing utilities and helpers
//!
//! - **[`mocks`]**: failure-injecting implementations of the storage seam
//!
//! Shared with downstream crates' tests.

pub mod mocks;

pub use mocks::{MockStorage, StorageOp};
