//! Transient UI notices
//!
//! - **[`header_alert`]**: the error/success banner shown above the views

pub mod header_alert;

pub use header_alert::{AlertKind, HeaderAlert, HeaderAlertStore};
