//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod error;
pub mod i18n;
pub mod validation;
