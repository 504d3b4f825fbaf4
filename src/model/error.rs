//! Error types for scrollstack.
//!
//! This module defines the error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the binary, wrapping all domain failures
//!   - [`LayoutError`] - Registration/mutation failures reported by the engine
//!     - [`ConfigurationError`] - A region that cannot take part in the stack
//!   - [`crate::config::ConfigError`] - Config file read/parse failures
//!   - [`crate::logging::LoggingError`] - Tracing subscriber setup failures
//!   - [`crate::scenario::ScenarioError`] - Scenario file failures
//!
//! # Recovery Strategy
//!
//! Layout errors are returned to the immediate caller at registration or
//! mutation time and never raised mid-pass: a partially applied pass would
//! leave the geometry cache inconsistent. A region that fails registration is
//! simply absent from the stack; the remaining regions lay out normally.
//!
//! Degenerate geometry (negative remaining heights, collapsed regions) is not
//! an error. It is clamped to zero inside the engine.

use super::geometry::Insets;
use super::identifiers::RegionId;
use thiserror::Error;

/// Top-level application error.
///
/// All domain-specific error types convert into `AppError` via `From`,
/// so the binary can propagate with `?`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Scenario could not be loaded or replayed.
    #[error("Scenario error: {0}")]
    Scenario(#[from] crate::scenario::ScenarioError),

    /// Output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors returned by `LayoutEngine` mutation and registration calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// The handle does not refer to a region registered with this engine.
    #[error("Unknown region: {0}")]
    UnknownRegion(RegionId),

    /// An insertion or move index is past the end of the region list.
    #[error("Index {index} out of bounds (len: {len})")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Current number of regions.
        len: usize,
    },

    /// The region cannot be placed in the stack as configured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// A region cannot be constructed with the supplied content/options.
///
/// The caller must retry with corrected input, e.g. after attaching the
/// content to a scrollable ancestor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Wrapped content has no containing scrollable ancestor to resolve
    /// coordinates against.
    #[error("Content '{label}' has no containing scrollable ancestor")]
    NoScrollAncestor {
        /// Label of the offending content.
        label: String,
    },

    /// A height override must be a finite, non-negative number.
    #[error("Invalid height override {value} for '{label}'")]
    InvalidHeightOverride {
        /// Label of the offending content.
        label: String,
        /// Rejected value.
        value: f64,
    },

    /// Margins and padding must have finite, non-negative edges.
    #[error("Invalid {what} {insets:?} for {target}")]
    InvalidInsets {
        /// `"margins"` or `"padding"`.
        what: &'static str,
        /// The region label, or `"defaults"`.
        target: String,
        /// Rejected insets.
        insets: Insets,
    },
}
