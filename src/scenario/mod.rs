//! Declarative layout scenarios.
//!
//! A scenario is a TOML file describing a surface, the regions stacked on it
//! and a list of steps (scrolls, resizes, visibility flips) to apply. The
//! runner plays it against a [`LayoutEngine`](crate::layout::LayoutEngine) the
//! way a host surface controller would and records a [`LayoutReport`] after
//! the initial layout and after every step.
//!
//! ```toml
//! viewport = { width = 500.0, height = 500.0 }
//!
//! [[regions]]
//! label = "header"
//! height = 250.0
//! margins = { bottom = 10.0 }
//!
//! [[regions]]
//! label = "feed"
//! kind = "native_scrollable"
//! height = 2000.0
//!
//! [[steps]]
//! action = "scroll"
//! offset = 500.0
//! ```

pub mod report;
pub mod runner;

pub use report::{LayoutReport, RegionReport, RegionState, Snapshot};
pub use runner::run;

use crate::model::{ContentKind, ContentView, Insets, LayoutError, Size};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario file could not be read.
    #[error("Failed to read scenario at {path}: {source}")]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Scenario file is not valid TOML or does not match the schema.
    #[error("Invalid scenario: {0}")]
    Parse(String),

    /// Two regions share a label, so steps could not address them.
    #[error("Duplicate region label '{0}'")]
    DuplicateLabel(String),

    /// A step names a region that is not registered.
    #[error("Step refers to unknown region '{0}'")]
    UnknownLabel(String),

    /// The engine rejected an operation.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// One region declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionSpec {
    /// Unique label; steps refer to regions by it.
    pub label: String,
    /// Plain (wrapped) or natively scrollable.
    #[serde(default)]
    pub kind: ContentKind,
    /// Intrinsic content height.
    pub height: f64,
    /// Start with the content hidden.
    #[serde(default)]
    pub hidden: bool,
    /// False simulates content with no scrollable ancestor.
    #[serde(default = "default_true")]
    pub attached: bool,
    /// Margin override.
    #[serde(default)]
    pub margins: Option<Insets>,
    /// Padding override.
    #[serde(default)]
    pub padding: Option<Insets>,
    /// Fixed content height used for stacking.
    #[serde(default)]
    pub height_override: Option<f64>,
    /// Label of a background decoration, if any.
    #[serde(default)]
    pub background: Option<String>,
}

impl RegionSpec {
    /// Content descriptor this declaration registers.
    pub fn content(&self) -> ContentView {
        ContentView {
            label: self.label.clone(),
            kind: self.kind,
            size: Size::new(0.0, self.height),
            hidden: self.hidden,
            attached: self.attached,
        }
    }
}

/// A change applied between snapshots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Set the surface scroll offset.
    Scroll {
        /// New vertical offset.
        offset: f64,
    },
    /// Report a new intrinsic height for a region's content.
    Resize {
        /// Region label.
        region: String,
        /// New content height.
        height: f64,
    },
    /// Hide a region's content.
    Hide {
        /// Region label.
        region: String,
    },
    /// Show a region's content.
    Show {
        /// Region label.
        region: String,
    },
    /// Override a region's margins.
    Margins {
        /// Region label.
        region: String,
        /// New margins.
        margins: Insets,
    },
    /// Resize the viewport.
    Viewport {
        /// New viewport width.
        width: f64,
        /// New viewport height.
        height: f64,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scroll { offset } => write!(f, "scroll {offset}"),
            Self::Resize { region, height } => write!(f, "resize {region} {height}"),
            Self::Hide { region } => write!(f, "hide {region}"),
            Self::Show { region } => write!(f, "show {region}"),
            Self::Margins { region, .. } => write!(f, "margins {region}"),
            Self::Viewport { width, height } => write!(f, "viewport {width}x{height}"),
        }
    }
}

/// A parsed scenario file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Surface viewport size.
    pub viewport: Size,
    /// Surface content insets.
    #[serde(default)]
    pub content_insets: Insets,
    /// Register all regions inside one batch.
    #[serde(default = "default_true")]
    pub batch: bool,
    /// Regions in stacking order.
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
    /// Changes applied after the initial layout, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    /// Parse and validate a scenario from TOML text.
    ///
    /// # Errors
    /// Invalid TOML, schema mismatch or duplicate labels.
    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario =
            toml::from_str(contents).map_err(|e| ScenarioError::Parse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read, parse and validate a scenario file.
    ///
    /// # Errors
    /// Read errors in addition to those of [`Scenario::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let mut seen = HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.label.as_str()) {
                return Err(ScenarioError::DuplicateLabel(region.label.clone()));
            }
        }
        Ok(())
    }
}
