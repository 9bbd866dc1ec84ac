//! Companion integrations
//!
//! Each companion is an independent capability: it names the module identities it ships under,
//! the methods that carry its hard-coded date formats, and how to make its display pick up a
//! freshly installed patch.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatchError;
use crate::hook::TargetDescriptor;
use crate::host::DisplayHost;

/// What a refresh step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The live instance was found and refreshed
    Refreshed,
    /// No live instance exists; nothing to do
    Skipped,
}

/// Optional component whose date displays are patched when it is present
pub trait CompanionIntegration {
    /// Human-readable name, used in logs and reports
    fn name(&self) -> &str;
    /// Module identities the companion is published under. Present if any is enabled.
    fn module_ids(&self) -> &[u64];
    /// Methods to patch
    fn targets(&self) -> &[TargetDescriptor];
    /// Makes the companion's live display re-render with the patched methods
    fn refresh(&self, host: &mut dyn DisplayHost) -> Result<RefreshOutcome, PatchError>;
}

/// How to make a companion re-render its date after patching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefreshAction {
    /// Find the live object of `type_name` and call `method` on it
    InvokeOnInstance {
        /// Type of the live object
        type_name: String,
        /// Method to call
        method: String,
    },
    /// Read the static `property` of `type_name` and call `method` on the value
    InvokeOnSingleton {
        /// Type declaring the singleton property
        type_name: String,
        /// Static property holding the instance
        property: String,
        /// Method to call
        method: String,
    },
}
impl RefreshAction {
    /// Runs the action. A missing instance is skipped, not an error.
    pub fn run(&self, host: &mut dyn DisplayHost) -> Result<RefreshOutcome, PatchError> {
        let (instance, method) = match self {
            Self::InvokeOnInstance { type_name, method } => {
                (host.find_instance(type_name), method)
            }
            Self::InvokeOnSingleton {
                type_name,
                property,
                method,
            } => (host.singleton(type_name, property), method),
        };
        let Some(instance) = instance else {
            debug!(action = %self, "no live instance, skipping refresh");
            return Ok(RefreshOutcome::Skipped);
        };
        host.invoke(&instance, method)
            .map_err(|source| PatchError::RefreshFailure {
                what: self.to_string(),
                source,
            })?;
        Ok(RefreshOutcome::Refreshed)
    }
}
impl std::fmt::Display for RefreshAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvokeOnInstance { type_name, method } => write!(f, "{type_name}.{method}"),
            Self::InvokeOnSingleton {
                type_name,
                property,
                method,
            } => write!(f, "{type_name}.{property}.{method}"),
        }
    }
}

/// Companion described by inventory data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionSpec {
    /// Human-readable name
    pub name: String,
    /// Module identities, one per published variant
    pub module_ids: Vec<u64>,
    /// Methods to patch
    #[serde(default)]
    pub targets: Vec<TargetDescriptor>,
    /// Refresh steps, run in order
    #[serde(default)]
    pub refresh: Vec<RefreshAction>,
}
impl CompanionIntegration for CompanionSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_ids(&self) -> &[u64] {
        &self.module_ids
    }

    fn targets(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    /// Runs every refresh action; the first failure stops the rest
    fn refresh(&self, host: &mut dyn DisplayHost) -> Result<RefreshOutcome, PatchError> {
        let mut outcome = RefreshOutcome::Skipped;
        for action in &self.refresh {
            if action.run(host)? == RefreshOutcome::Refreshed {
                outcome = RefreshOutcome::Refreshed;
            }
        }
        Ok(outcome)
    }
}
