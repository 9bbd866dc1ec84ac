//! # Error
//!
//! Error taxonomy for resolving, installing and refreshing patches

use thiserror::Error;

use crate::hook::TargetDescriptor;

/// Errors raised by a host seam (method table, display host)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);
impl HostError {
    /// Creates a host error from any message
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error reading the config file
    #[error("Error reading config file: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing the config file
    #[error("Error parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Config parsed but is not usable
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur while patching
#[derive(Debug, Error)]
pub enum PatchError {
    /// The runtime patch framework is not present in the host
    #[error("Missing dependency: {0}")]
    MissingDependency(String),
    /// A descriptor did not resolve against the live host image
    #[error("Unable to find original method {target}")]
    TargetNotFound {
        /// Descriptor that failed to resolve
        target: TargetDescriptor,
    },
    /// The host refused to install the hook
    #[error("Unable to patch {target}: {source}")]
    ApplyFailure {
        /// Descriptor whose hook failed to install
        target: TargetDescriptor,
        /// Underlying host error
        source: HostError,
    },
    /// A post-patch display refresh failed
    #[error("Unable to refresh {what}: {source}")]
    RefreshFailure {
        /// Description of the refresh step
        what: String,
        /// Underlying host error
        source: HostError,
    },
    /// Configuration could not be loaded
    #[error("{0}")]
    Config(#[from] ConfigError),
}
impl PatchError {
    /// Returns the descriptor this error is attached to, if any
    pub fn target(&self) -> Option<&TargetDescriptor> {
        match self {
            Self::TargetNotFound { target } | Self::ApplyFailure { target, .. } => Some(target),
            _ => None,
        }
    }
}
