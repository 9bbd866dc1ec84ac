//! # Companion
//!
//! Optional components installed alongside the host. Their presence is discovered from the
//! host's module registry on every pass; when present, their own date displays are patched too.

pub mod integration;

use tracing::debug;

pub use integration::{CompanionIntegration, CompanionSpec, RefreshAction, RefreshOutcome};

/// One entry of the host's module registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Stable published identity
    pub id: u64,
    /// Whether the user has the module enabled
    pub enabled: bool,
    /// Ships with the host
    pub builtin: bool,
    /// Camera script rather than a code module
    pub camera_script: bool,
}
impl ModuleInfo {
    /// Enabled user module
    pub fn enabled(id: u64) -> Self {
        Self {
            id,
            enabled: true,
            builtin: false,
            camera_script: false,
        }
    }
    /// Disabled user module
    pub fn disabled(id: u64) -> Self {
        Self {
            enabled: false,
            ..Self::enabled(id)
        }
    }
    /// Whether this entry can be a companion at all
    fn is_candidate(&self) -> bool {
        !self.builtin && !self.camera_script
    }
}

/// The host's registry of installed modules. Read only.
pub trait ModuleRegistry {
    /// Every installed module
    fn modules(&self) -> Vec<ModuleInfo>;
}

/// Returns whether the module with identity `id` is installed and enabled.
///
/// Built-in entries and camera scripts are never considered. An empty registry reports every
/// module as absent.
pub fn is_mod_enabled<R: ModuleRegistry + ?Sized>(registry: &R, id: u64) -> bool {
    registry
        .modules()
        .into_iter()
        .filter(ModuleInfo::is_candidate)
        .find(|m| m.id == id)
        .map_or(false, |m| m.enabled)
}

/// Presence of a single companion, computed fresh from the registry
#[derive(Clone, Copy)]
pub struct Presence<'a> {
    /// The companion
    pub companion: &'a dyn CompanionIntegration,
    /// Whether any of its module identities is enabled
    pub present: bool,
}

/// Computes presence flags for `companions`. Pure query.
pub fn discover<'a, R: ModuleRegistry + ?Sized>(
    registry: &R,
    companions: &'a [Box<dyn CompanionIntegration>],
) -> Vec<Presence<'a>> {
    let modules: Vec<_> = registry
        .modules()
        .into_iter()
        .filter(ModuleInfo::is_candidate)
        .collect();
    companions
        .iter()
        .map(|companion| {
            let present = companion.module_ids().iter().any(|id| {
                modules
                    .iter()
                    .find(|m| m.id == *id)
                    .map_or(false, |m| m.enabled)
            });
            debug!(companion = companion.name(), present, "companion discovery");
            Presence {
                companion: companion.as_ref(),
                present,
            }
        })
        .collect()
}
