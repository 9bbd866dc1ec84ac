//! # Engine
//!
//! Orchestrates a full patch pass: verify the patch framework, patch every mandatory target,
//! discover and patch companions, then refresh displays so the new format shows immediately.
//!
//! Mandatory targets are all-or-nothing for the outcome of a pass. Hooks installed before a
//! failing mandatory target stay installed until [`Engine::remove_patches`]. Companion failures
//! are recorded in the [`PassReport`] and never affect the outcome.

use tracing::{error, info, warn};

use crate::companion::{self, CompanionIntegration, RefreshOutcome};
use crate::config::{EngineConfig, FormatSource};
use crate::error::PatchError;
use crate::hook::{MethodHandle, MethodTable};
use crate::host::{DisplayHost, Host};
use crate::patcher::PatchRegistry;
use crate::transpiler::date::DateFormatTranspiler;
use crate::transpiler::Transpiler;

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No pass has succeeded since creation or the last removal
    Unpatched,
    /// Checking for the runtime patch framework
    Verifying,
    /// Patching mandatory targets
    PatchingMandatory,
    /// Reading companion presence from the module registry
    DiscoveringCompanions,
    /// Patching present companions
    PatchingCompanions,
    /// Refreshing displays
    RefreshingDisplays,
    /// A pass completed
    Patched,
    /// The last pass failed
    Failed,
}

/// What happened to one companion during a pass
#[derive(Debug)]
pub enum CompanionStatus {
    /// None of the companion's modules is enabled; nothing was attempted
    Absent,
    /// Every target of the companion was patched
    Patched {
        /// Patched methods
        methods: Vec<MethodHandle>,
        /// Result of the refresh, `None` if it failed
        refresh: Option<RefreshOutcome>,
    },
    /// Some targets were patched and some failed
    Partial {
        /// Patched methods
        methods: Vec<MethodHandle>,
        /// One error per target that could not be patched
        failures: Vec<PatchError>,
        /// Result of the refresh, `None` if it failed
        refresh: Option<RefreshOutcome>,
    },
    /// No target could be patched
    Failed(Vec<PatchError>),
}

/// Per-companion entry of a [`PassReport`]
#[derive(Debug)]
pub struct CompanionOutcome {
    /// Companion name
    pub name: String,
    /// What happened
    pub status: CompanionStatus,
}

/// Summary of a successful pass
#[derive(Debug, Default)]
pub struct PassReport {
    /// Mandatory methods, in patch order
    pub mandatory: Vec<MethodHandle>,
    /// One entry per known companion
    pub companions: Vec<CompanionOutcome>,
    /// Non-fatal refresh failures
    pub refresh_failures: Vec<PatchError>,
}
impl PassReport {
    /// Names of companions that were patched
    pub fn patched_companions(&self) -> Vec<&str> {
        self.companions
            .iter()
            .filter(|c| {
                matches!(
                    c.status,
                    CompanionStatus::Patched { .. } | CompanionStatus::Partial { .. }
                )
            })
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Owns the host, the format source and everything installed into the host
pub struct Engine<H: Host, F: FormatSource> {
    /// The host being patched
    host: H,
    /// Supplies the replacement format
    format: F,
    /// Registry identity and inventory
    config: EngineConfig,
    /// Known companions
    companions: Vec<Box<dyn CompanionIntegration>>,
    /// Hooks installed by this engine
    registry: PatchRegistry,
    /// Lifecycle state
    state: EngineState,
}
impl<H: Host, F: FormatSource> Engine<H, F> {
    /// Creates an engine with the built-in configuration
    pub fn new(host: H, format: F) -> Self {
        Self::with_config(host, format, EngineConfig::default())
    }

    /// Creates an engine with `config`
    pub fn with_config(host: H, format: F, config: EngineConfig) -> Self {
        let companions = config.inventory.integrations();
        let registry = PatchRegistry::new(config.registry_id.clone());
        Self {
            host,
            format,
            config,
            companions,
            registry,
            state: EngineState::Unpatched,
        }
    }

    /// Adds a companion integration beyond those in the inventory
    pub fn with_companion(mut self, companion: Box<dyn CompanionIntegration>) -> Self {
        self.companions.push(companion);
        self
    }

    /// Lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }
    /// Hooks installed by this engine
    pub fn registry(&self) -> &PatchRegistry {
        &self.registry
    }
    /// Configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
    /// The host
    pub fn host(&self) -> &H {
        &self.host
    }
    /// The host, mutably
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
    /// The format source
    pub fn format_source(&self) -> &F {
        &self.format
    }
    /// The format source, mutably. Changes take effect on the next pass.
    pub fn format_source_mut(&mut self) -> &mut F {
        &mut self.format
    }

    /// Runs a full pass and reports success
    pub fn create_patches(&mut self) -> bool {
        match self.try_create_patches() {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "unable to create patches");
                false
            }
        }
    }

    /// Runs a full pass.
    ///
    /// Fails with [`PatchError::MissingDependency`] before touching anything if the patch
    /// framework is absent, or with the first mandatory target's error.
    pub fn try_create_patches(&mut self) -> Result<PassReport, PatchError> {
        self.state = EngineState::Verifying;
        if !self.host.patch_framework_present() {
            self.state = EngineState::Failed;
            return Err(PatchError::MissingDependency(
                "the runtime patch framework is not loaded".into(),
            ));
        }

        // read once per pass, so a reapply picks up a changed format
        let format = self.format.date_format();
        let transpiler = DateFormatTranspiler::new(format.as_str());
        let mut report = PassReport::default();

        self.state = EngineState::PatchingMandatory;
        for target in &self.config.inventory.mandatory {
            match self.registry.patch_target(&mut self.host, target, &transpiler) {
                Ok(method) => report.mandatory.push(method),
                Err(e) => {
                    self.state = EngineState::Failed;
                    return Err(e);
                }
            }
        }

        self.state = EngineState::DiscoveringCompanions;
        let presence = companion::discover(&self.host, &self.companions);

        self.state = EngineState::PatchingCompanions;
        let mut patched = Vec::new();
        for p in presence {
            let name = p.companion.name().to_owned();
            let status = if !p.present {
                CompanionStatus::Absent
            } else {
                let (methods, failures) =
                    patch_companion(&mut self.registry, &mut self.host, p.companion, &transpiler);
                for e in &failures {
                    warn!(companion = %name, error = %e, "unable to patch companion target");
                }
                if failures.is_empty() {
                    info!(companion = %name, count = methods.len(), "patched companion");
                    patched.push((p.companion, report.companions.len()));
                    CompanionStatus::Patched {
                        methods,
                        refresh: None,
                    }
                } else if !methods.is_empty() {
                    info!(
                        companion = %name,
                        count = methods.len(),
                        failed = failures.len(),
                        "partially patched companion"
                    );
                    patched.push((p.companion, report.companions.len()));
                    CompanionStatus::Partial {
                        methods,
                        failures,
                        refresh: None,
                    }
                } else {
                    CompanionStatus::Failed(failures)
                }
            };
            report.companions.push(CompanionOutcome { name, status });
        }

        self.state = EngineState::RefreshingDisplays;
        if let Err(source) = self.host.invalidate_date_display() {
            let e = PatchError::RefreshFailure {
                what: "main date display".into(),
                source,
            };
            warn!(error = %e, "unable to refresh");
            report.refresh_failures.push(e);
        }
        for (companion, idx) in patched {
            match companion.refresh(&mut self.host as &mut dyn DisplayHost) {
                Ok(outcome) => {
                    match &mut report.companions[idx].status {
                        CompanionStatus::Patched { refresh, .. }
                        | CompanionStatus::Partial { refresh, .. } => *refresh = Some(outcome),
                        _ => {}
                    }
                }
                Err(e) => {
                    warn!(companion = companion.name(), error = %e, "unable to refresh");
                    report.refresh_failures.push(e);
                }
            }
        }

        self.state = EngineState::Patched;
        info!(
            owner = self.registry.owner(),
            format = %format,
            mandatory = report.mandatory.len(),
            companions = ?report.patched_companions(),
            "patches created"
        );
        Ok(report)
    }

    /// Removes every hook this engine installed and returns to [`EngineState::Unpatched`].
    ///
    /// Without the patch framework nothing can be uninstalled; the records are dropped anyway so
    /// a later pass starts from what the host reports as installed.
    pub fn remove_patches(&mut self) {
        if self.host.patch_framework_present() {
            self.registry.remove_all(&mut self.host);
        } else {
            warn!(owner = self.registry.owner(), "patch framework absent, forgetting records");
            self.registry.forget();
        }
        self.state = EngineState::Unpatched;
    }

    /// Removes and recreates all patches, picking up the current format.
    ///
    /// Does nothing unless the engine is [`EngineState::Patched`]. Returns whether a pass ran
    /// and succeeded.
    pub fn reapply_patches(&mut self) -> bool {
        if self.state != EngineState::Patched {
            return false;
        }
        self.remove_patches();
        self.create_patches()
    }

    /// Whether the module with identity `id` is installed and enabled in the host
    pub fn is_mod_enabled(&self, id: u64) -> bool {
        companion::is_mod_enabled(&self.host, id)
    }
}

/// Attempts every target of `companion`, returning the patched methods and the failures
fn patch_companion<T: MethodTable + ?Sized>(
    registry: &mut PatchRegistry,
    table: &mut T,
    companion: &dyn CompanionIntegration,
    transpiler: &dyn Transpiler,
) -> (Vec<MethodHandle>, Vec<PatchError>) {
    let mut methods = Vec::new();
    let mut failures = Vec::new();
    for target in companion.targets() {
        match registry.patch_target(table, target, transpiler) {
            Ok(method) => methods.push(method),
            Err(e) => failures.push(e),
        }
    }
    (methods, failures)
}
