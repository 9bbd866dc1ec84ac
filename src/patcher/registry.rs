//! Patch registry keyed by a single owner identity

use tracing::{debug, info};

use crate::error::{HostError, PatchError};
use crate::hook::{MethodHandle, MethodTable, Resolver, TargetDescriptor};
use crate::transpiler::Transpiler;

/// Bookkeeping for one installed hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    /// Method the hook is installed on
    pub method: MethodHandle,
    /// Identity of the transpiler that was installed
    pub transpiler: String,
    /// Registry identity the hook was installed under
    pub owner: String,
}

/// Tracks every hook installed under one owner identity.
///
/// The owner identity namespaces these hooks from any other patcher sharing the host.
#[derive(Debug, Clone)]
pub struct PatchRegistry {
    /// Owner identity
    owner: String,
    /// Installed hooks, in installation order
    records: Vec<PatchRecord>,
}
impl PatchRegistry {
    /// Creates an empty registry for `owner`
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            records: Vec::new(),
        }
    }

    /// Owner identity
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Installed hooks, in installation order
    pub fn records(&self) -> &[PatchRecord] {
        &self.records
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `method` carries a hook recorded by this registry
    pub fn is_patched(&self, method: &MethodHandle) -> bool {
        self.records.iter().any(|r| &r.method == method)
    }

    /// Installs `transpiler` on `method`.
    ///
    /// Returns `Ok(false)` without touching the host if the method already carries a hook under
    /// this owner, so a hook is installed at most once per method. Such a hook keeps the body it
    /// was installed with; the transpiler is not re-run. Use [`PatchRegistry::remove_all`] first to
    /// pick up a changed format.
    pub fn apply<T: MethodTable + ?Sized>(
        &mut self,
        table: &mut T,
        method: &MethodHandle,
        transpiler: &dyn Transpiler,
    ) -> Result<bool, HostError> {
        if self.is_patched(method) {
            debug!(method = %method, owner = %self.owner, "already patched");
            return Ok(false);
        }
        if table.installed(&self.owner).contains(method) {
            // installed by an earlier registry with the same owner; adopt it
            debug!(method = %method, owner = %self.owner, "adopting existing hook");
            self.record(method, transpiler);
            return Ok(false);
        }

        table.install(method, &self.owner, transpiler)?;
        self.record(method, transpiler);
        info!(method = %method, owner = %self.owner, transpiler = transpiler.id(), "patched");
        Ok(true)
    }

    /// Resolves `target` and installs `transpiler` on it
    pub fn patch_target<T: MethodTable + ?Sized>(
        &mut self,
        table: &mut T,
        target: &TargetDescriptor,
        transpiler: &dyn Transpiler,
    ) -> Result<MethodHandle, PatchError> {
        let method = table.resolve_target(target)?;
        self.apply(table, &method, transpiler)
            .map_err(|source| PatchError::ApplyFailure {
                target: target.clone(),
                source,
            })?;
        Ok(method)
    }

    /// Uninstalls every hook under this owner and clears the registry. No-op if nothing is
    /// installed.
    pub fn remove_all<T: MethodTable + ?Sized>(&mut self, table: &mut T) {
        if self.records.is_empty() && table.installed(&self.owner).is_empty() {
            return;
        }
        table.uninstall_all(&self.owner);
        info!(owner = %self.owner, count = self.records.len(), "removed patches");
        self.records.clear();
    }

    /// Drops every record without touching the host, for when the host can no longer be asked
    /// to uninstall
    pub fn forget(&mut self) {
        self.records.clear();
    }

    /// Adds a record for `method`
    fn record(&mut self, method: &MethodHandle, transpiler: &dyn Transpiler) {
        self.records.push(PatchRecord {
            method: method.clone(),
            transpiler: transpiler.id().to_owned(),
            owner: self.owner.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::code::Instruction;
    use crate::error::PatchError;
    use crate::hook::{MethodTable, TargetDescriptor};
    use crate::host::memory::MemoryHost;
    use crate::patcher::PatchRegistry;
    use crate::transpiler::date::DateFormatTranspiler;

    /// Owner used by these tests
    const OWNER: &str = "test.owner";

    /// Host with a single date label method
    fn host() -> (MemoryHost, TargetDescriptor) {
        let target = TargetDescriptor::public("UIDateTimeWrapper", "Check");
        let mut host = MemoryHost::new();
        host.define_method(
            target.clone(),
            vec![
                Instruction::ldstr("dd/MM/yyyy"),
                Instruction::call("System.DateTime::ToString"),
                Instruction::ret(),
            ],
        );
        (host, target)
    }

    #[test]
    /// Applying rewrites the executed body and records the patch
    fn test_apply() {
        let (mut host, target) = host();
        let mut registry = PatchRegistry::new(OWNER);
        let format = String::from("yyyy/MM/dd");
        let transpiler = DateFormatTranspiler::new(&format);

        let method = registry.patch_target(&mut host, &target, &transpiler).unwrap();

        assert_eq!(host.body(&method)[0], Instruction::ldstr("yyyy/MM/dd"));
        assert_eq!(registry.records().len(), 1);
        assert_eq!(registry.records()[0].transpiler, "ReplaceDateFormatString");
        assert_eq!(registry.records()[0].owner, OWNER);
        assert_eq!(host.installed(OWNER), vec![method]);
    }

    #[test]
    /// Applying twice installs the hook only once
    fn test_apply_idempotent() {
        let (mut host, target) = host();
        let mut registry = PatchRegistry::new(OWNER);
        let format = String::from("yyyy/MM/dd");
        let transpiler = DateFormatTranspiler::new(&format);

        let method = registry.patch_target(&mut host, &target, &transpiler).unwrap();
        assert!(!registry.apply(&mut host, &method, &transpiler).unwrap());

        assert_eq!(registry.records().len(), 1);
        assert_eq!(host.hook_count(&method), 1);

        // a fresh registry with the same owner adopts the hook instead of stacking another
        let mut other = PatchRegistry::new(OWNER);
        assert!(!other.apply(&mut host, &method, &transpiler).unwrap());
        assert_eq!(host.hook_count(&method), 1);
    }

    #[test]
    /// Removing restores original bodies, removing again is a no-op
    fn test_remove_all() {
        let (mut host, target) = host();
        let mut registry = PatchRegistry::new(OWNER);
        let format = String::from("yyyy/MM/dd");
        let transpiler = DateFormatTranspiler::new(&format);
        let method = registry.patch_target(&mut host, &target, &transpiler).unwrap();

        registry.remove_all(&mut host);
        assert!(registry.is_empty());
        assert!(host.installed(OWNER).is_empty());
        assert_eq!(host.body(&method)[0], Instruction::ldstr("dd/MM/yyyy"));

        registry.remove_all(&mut host);
        assert!(registry.is_empty());
    }

    #[test]
    /// Hooks from other owners survive `remove_all`, and none of our format is left behind
    fn test_remove_all_scoped_to_owner() {
        let (mut host, target) = host();
        let ours_format = String::from("yyyy/MM/dd");
        let theirs_format = String::from("X");

        let mut ours = PatchRegistry::new(OWNER);
        let mut theirs = PatchRegistry::new("someone.else");
        let method = ours
            .patch_target(&mut host, &target, &DateFormatTranspiler::new(&ours_format))
            .unwrap();
        theirs
            .patch_target(&mut host, &target, &DateFormatTranspiler::new(&theirs_format))
            .unwrap();

        ours.remove_all(&mut host);
        assert!(host.installed(OWNER).is_empty());
        assert_eq!(host.installed("someone.else"), vec![method.clone()]);
        assert_eq!(host.body(&method)[0], Instruction::ldstr("X"));
    }

    #[test]
    /// Install failures are reported as `ApplyFailure` and leave no record
    fn test_apply_failure() {
        let (mut host, target) = host();
        host.fail_install(&target);
        let mut registry = PatchRegistry::new(OWNER);
        let format = String::from("yyyy/MM/dd");
        let transpiler = DateFormatTranspiler::new(&format);

        let err = registry.patch_target(&mut host, &target, &transpiler).unwrap_err();
        assert!(matches!(err, PatchError::ApplyFailure { .. }));
        assert_eq!(err.target(), Some(&target));
        assert!(registry.is_empty());
    }
}
