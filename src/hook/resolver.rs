//! Resolves target descriptors against the live host image

use tracing::debug;

use crate::error::PatchError;

use super::{MethodHandle, MethodTable, TargetDescriptor};

/// Resolution of descriptors to concrete method handles
pub trait Resolver {
    /// Resolves `target`, failing with [`PatchError::TargetNotFound`] when the owning type or the
    /// method is absent with the requested visibility and scope
    fn resolve_target(&self, target: &TargetDescriptor) -> Result<MethodHandle, PatchError>;
}

impl<T: MethodTable + ?Sized> Resolver for T {
    fn resolve_target(&self, target: &TargetDescriptor) -> Result<MethodHandle, PatchError> {
        match self.resolve(target) {
            Some(handle) => {
                debug!(method = %target, token = handle.token(), "resolved target");
                Ok(handle)
            }
            None => {
                debug!(method = %target, "unable to find original method");
                Err(PatchError::TargetNotFound {
                    target: target.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::code::Instruction;
    use crate::error::PatchError;
    use crate::hook::{Resolver, Scope, TargetDescriptor, Visibility};
    use crate::host::memory::MemoryHost;

    /// Host with one non-public instance method
    fn host() -> MemoryHost {
        let mut host = MemoryHost::new();
        host.define_method(
            TargetDescriptor::non_public("ChirpXPanel", "UpdateBindings"),
            vec![Instruction::ret()],
        );
        host
    }

    #[test]
    /// Exact descriptor resolves
    fn test_resolve() {
        let host = host();
        let handle = host
            .resolve_target(&TargetDescriptor::non_public("ChirpXPanel", "UpdateBindings"))
            .unwrap();
        assert_eq!(handle.name(), "ChirpXPanel.UpdateBindings");
    }

    #[test]
    /// Wrong visibility, scope, type or name are all `TargetNotFound`
    fn test_not_found() {
        let host = host();
        let misses = [
            TargetDescriptor::public("ChirpXPanel", "UpdateBindings"),
            TargetDescriptor::new(
                "ChirpXPanel",
                "UpdateBindings",
                Visibility::NonPublic,
                Scope::Static,
            ),
            TargetDescriptor::non_public("FestivalPanel", "UpdateBindings"),
            TargetDescriptor::non_public("ChirpXPanel", "Refresh"),
        ];
        for target in misses {
            match host.resolve_target(&target) {
                Err(PatchError::TargetNotFound { target: t }) => assert_eq!(t, target),
                other => panic!("expected TargetNotFound, got {other:?}"),
            }
        }
    }
}
