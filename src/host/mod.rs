//! # Host
//!
//! The running application being patched, as seen through the seams this crate needs

pub mod memory;

use crate::companion::ModuleRegistry;
use crate::error::HostError;
use crate::hook::MethodTable;

/// Opaque reference to a live object inside the host
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    /// Host-assigned object id
    pub id: u64,
    /// Type of the object
    pub type_name: String,
}

/// Access to the host's live display objects
pub trait DisplayHost {
    /// Finds a live object of `type_name`, if any
    fn find_instance(&self, type_name: &str) -> Option<InstanceRef>;
    /// Reads the static `property` of `type_name`; `None` if the property or its value is absent
    fn singleton(&self, type_name: &str, property: &str) -> Option<InstanceRef>;
    /// Calls a parameterless method on a live object
    fn invoke(&mut self, instance: &InstanceRef, method: &str) -> Result<(), HostError>;
    /// Perturbs the host's main time-tracking state so its date display re-renders the next time
    /// it checks for a change, even while the simulation is paused
    fn invalidate_date_display(&mut self) -> Result<(), HostError>;
}

/// Everything the engine needs from a host
pub trait Host: MethodTable + ModuleRegistry + DisplayHost {}
impl<T: MethodTable + ModuleRegistry + DisplayHost + ?Sized> Host for T {}
