//! In-process host image
//!
//! [`MemoryHost`] keeps method bodies, hooks, modules and live objects in plain collections. It is
//! what the test suite patches, and it doubles as a reference for embedders wiring up a real host.

use std::collections::{HashMap, HashSet};

use crate::code::Instruction;
use crate::companion::{ModuleInfo, ModuleRegistry};
use crate::error::HostError;
use crate::hook::{MethodHandle, MethodTable, TargetDescriptor};
use crate::transpiler::Transpiler;

use super::{DisplayHost, InstanceRef};

/// Hook installed on a method: the owner and the body its transpiler produced from the original
#[derive(Debug, Clone)]
struct Layer {
    /// Owner identity the hook was installed under
    owner: String,
    /// Body executed while this layer is the topmost one
    body: Vec<Instruction>,
}

/// A resident method
#[derive(Debug, Clone)]
struct Method {
    /// How the method is looked up
    descriptor: TargetDescriptor,
    /// Token handed out in handles
    token: u64,
    /// Body as originally compiled
    original: Vec<Instruction>,
    /// Installed hooks, oldest first
    layers: Vec<Layer>,
    /// Refuse hook installation
    fail_install: bool,
}
impl Method {
    /// Handle for this method
    fn handle(&self) -> MethodHandle {
        MethodHandle::new(self.token, self.descriptor.to_string())
    }
    /// Body currently executed
    fn body(&self) -> &[Instruction] {
        self.layers.last().map_or(&self.original, |l| &l.body)
    }
}

/// In-memory host
#[derive(Debug, Clone)]
pub struct MemoryHost {
    /// Whether the runtime patch framework is loaded
    framework: bool,
    /// Resident methods
    methods: Vec<Method>,
    /// Installed modules
    modules: Vec<ModuleInfo>,
    /// Live objects found by type
    instances: Vec<InstanceRef>,
    /// Live objects held in static properties, keyed by (type, property)
    singletons: HashMap<(String, String), InstanceRef>,
    /// (type, method) pairs whose invocation fails
    failing_invokes: HashSet<(String, String)>,
    /// Successful invocations, as `Type.Method`
    invocations: Vec<String>,
    /// Number of times the main date display was invalidated
    date_display_invalidations: usize,
    /// Make date display invalidation fail
    fail_date_display: bool,
    /// Next token or object id to hand out
    next_id: u64,
}
impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}
impl MemoryHost {
    /// Creates an empty host with the patch framework loaded
    pub fn new() -> Self {
        Self {
            framework: true,
            methods: Vec::new(),
            modules: Vec::new(),
            instances: Vec::new(),
            singletons: HashMap::new(),
            failing_invokes: HashSet::new(),
            invocations: Vec::new(),
            date_display_invalidations: 0,
            fail_date_display: false,
            next_id: 1,
        }
    }

    /// Loads or unloads the runtime patch framework
    pub fn set_patch_framework(&mut self, present: bool) {
        self.framework = present;
    }

    /// Adds a resident method and returns its handle
    pub fn define_method(
        &mut self,
        descriptor: TargetDescriptor,
        body: Vec<Instruction>,
    ) -> MethodHandle {
        let method = Method {
            descriptor,
            token: self.next_id(),
            original: body,
            layers: Vec::new(),
            fail_install: false,
        };
        let handle = method.handle();
        self.methods.push(method);
        handle
    }

    /// Body currently executed for `method`; empty for unknown handles
    pub fn body(&self, method: &MethodHandle) -> Vec<Instruction> {
        self.method(method.token())
            .map(|m| m.body().to_vec())
            .unwrap_or_default()
    }

    /// Body as originally compiled; empty for unknown handles
    pub fn original_body(&self, method: &MethodHandle) -> Vec<Instruction> {
        self.method(method.token())
            .map(|m| m.original.clone())
            .unwrap_or_default()
    }

    /// Number of hooks installed on `method`, across all owners
    pub fn hook_count(&self, method: &MethodHandle) -> usize {
        self.method(method.token()).map_or(0, |m| m.layers.len())
    }

    /// Total number of hooks installed across all methods and owners
    pub fn total_hooks(&self) -> usize {
        self.methods.iter().map(|m| m.layers.len()).sum()
    }

    /// Makes installing a hook on the method matching `descriptor` fail
    pub fn fail_install(&mut self, descriptor: &TargetDescriptor) {
        for method in self.methods.iter_mut().filter(|m| &m.descriptor == descriptor) {
            method.fail_install = true;
        }
    }

    /// Adds a module registry entry
    pub fn add_module(&mut self, module: ModuleInfo) {
        self.modules.push(module);
    }

    /// Removes every registry entry with `id`
    pub fn remove_module(&mut self, id: u64) {
        self.modules.retain(|m| m.id != id);
    }

    /// Adds a live object of `type_name`
    pub fn add_instance(&mut self, type_name: &str) -> InstanceRef {
        let instance = InstanceRef {
            id: self.next_id(),
            type_name: type_name.to_owned(),
        };
        self.instances.push(instance.clone());
        instance
    }

    /// Adds a live object of `type_name` held in its static `property`
    pub fn add_singleton(&mut self, type_name: &str, property: &str) -> InstanceRef {
        let instance = self.add_instance(type_name);
        self.singletons
            .insert((type_name.to_owned(), property.to_owned()), instance.clone());
        instance
    }

    /// Makes invoking `method` on objects of `type_name` fail
    pub fn fail_invoke(&mut self, type_name: &str, method: &str) {
        self.failing_invokes
            .insert((type_name.to_owned(), method.to_owned()));
    }

    /// Makes date display invalidation fail
    pub fn fail_date_display(&mut self, fail: bool) {
        self.fail_date_display = fail;
    }

    /// Successful invocations, as `Type.Method`, in call order
    pub fn invocations(&self) -> &[String] {
        &self.invocations
    }

    /// Number of times the main date display was invalidated
    pub fn date_display_invalidations(&self) -> usize {
        self.date_display_invalidations
    }

    /// Looks a method up by token
    fn method(&self, token: u64) -> Option<&Method> {
        self.methods.iter().find(|m| m.token == token)
    }

    /// Hands out a fresh id
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MethodTable for MemoryHost {
    fn patch_framework_present(&self) -> bool {
        self.framework
    }

    fn resolve(&self, target: &TargetDescriptor) -> Option<MethodHandle> {
        self.methods
            .iter()
            .find(|m| &m.descriptor == target)
            .map(Method::handle)
    }

    fn install(
        &mut self,
        method: &MethodHandle,
        owner: &str,
        transpiler: &dyn Transpiler,
    ) -> Result<(), HostError> {
        if !self.framework {
            return Err(HostError::new("patch framework is not loaded"));
        }
        let target = self
            .methods
            .iter_mut()
            .find(|m| m.token == method.token())
            .ok_or_else(|| HostError::new(format!("unknown method {method}")))?;
        if target.fail_install {
            return Err(HostError::new(format!("{method} cannot be patched")));
        }

        // every layer starts from the original so removing one never leaves its output behind
        let body = transpiler.transpile(target.original.clone());
        target.layers.push(Layer {
            owner: owner.to_owned(),
            body,
        });
        Ok(())
    }

    fn uninstall_all(&mut self, owner: &str) {
        for method in &mut self.methods {
            method.layers.retain(|l| l.owner != owner);
        }
    }

    fn installed(&self, owner: &str) -> Vec<MethodHandle> {
        self.methods
            .iter()
            .filter(|m| m.layers.iter().any(|l| l.owner == owner))
            .map(Method::handle)
            .collect()
    }
}

impl ModuleRegistry for MemoryHost {
    fn modules(&self) -> Vec<ModuleInfo> {
        self.modules.clone()
    }
}

impl DisplayHost for MemoryHost {
    fn find_instance(&self, type_name: &str) -> Option<InstanceRef> {
        self.instances
            .iter()
            .find(|i| i.type_name == type_name)
            .cloned()
    }

    fn singleton(&self, type_name: &str, property: &str) -> Option<InstanceRef> {
        self.singletons
            .get(&(type_name.to_owned(), property.to_owned()))
            .cloned()
    }

    fn invoke(&mut self, instance: &InstanceRef, method: &str) -> Result<(), HostError> {
        let key = (instance.type_name.clone(), method.to_owned());
        if self.failing_invokes.contains(&key) {
            return Err(HostError::new(format!(
                "{}.{} threw",
                instance.type_name, method
            )));
        }
        self.invocations
            .push(format!("{}.{}", instance.type_name, method));
        Ok(())
    }

    fn invalidate_date_display(&mut self) -> Result<(), HostError> {
        if self.fail_date_display {
            return Err(HostError::new("main date display is unavailable"));
        }
        self.date_display_invalidations += 1;
        Ok(())
    }
}
