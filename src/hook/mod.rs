//! # Hook
//!
//! This module covers hook targets and the host's method table, which resolves targets to
//! resident methods and runs transpilers over them

pub mod resolver;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::transpiler::Transpiler;

pub use resolver::Resolver;

/// Accessibility a method is looked up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Publicly visible members
    Public,
    /// Private, protected and internal members
    NonPublic,
}

/// Binding scope a method is looked up with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Instance methods
    #[default]
    Instance,
    /// Static methods
    Static,
}

/// Declarative reference to a method to be patched
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Full name of the owning type
    pub type_name: String,
    /// Method name
    pub method: String,
    /// Visibility to look the method up with
    pub visibility: Visibility,
    /// Binding scope to look the method up with
    #[serde(default)]
    pub scope: Scope,
}
impl TargetDescriptor {
    /// Creates a descriptor
    pub fn new(
        type_name: impl Into<String>,
        method: impl Into<String>,
        visibility: Visibility,
        scope: Scope,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            method: method.into(),
            visibility,
            scope,
        }
    }
    /// Public instance method
    pub fn public(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(type_name, method, Visibility::Public, Scope::Instance)
    }
    /// Non-public instance method
    pub fn non_public(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(type_name, method, Visibility::NonPublic, Scope::Instance)
    }
}
impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.method)
    }
}

/// Opaque reference to a resident method body.
///
/// Only valid for the lifetime of the host process that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodHandle {
    /// Host-assigned token
    token: u64,
    /// Display name, `Type.Method`
    name: String,
}
impl MethodHandle {
    /// Creates a handle. Only hosts should need to call this.
    pub fn new(token: u64, name: impl Into<String>) -> Self {
        Self {
            token,
            name: name.into(),
        }
    }
    /// Host-assigned token
    pub fn token(&self) -> u64 {
        self.token
    }
    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The host's compiled-method table, as exposed by its runtime patch framework
pub trait MethodTable {
    /// Whether the runtime patch framework is available at all
    fn patch_framework_present(&self) -> bool;

    /// Looks up a method with exactly the requested visibility and scope. Read-only.
    fn resolve(&self, target: &TargetDescriptor) -> Option<MethodHandle>;

    /// Installs `transpiler` on `method` under `owner`.
    ///
    /// The host runs the transpiler over the method's original body while installing, and
    /// executes the result from then on.
    fn install(
        &mut self,
        method: &MethodHandle,
        owner: &str,
        transpiler: &dyn Transpiler,
    ) -> Result<(), HostError>;

    /// Removes every hook installed under `owner`, restoring original bodies
    fn uninstall_all(&mut self, owner: &str);

    /// Methods that currently carry a hook installed under `owner`
    fn installed(&self, owner: &str) -> Vec<MethodHandle>;
}
