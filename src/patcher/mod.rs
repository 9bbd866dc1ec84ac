//! # Patcher
//!
//! This module covers the patch registry, which installs transpilers on resolved methods and
//! remembers what it installed so that everything can be removed in one go

pub mod registry;

pub use registry::{PatchRecord, PatchRegistry};
