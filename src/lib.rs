#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::missing_crate_level_docs)]
#![doc = include_str!("../README.md")]

pub mod code;
pub mod companion;
pub mod config;
pub mod engine;
pub mod error;
pub mod hook;
pub mod host;
pub mod inventory;
pub mod patcher;
pub mod transpiler;

pub use config::{DateFormatConfig, EngineConfig, FormatSource};
pub use engine::{Engine, EngineState, PassReport};
pub use error::PatchError;
