//! Shaderkit - emulator shader cache manager
//!
//! Counts, installs and shares per-title shader caches, validating a share
//! by supervising a real emulator run before anything is uploaded.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod shaders;
pub mod share;
pub mod supervisor;
pub mod title;
pub mod transfer;
pub mod ui;

pub use error::{ShaderkitError, ShaderkitResult};
