//! Configuration management for the resolver
//!
//! This module handles loading and managing configuration settings for the
//! library and the command-line binary.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{RotationPolicy, Settings};
