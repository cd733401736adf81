//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the crate.

pub mod duration;
pub mod version;

pub use duration::{format_duration, time_to_seconds};
pub use version::{VERSION, get_version};
