//! Error handling for the resolver
//!
//! This module defines the error type shared by every resolution tier and the
//! download executor.

pub mod types;

pub use types::{Error, Result};
