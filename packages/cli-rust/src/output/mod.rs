//! Output utilities for CLI commands
//!
//! Centralized error display so every command reports config problems the
//! same way.

pub mod errors;

pub use errors::show_error;
