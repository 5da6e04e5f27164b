//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the library:
//! math types, logging setup, and frame timing.

pub mod logging;
pub mod math;
pub mod time;
