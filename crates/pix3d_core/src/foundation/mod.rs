//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the editor core:
//! - Math types and Euler/quaternion conversion
//! - Node handles backed by slot maps
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
