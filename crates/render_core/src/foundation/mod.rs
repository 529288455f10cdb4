//! Foundation module - core utilities shared across the renderer
//!
//! - Math types and view/projection constructors
//! - Frame timing
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod time;
