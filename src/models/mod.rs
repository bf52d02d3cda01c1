//! Data models for the ABS lead backend.
//!
//! These models match the frontend JSON shapes (camelCase) for seamless interoperability.

mod lead;
mod offer;

pub use lead::*;
pub use offer::*;
