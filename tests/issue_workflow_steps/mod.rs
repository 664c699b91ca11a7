//! Step definitions for issue workflow scenarios.

pub mod world;
mod when;
mod then;
