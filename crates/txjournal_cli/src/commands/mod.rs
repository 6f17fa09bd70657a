//! CLI command implementations.

pub mod dump;
pub mod simulate;
pub mod verify;
