//! Command builder for the external hydra binary.

mod builder;
pub mod protocol;

pub use builder::*;
