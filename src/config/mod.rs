//! Attack configuration and its semantic validation.

mod types;
mod validate;

pub use types::*;
pub use validate::*;
