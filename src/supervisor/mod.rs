//! Process supervision for the external attack tool.

mod events;
mod process;
mod runner;
mod session;

pub use events::*;
pub use process::*;
pub use runner::*;
pub use session::{RunFindings, SessionState, OUTPUT_BATCH};
