//! CLI command implementations.

mod config;
mod serve;
mod session;

pub use config::run_config;
pub use serve::run_serve;
pub use session::{run_interactive, run_query};
