//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; shared rule and pipeline
//! loading is in [`utils`].

mod compile;
mod completions;
mod config;
mod run;
mod utils;
mod validate;

pub use compile::handle_compile;
pub use completions::handle_completions;
pub use config::handle_config;
pub use run::handle_run;
pub use validate::handle_validate;
