//! Command-line surface: subcommand handlers, output styling and the shared
//! command context.

pub mod commands;
pub mod ui;
pub mod util;
