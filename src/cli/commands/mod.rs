//! Subcommand handlers

pub mod disable;
pub mod enable;
pub mod generate;
pub mod hook;
pub mod status;
pub mod update;
