//! Library side of the `pgrid` command.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;
pub mod settings;
pub mod source;
