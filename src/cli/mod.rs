//! CLI module for the focus timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and the terminal timer view

pub mod commands;
pub mod display;

pub use commands::{Cli, Commands, RunArgs, SetArgs};
pub use display::{Display, TerminalView};
