//! A Minimal Single-Command Shell Library

pub mod cmd;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod macros;
pub mod parse;
pub mod repl;
pub mod signals;
