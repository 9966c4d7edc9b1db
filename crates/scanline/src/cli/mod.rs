//! Command implementations for the scanline CLI.

pub mod config;
pub mod process;
