//! Generic utility primitives with zero domain knowledge.
//!
//! - `io` - File I/O with consistent error handling
//! - `shell` - Shell quoting for displayed command lines
//! - `template` - String template rendering

pub mod io;
pub mod shell;
pub mod template;
