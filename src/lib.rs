//! shelf: remote-or-local searchable selector for back-office entities.
//!
//! The binary is a thin layer over three crates:
//!
//! ```text
//! shelf-core   selector state machine, search modes, fetch coordinator
//! shelf-remote HTTP search source
//! shelf-tui    terminal picker
//! ```
//!
//! This crate only adds the command line ([`cli`]), exposed as a library so
//! integration tests build selectors exactly the way the binary does.

pub mod cli;

pub use cli::Cli;
