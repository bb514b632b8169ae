//! # CompChem Toolkit Core Library
//!
//! Shared building blocks for the `compchem-toolkit` command-line tool and the
//! computational chemistry code built on top of it.
//!
//! - **[`utils`]**: path normalization (`set_pathspec`, `expand_user`).
//! - **[`logging`]**: named, hierarchical loggers with independent console and
//!   file sinks, built on `tracing` dispatchers.
//! - **[`progress`]**: a callback-based progress reporting channel that keeps
//!   library code independent of any terminal UI.
//! - **[`release`]**: version parsing and bumping, manifest editing, release
//!   planning and release-note rendering.

pub mod logging;
pub mod progress;
pub mod release;
pub mod utils;
