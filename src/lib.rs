//! Project settings copier.
//!
//! Resolves named settings files (IDE preferences and the like) either from
//! entries inside dependency archives or from plain filesystem paths, and
//! copies each one into a project directory.  Which files apply is decided by
//! packaging filters; what happens when a file cannot be copied is decided by
//! a per-file fail policy.
//!
//! The public API is organised into five layers:
//!
//! - **[`config`]**: TOML run configuration, packaging filters, project model
//! - **[`resources`]**: resource and resolver traits plus the archive and
//!   filesystem resolvers
//! - **[`tasks`]**: the copy orchestrator (validate, filter, copy, report)
//! - **[`operations`]**: build-system hooks notified about written files
//! - **[`commands`]**: top-level subcommand orchestration (`apply`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod operations;
pub mod resources;
pub mod tasks;
