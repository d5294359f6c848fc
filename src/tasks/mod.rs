//! The copy orchestrator and its run context.
//!
//! [`CopySettings`] walks the configured settings files through
//! [`Stage::Validating`], [`Stage::Filtering`], [`Stage::Copying`] and
//! [`Stage::Reporting`] against a single [`ResourceResolver`](crate::resources::ResourceResolver).
mod context;
mod copy_settings;

pub use context::Context;
pub use copy_settings::{CopyOutcome, CopySettings, CopyStats, Stage};
