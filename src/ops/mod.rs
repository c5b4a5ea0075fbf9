//! High-level operations.
//!
//! This module contains the implementation of the evergreen-build commands.

pub mod generate;
pub mod plan;
pub mod setup;

pub use generate::{build_pipeline, generate, generate_pipeline};
pub use plan::{format_plan, missing_programs, plan, PipelinePlan};
pub use setup::{setup, setup_pipeline};
