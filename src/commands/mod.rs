//! CLI commands

pub mod build;
pub mod check;
pub mod list;
pub mod new;
