//! Shared test utilities for the OpenKit workspace.
//!
//! This crate provides project fixtures so crate test suites don't each grow
//! their own temp-dir plumbing. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] builder for scratch project directories

pub mod project;

pub use project::TestProject;
