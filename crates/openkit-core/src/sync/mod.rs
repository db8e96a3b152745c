//! Reconciliation of desired files against disk and the ledger
//!
//! This module provides:
//! - **desired**: the desired-file model and producers that build it from disk
//! - **planner**: the three-way diff that turns desired files into a [`Plan`]
//! - **executor**: realizes a plan and records it in the ledger
//! - **check**: reports managed files that went missing or drifted
//! - **engine**: [`SyncEngine`], binding all of the above to a project root

mod check;
mod desired;
mod engine;
mod executor;
mod plan;
mod planner;
mod reader;

pub use check::{CheckReport, CheckStatus, DriftItem, check_ledger};
pub use desired::{DesiredFile, MODE_COPY, desired_file, desired_from_dir};
pub use engine::SyncEngine;
pub use plan::{Action, ApplyResult, Plan, PlanEntry, Reason, SyncOptions};
pub use planner::build_plan;
pub use reader::{ContentReader, DiskReader};
