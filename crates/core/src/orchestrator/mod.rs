//! Teardown orchestrator.
//!
//! Runs the decommissioning sequence strictly in order, one call at a time:
//! - **Preflight**: caller must be the organization's management account
//! - **Deregister**: every delegated administrator, for every delegated service
//! - **Close**: every ACTIVE member account, in listing order
//! - **Await suspension**: bounded polling; a timeout is a warning, not a failure

mod runner;
mod types;

pub use runner::TeardownOrchestrator;
pub use types::{ClosureBatch, SuspensionOutcome, TeardownError, TeardownReport, TeardownStep};
