//! Testing utilities and mock implementations.
//!
//! Provides an in-memory organization and a reporter that records status
//! lines, so the full teardown can run without AWS credentials.
//!
//! # Example
//!
//! ```rust,ignore
//! use orgteardown_core::testing::{fixtures, MockOrganizationClient, RecordingReporter};
//!
//! let client = MockOrganizationClient::new("111111111111");
//! client.add_account(fixtures::account("222222222222", "sandbox")).await;
//! client.add_delegated_admin("222222222222", &["s3.amazonaws.com"]).await;
//!
//! // Run the orchestrator, then inspect client.calls().await
//! ```

mod mock_organization;
mod recording_reporter;

pub use mock_organization::{MockOrganizationClient, RecordedCall};
pub use recording_reporter::RecordingReporter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::organization::{Account, AccountStatus};

    /// An ACTIVE account with an email derived from its name.
    pub fn account(id: &str, name: &str) -> Account {
        account_with_status(id, name, AccountStatus::Active)
    }

    pub fn account_with_status(id: &str, name: &str, status: AccountStatus) -> Account {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name),
            status,
        }
    }
}
