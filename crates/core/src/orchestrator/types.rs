//! Types for the teardown orchestrator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::organization::{DelegatedAdministration, OrganizationError};

/// The step of the teardown sequence a failure happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TeardownStep {
    Preflight,
    ListDelegatedAdministrators,
    ListDelegatedServices {
        account_id: String,
    },
    Deregister {
        account_id: String,
        service_principal: String,
    },
    ListAccounts,
    CloseAccount {
        account_id: String,
    },
    AccountStatus {
        account_id: String,
    },
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeardownStep::Preflight => write!(f, "preflight check"),
            TeardownStep::ListDelegatedAdministrators => {
                write!(f, "listing delegated administrators")
            }
            TeardownStep::ListDelegatedServices { account_id } => {
                write!(f, "listing delegated services for account {}", account_id)
            }
            TeardownStep::Deregister {
                account_id,
                service_principal,
            } => write!(
                f,
                "deregistering account {} as delegated administrator for {}",
                account_id, service_principal
            ),
            TeardownStep::ListAccounts => write!(f, "listing accounts"),
            TeardownStep::CloseAccount { account_id } => {
                write!(f, "closing account {}", account_id)
            }
            TeardownStep::AccountStatus { account_id } => {
                write!(f, "checking status of account {}", account_id)
            }
        }
    }
}

/// A fatal teardown failure. Nothing already done is rolled back.
#[derive(Debug, Error)]
#[error("{step} failed")]
pub struct TeardownError {
    pub step: TeardownStep,
    #[source]
    pub source: OrganizationError,
}

impl TeardownError {
    pub fn new(step: TeardownStep, source: OrganizationError) -> Self {
        Self { step, source }
    }
}

/// Accounts this run issued a close request for, in issue order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClosureBatch {
    account_ids: Vec<String>,
}

impl ClosureBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, account_id: impl Into<String>) {
        self.account_ids.push(account_id.into());
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.account_ids.iter().any(|id| id == account_id)
    }

    pub fn len(&self) -> usize {
        self.account_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.account_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.account_ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.account_ids
    }
}

/// Result of waiting for closed accounts to reach SUSPENDED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SuspensionOutcome {
    /// Nothing was closed (or dry run), so no polling happened.
    NotRequired,
    /// Every batch account reported SUSPENDED within `rounds` polling rounds.
    AllSuspended { rounds: u32 },
    /// The polling budget ran out; `pending` were still not suspended.
    TimedOut { rounds: u32, pending: Vec<String> },
}

impl SuspensionOutcome {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, SuspensionOutcome::TimedOut { .. })
    }
}

/// Summary of a completed teardown run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownReport {
    pub management_account_id: String,
    pub dry_run: bool,
    /// Every (account, service) pair deregistered, in call order.
    pub deregistered: Vec<DelegatedAdministration>,
    pub closure_batch: ClosureBatch,
    pub suspension: SuspensionOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_step() {
        let err = TeardownError::new(
            TeardownStep::CloseAccount {
                account_id: "333333333333".to_string(),
            },
            OrganizationError::api("CloseAccount", "TooManyRequestsException"),
        );
        assert_eq!(err.to_string(), "closing account 333333333333 failed");
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()),
            Some("CloseAccount failed: TooManyRequestsException".to_string())
        );
    }

    #[test]
    fn test_closure_batch() {
        let mut batch = ClosureBatch::new();
        assert!(batch.is_empty());
        batch.push("a");
        batch.push("b".to_string());
        assert_eq!(batch.len(), 2);
        assert!(batch.contains("b"));
        assert!(!batch.contains("c"));
        assert_eq!(batch.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_suspension_outcome_serialization() {
        let outcome = SuspensionOutcome::TimedOut {
            rounds: 3,
            pending: vec!["a".to_string()],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "timed_out");
        assert_eq!(json["rounds"], 3);
        assert!(outcome.is_timed_out());
        assert!(!SuspensionOutcome::NotRequired.is_timed_out());
    }

    #[test]
    fn test_batch_serializes_as_list() {
        let mut batch = ClosureBatch::new();
        batch.push("111");
        assert_eq!(serde_json::to_string(&batch).unwrap(), r#"["111"]"#);
    }
}
