//! Types for organization API operations.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the organization API.
#[derive(Debug, Error)]
pub enum OrganizationError {
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("caller account {caller} is not the organization management account {management}")]
    NotManagementAccount { caller: String, management: String },
}

impl OrganizationError {
    pub fn api(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Api {
            operation,
            message: message.into(),
        }
    }
}

/// Lifecycle status of an account as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Suspended,
    PendingClosure,
    Closed,
    /// Any provider-defined value outside the known set.
    Other(String),
}

impl AccountStatus {
    /// Returns the provider's wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
            AccountStatus::PendingClosure => "PENDING_CLOSURE",
            AccountStatus::Closed => "CLOSED",
            AccountStatus::Other(value) => value,
        }
    }

    /// SUSPENDED, or already past it (CLOSED).
    pub fn is_suspended(&self) -> bool {
        matches!(self, AccountStatus::Suspended | AccountStatus::Closed)
    }
}

impl From<&str> for AccountStatus {
    fn from(value: &str) -> Self {
        match value {
            "ACTIVE" => AccountStatus::Active,
            "SUSPENDED" => AccountStatus::Suspended,
            "PENDING_CLOSURE" => AccountStatus::PendingClosure,
            "CLOSED" => AccountStatus::Closed,
            other => AccountStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member (or management) account of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: AccountStatus,
}

/// One service delegated to one administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelegatedAdministration {
    pub account_id: String,
    pub service_principal: String,
}

/// Calls the teardown issues against the organization.
///
/// Listing methods return the complete result set; implementations follow
/// pagination internally.
#[async_trait]
pub trait OrganizationClient: Send + Sync {
    /// Account id of the credentials in use.
    async fn caller_account_id(&self) -> Result<String, OrganizationError>;

    /// Account id of the organization's management account.
    async fn management_account_id(&self) -> Result<String, OrganizationError>;

    /// Accounts registered as delegated administrator for at least one service.
    async fn list_delegated_administrators(&self) -> Result<Vec<String>, OrganizationError>;

    /// Service principals delegated to `account_id`.
    async fn list_delegated_services(
        &self,
        account_id: &str,
    ) -> Result<Vec<String>, OrganizationError>;

    async fn deregister_delegated_administrator(
        &self,
        account_id: &str,
        service_principal: &str,
    ) -> Result<(), OrganizationError>;

    /// Every account in the organization, in provider order.
    async fn list_accounts(&self) -> Result<Vec<Account>, OrganizationError>;

    async fn close_account(&self, account_id: &str) -> Result<(), OrganizationError>;

    async fn account_status(&self, account_id: &str) -> Result<AccountStatus, OrganizationError>;
}
