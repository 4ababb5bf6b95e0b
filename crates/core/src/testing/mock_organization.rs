//! Mock organization client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::organization::{Account, AccountStatus, OrganizationClient, OrganizationError};

/// A call received by the mock, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordedCall {
    CallerIdentity,
    DescribeOrganization,
    ListDelegatedAdministrators,
    ListDelegatedServices(String),
    Deregister {
        account_id: String,
        service_principal: String,
    },
    ListAccounts,
    CloseAccount(String),
    AccountStatus(String),
}

/// Mock implementation of the OrganizationClient trait.
///
/// Provides controllable behavior for testing:
/// - Seed delegated administrators and accounts
/// - Record every call in order
/// - Fail specific calls
/// - Control how many status polls a closed account needs to reach SUSPENDED
///
/// Closing an account moves it to PENDING_CLOSURE; deregistering removes the
/// service from the administrator, and the administrator once it has none left.
#[derive(Debug)]
pub struct MockOrganizationClient {
    caller_account_id: Arc<RwLock<String>>,
    management_account_id: String,
    /// Delegated administrators in listing order, with their services.
    delegated: Arc<RwLock<Vec<(String, Vec<String>)>>>,
    accounts: Arc<RwLock<Vec<Account>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Calls that fail instead of succeeding.
    failing: Arc<RwLock<HashSet<RecordedCall>>>,
    /// Status polls a closed account answers before reporting SUSPENDED.
    /// `None` keeps closed accounts pending forever.
    suspended_after: Arc<RwLock<Option<u32>>>,
    status_polls: Arc<RwLock<HashMap<String, u32>>>,
}

impl MockOrganizationClient {
    /// Create a mock organization managed by `management_account_id`.
    ///
    /// The caller is the management account unless changed with
    /// [`set_caller_account_id`](Self::set_caller_account_id).
    pub fn new(management_account_id: impl Into<String>) -> Self {
        let management_account_id = management_account_id.into();
        Self {
            caller_account_id: Arc::new(RwLock::new(management_account_id.clone())),
            management_account_id,
            delegated: Arc::new(RwLock::new(Vec::new())),
            accounts: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            suspended_after: Arc::new(RwLock::new(Some(0))),
            status_polls: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn set_caller_account_id(&self, account_id: impl Into<String>) {
        *self.caller_account_id.write().await = account_id.into();
    }

    /// Register `account_id` as delegated administrator for `services`.
    pub async fn add_delegated_admin(&self, account_id: &str, services: &[&str]) {
        self.delegated.write().await.push((
            account_id.to_string(),
            services.iter().map(|s| s.to_string()).collect(),
        ));
    }

    pub async fn add_account(&self, account: Account) {
        self.accounts.write().await.push(account);
    }

    /// Make the given call fail every time it is issued.
    pub async fn fail_call(&self, call: RecordedCall) {
        self.failing.write().await.insert(call);
    }

    /// Number of PENDING_CLOSURE answers a closed account gives before SUSPENDED.
    pub async fn set_suspended_after(&self, polls: Option<u32>) {
        *self.suspended_after.write().await = polls;
    }

    /// All calls received, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Deregister calls received, as (account, service) pairs.
    pub async fn deregistrations(&self) -> Vec<(String, String)> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Deregister {
                    account_id,
                    service_principal,
                } => Some((account_id.clone(), service_principal.clone())),
                _ => None,
            })
            .collect()
    }

    /// Account ids close requests were received for, in order.
    pub async fn closed_accounts(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::CloseAccount(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Account ids whose status was queried, in order.
    pub async fn status_queries(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::AccountStatus(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Record the call, then fail it if it was marked as failing.
    async fn record(
        &self,
        operation: &'static str,
        call: RecordedCall,
    ) -> Result<(), OrganizationError> {
        let fails = self.failing.read().await.contains(&call);
        self.calls.write().await.push(call);
        if fails {
            return Err(OrganizationError::api(operation, "mock failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationClient for MockOrganizationClient {
    async fn caller_account_id(&self) -> Result<String, OrganizationError> {
        self.record("GetCallerIdentity", RecordedCall::CallerIdentity)
            .await?;
        Ok(self.caller_account_id.read().await.clone())
    }

    async fn management_account_id(&self) -> Result<String, OrganizationError> {
        self.record("DescribeOrganization", RecordedCall::DescribeOrganization)
            .await?;
        Ok(self.management_account_id.clone())
    }

    async fn list_delegated_administrators(&self) -> Result<Vec<String>, OrganizationError> {
        self.record(
            "ListDelegatedAdministrators",
            RecordedCall::ListDelegatedAdministrators,
        )
        .await?;
        Ok(self
            .delegated
            .read()
            .await
            .iter()
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn list_delegated_services(
        &self,
        account_id: &str,
    ) -> Result<Vec<String>, OrganizationError> {
        self.record(
            "ListDelegatedServicesForAccount",
            RecordedCall::ListDelegatedServices(account_id.to_string()),
        )
        .await?;
        self.delegated
            .read()
            .await
            .iter()
            .find(|(id, _)| id == account_id)
            .map(|(_, services)| services.clone())
            .ok_or_else(|| {
                OrganizationError::api(
                    "ListDelegatedServicesForAccount",
                    format!("AccountNotRegisteredException: {}", account_id),
                )
            })
    }

    async fn deregister_delegated_administrator(
        &self,
        account_id: &str,
        service_principal: &str,
    ) -> Result<(), OrganizationError> {
        self.record(
            "DeregisterDelegatedAdministrator",
            RecordedCall::Deregister {
                account_id: account_id.to_string(),
                service_principal: service_principal.to_string(),
            },
        )
        .await?;

        let mut delegated = self.delegated.write().await;
        if let Some((_, services)) = delegated.iter_mut().find(|(id, _)| id == account_id) {
            services.retain(|s| s != service_principal);
        }
        delegated.retain(|(_, services)| !services.is_empty());
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, OrganizationError> {
        self.record("ListAccounts", RecordedCall::ListAccounts)
            .await?;
        Ok(self.accounts.read().await.clone())
    }

    async fn close_account(&self, account_id: &str) -> Result<(), OrganizationError> {
        self.record(
            "CloseAccount",
            RecordedCall::CloseAccount(account_id.to_string()),
        )
        .await?;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or_else(|| {
                OrganizationError::api(
                    "CloseAccount",
                    format!("AccountNotFoundException: {}", account_id),
                )
            })?;
        account.status = AccountStatus::PendingClosure;
        Ok(())
    }

    async fn account_status(&self, account_id: &str) -> Result<AccountStatus, OrganizationError> {
        self.record(
            "DescribeAccount",
            RecordedCall::AccountStatus(account_id.to_string()),
        )
        .await?;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or_else(|| {
                OrganizationError::api(
                    "DescribeAccount",
                    format!("AccountNotFoundException: {}", account_id),
                )
            })?;

        if account.status == AccountStatus::PendingClosure {
            let mut polls = self.status_polls.write().await;
            let seen = polls.entry(account_id.to_string()).or_insert(0);
            let threshold = *self.suspended_after.read().await;
            if threshold.is_some_and(|t| *seen >= t) {
                account.status = AccountStatus::Suspended;
            }
            *seen += 1;
        }

        Ok(account.status.clone())
    }
}
