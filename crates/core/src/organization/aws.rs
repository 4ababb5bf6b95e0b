//! AWS SDK implementation of the organization client.

use std::error::Error as StdError;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_organizations::error::DisplayErrorContext;
use tracing::debug;

use super::types::{Account, AccountStatus, OrganizationClient, OrganizationError};
use crate::config::{AwsConfig, RetryMode};

/// Organization client backed by `aws-sdk-organizations` and `aws-sdk-sts`.
#[derive(Debug, Clone)]
pub struct AwsOrganizationClient {
    organizations: aws_sdk_organizations::Client,
    sts: aws_sdk_sts::Client,
}

impl AwsOrganizationClient {
    /// Create a client from an already loaded SDK configuration.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            organizations: aws_sdk_organizations::Client::new(sdk_config),
            sts: aws_sdk_sts::Client::new(sdk_config),
        }
    }

    /// Resolve credentials and region through the default provider chain,
    /// applying the configured retry policy.
    pub async fn from_config(config: &AwsConfig) -> Self {
        let sdk_config = load_sdk_config(config).await;
        Self::new(&sdk_config)
    }
}

/// Build the retry policy the SDK applies transparently to every call.
pub fn retry_config(config: &AwsConfig) -> RetryConfig {
    let base = match config.retry_mode {
        RetryMode::Adaptive => RetryConfig::adaptive(),
        RetryMode::Standard => RetryConfig::standard(),
    };
    base.with_max_attempts(config.max_attempts)
}

async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).retry_config(retry_config(config));

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}

fn api_error<E>(operation: &'static str, err: E) -> OrganizationError
where
    E: StdError,
{
    OrganizationError::api(operation, DisplayErrorContext(&err).to_string())
}

/// Read the account lifecycle from `State`, falling back to the retired `Status`
/// field for endpoints that still only return that one.
#[allow(deprecated)]
fn lifecycle_status(
    operation: &'static str,
    account: &aws_sdk_organizations::types::Account,
) -> Result<AccountStatus, OrganizationError> {
    if let Some(state) = account.state() {
        return Ok(AccountStatus::from(state.as_str()));
    }
    account
        .status()
        .map(|s| AccountStatus::from(s.as_str()))
        .ok_or(OrganizationError::MissingField {
            operation,
            field: "State",
        })
}

fn convert_account(
    operation: &'static str,
    account: &aws_sdk_organizations::types::Account,
) -> Result<Account, OrganizationError> {
    let id = account
        .id()
        .ok_or(OrganizationError::MissingField { operation, field: "Id" })?;

    Ok(Account {
        id: id.to_string(),
        name: account.name().unwrap_or_default().to_string(),
        email: account.email().unwrap_or_default().to_string(),
        status: lifecycle_status(operation, account)?,
    })
}

#[async_trait]
impl OrganizationClient for AwsOrganizationClient {
    async fn caller_account_id(&self) -> Result<String, OrganizationError> {
        let out = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| api_error("GetCallerIdentity", e))?;

        out.account()
            .map(str::to_string)
            .ok_or(OrganizationError::MissingField {
                operation: "GetCallerIdentity",
                field: "Account",
            })
    }

    async fn management_account_id(&self) -> Result<String, OrganizationError> {
        let out = self
            .organizations
            .describe_organization()
            .send()
            .await
            .map_err(|e| api_error("DescribeOrganization", e))?;

        out.organization()
            .and_then(|org| org.master_account_id())
            .map(str::to_string)
            .ok_or(OrganizationError::MissingField {
                operation: "DescribeOrganization",
                field: "MasterAccountId",
            })
    }

    async fn list_delegated_administrators(&self) -> Result<Vec<String>, OrganizationError> {
        let mut ids = Vec::new();
        let mut pages = self
            .organizations
            .list_delegated_administrators()
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| api_error("ListDelegatedAdministrators", e))?;
            ids.extend(
                page.delegated_administrators()
                    .iter()
                    .filter_map(|admin| admin.id())
                    .map(str::to_string),
            );
        }

        debug!(count = ids.len(), "Listed delegated administrators");
        Ok(ids)
    }

    async fn list_delegated_services(
        &self,
        account_id: &str,
    ) -> Result<Vec<String>, OrganizationError> {
        let mut principals = Vec::new();
        let mut pages = self
            .organizations
            .list_delegated_services_for_account()
            .account_id(account_id)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| api_error("ListDelegatedServicesForAccount", e))?;
            principals.extend(
                page.delegated_services()
                    .iter()
                    .filter_map(|service| service.service_principal())
                    .map(str::to_string),
            );
        }

        debug!(account_id, count = principals.len(), "Listed delegated services");
        Ok(principals)
    }

    async fn deregister_delegated_administrator(
        &self,
        account_id: &str,
        service_principal: &str,
    ) -> Result<(), OrganizationError> {
        self.organizations
            .deregister_delegated_administrator()
            .account_id(account_id)
            .service_principal(service_principal)
            .send()
            .await
            .map_err(|e| api_error("DeregisterDelegatedAdministrator", e))?;
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, OrganizationError> {
        let mut accounts = Vec::new();
        let mut pages = self.organizations.list_accounts().into_paginator().send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| api_error("ListAccounts", e))?;
            for account in page.accounts() {
                accounts.push(convert_account("ListAccounts", account)?);
            }
        }

        debug!(count = accounts.len(), "Listed accounts");
        Ok(accounts)
    }

    async fn close_account(&self, account_id: &str) -> Result<(), OrganizationError> {
        self.organizations
            .close_account()
            .account_id(account_id)
            .send()
            .await
            .map_err(|e| api_error("CloseAccount", e))?;
        Ok(())
    }

    async fn account_status(&self, account_id: &str) -> Result<AccountStatus, OrganizationError> {
        let out = self
            .organizations
            .describe_account()
            .account_id(account_id)
            .send()
            .await
            .map_err(|e| api_error("DescribeAccount", e))?;

        let account = out.account().ok_or(OrganizationError::MissingField {
            operation: "DescribeAccount",
            field: "Account",
        })?;
        lifecycle_status("DescribeAccount", account)
    }
}
