//! Teardown orchestrator implementation.
//!
//! Every remote call is awaited before the next one is issued. Any failed
//! call aborts the run; closures already requested stay requested.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::TeardownConfig;
use crate::organization::{
    AccountStatus, DelegatedAdministration, OrganizationClient, OrganizationError,
};
use crate::report::Reporter;

use super::types::{ClosureBatch, SuspensionOutcome, TeardownError, TeardownReport, TeardownStep};

/// Drives an organization through the teardown sequence.
pub struct TeardownOrchestrator {
    config: TeardownConfig,
    client: Arc<dyn OrganizationClient>,
    reporter: Arc<dyn Reporter>,
}

impl TeardownOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: TeardownConfig,
        client: Arc<dyn OrganizationClient>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            config,
            client,
            reporter,
        }
    }

    /// Run the whole sequence: preflight, deregistration, closure, suspension wait.
    pub async fn run(&self) -> Result<TeardownReport, TeardownError> {
        let started_at = Utc::now();
        info!(dry_run = self.config.dry_run, "Starting organization teardown");
        self.reporter.info("Starting AWS Organization teardown");
        if self.config.dry_run {
            self.reporter
                .warning("Dry run: no delegated administrator will be deregistered and no account closed");
        }

        let management_account_id = self.preflight().await?;
        let deregistered = self.deregister_all_delegated_admins().await?;
        let closure_batch = self.close_all_member_accounts(&management_account_id).await?;

        let suspension = if self.config.dry_run {
            SuspensionOutcome::NotRequired
        } else {
            self.await_suspension(&closure_batch).await?
        };

        self.reporter.success("Organization teardown completed");
        self.reporter.warning(&format!(
            "The management account {} must be closed manually",
            management_account_id
        ));
        self.reporter.warning(
            "Confirm every member account reports SUSPENDED before closing the management account",
        );

        Ok(TeardownReport {
            management_account_id,
            dry_run: self.config.dry_run,
            deregistered,
            closure_batch,
            suspension,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Verify credentials resolve and belong to the management account.
    ///
    /// Returns the management account id.
    pub async fn preflight(&self) -> Result<String, TeardownError> {
        self.reporter.info("Verifying AWS credentials");

        let caller = self
            .client
            .caller_account_id()
            .await
            .map_err(|e| TeardownError::new(TeardownStep::Preflight, e))?;

        let management = self
            .client
            .management_account_id()
            .await
            .map_err(|e| TeardownError::new(TeardownStep::Preflight, e))?;

        if caller != management {
            return Err(TeardownError::new(
                TeardownStep::Preflight,
                OrganizationError::NotManagementAccount { caller, management },
            ));
        }

        self.reporter.success(&format!(
            "Credentials verified for management account {}",
            caller
        ));
        Ok(caller)
    }

    /// Deregister every delegated administrator from every service delegated to it.
    pub async fn deregister_all_delegated_admins(
        &self,
    ) -> Result<Vec<DelegatedAdministration>, TeardownError> {
        self.reporter.info("Listing delegated administrators");

        let admins = self
            .client
            .list_delegated_administrators()
            .await
            .map_err(|e| TeardownError::new(TeardownStep::ListDelegatedAdministrators, e))?;

        if admins.is_empty() {
            self.reporter.info("No delegated administrators found");
            return Ok(Vec::new());
        }

        let mut deregistered = Vec::new();
        for account_id in admins {
            let services = self
                .client
                .list_delegated_services(&account_id)
                .await
                .map_err(|e| {
                    TeardownError::new(
                        TeardownStep::ListDelegatedServices {
                            account_id: account_id.clone(),
                        },
                        e,
                    )
                })?;

            debug!(account_id = %account_id, services = services.len(), "Delegated services");

            for service_principal in services {
                self.reporter.info(&format!(
                    "Deregistering account {} as delegated administrator for {}",
                    account_id, service_principal
                ));

                if self.config.dry_run {
                    self.reporter.info("Dry run: deregistration skipped");
                } else {
                    self.client
                        .deregister_delegated_administrator(&account_id, &service_principal)
                        .await
                        .map_err(|e| {
                            TeardownError::new(
                                TeardownStep::Deregister {
                                    account_id: account_id.clone(),
                                    service_principal: service_principal.clone(),
                                },
                                e,
                            )
                        })?;
                    self.reporter.success(&format!(
                        "Deregistered {} from {}",
                        account_id, service_principal
                    ));
                    self.pause(self.config.deregister_delay()).await;
                }

                deregistered.push(DelegatedAdministration {
                    account_id: account_id.clone(),
                    service_principal,
                });
            }
        }

        Ok(deregistered)
    }

    /// Request closure of every ACTIVE account except the management account.
    pub async fn close_all_member_accounts(
        &self,
        management_account_id: &str,
    ) -> Result<ClosureBatch, TeardownError> {
        self.reporter.info("Listing active member accounts");

        let accounts = self
            .client
            .list_accounts()
            .await
            .map_err(|e| TeardownError::new(TeardownStep::ListAccounts, e))?;

        let members: Vec<_> = accounts
            .into_iter()
            .filter(|a| a.status == AccountStatus::Active && a.id != management_account_id)
            .collect();

        let mut batch = ClosureBatch::new();
        if members.is_empty() {
            self.reporter.info("No member accounts found");
            return Ok(batch);
        }

        for account in members {
            self.reporter.info(&format!(
                "Closing account {} ({}, {})",
                account.id, account.name, account.email
            ));

            if self.config.dry_run {
                self.reporter.info("Dry run: closure skipped");
            } else {
                self.client.close_account(&account.id).await.map_err(|e| {
                    TeardownError::new(
                        TeardownStep::CloseAccount {
                            account_id: account.id.clone(),
                        },
                        e,
                    )
                })?;
                self.reporter
                    .success(&format!("Closure requested for account {}", account.id));
            }

            batch.push(account.id);

            if !self.config.dry_run {
                self.pause(self.config.close_delay()).await;
            }
        }

        Ok(batch)
    }

    /// Poll every batch account until all are SUSPENDED or the round budget runs out.
    pub async fn await_suspension(
        &self,
        batch: &ClosureBatch,
    ) -> Result<SuspensionOutcome, TeardownError> {
        if batch.is_empty() {
            return Ok(SuspensionOutcome::NotRequired);
        }

        let max_rounds = self.config.max_poll_attempts.max(1);
        self.reporter.info(&format!(
            "Waiting for {} account(s) to reach SUSPENDED",
            batch.len()
        ));

        let mut pending = Vec::new();
        for round in 1..=max_rounds {
            pending.clear();

            for account_id in batch.iter() {
                let status = self.client.account_status(account_id).await.map_err(|e| {
                    TeardownError::new(
                        TeardownStep::AccountStatus {
                            account_id: account_id.to_string(),
                        },
                        e,
                    )
                })?;

                debug!(account_id, status = %status, round, "Polled account status");
                if !status.is_suspended() {
                    pending.push(account_id.to_string());
                }
            }

            if pending.is_empty() {
                self.reporter
                    .success("All closed accounts have reached SUSPENDED");
                return Ok(SuspensionOutcome::AllSuspended { rounds: round });
            }

            self.reporter.info(&format!(
                "Round {}/{}: {} of {} account(s) suspended",
                round,
                max_rounds,
                batch.len() - pending.len(),
                batch.len()
            ));

            if round < max_rounds {
                self.pause(self.config.poll_interval()).await;
            }
        }

        warn!(pending = pending.len(), "Suspension polling timed out");
        self.reporter.warning(&format!(
            "Timed out waiting for suspension; still pending: {}",
            pending.join(", ")
        ));

        Ok(SuspensionOutcome::TimedOut {
            rounds: max_rounds,
            pending,
        })
    }

    async fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        debug!(delay_ms = delay.as_millis() as u64, "Pausing");
        tokio::time::sleep(delay).await;
    }
}
