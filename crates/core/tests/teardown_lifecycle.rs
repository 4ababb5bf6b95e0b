//! Teardown lifecycle integration tests.
//!
//! These tests run the complete sequence against the in-memory organization:
//! preflight -> deregister delegated admins -> close members -> await suspension

use std::sync::Arc;

use orgteardown_core::{
    testing::{fixtures, MockOrganizationClient, RecordedCall, RecordingReporter},
    AccountStatus, OrganizationClient, Reporter, Severity, SuspensionOutcome, TeardownConfig,
    TeardownOrchestrator, TeardownStep,
};

const MANAGEMENT: &str = "111111111111";
const MEMBER_1: &str = "222222222222";
const MEMBER_2: &str = "333333333333";

/// Test helper wiring the orchestrator to the mock organization.
struct TestHarness {
    client: Arc<MockOrganizationClient>,
    reporter: Arc<RecordingReporter>,
    config: TeardownConfig,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            client: Arc::new(MockOrganizationClient::new(MANAGEMENT)),
            reporter: Arc::new(RecordingReporter::new()),
            config: TeardownConfig {
                deregister_delay_ms: 0,
                close_delay_ms: 0,
                poll_interval_ms: 0,
                max_poll_attempts: 5,
                dry_run: false,
            },
        }
    }

    /// Management account plus two members, one of them a delegated admin for S3.
    async fn seed_basic_organization(&self) {
        self.client
            .add_delegated_admin(MEMBER_1, &["s3.amazonaws.com"])
            .await;
        self.client
            .add_account(fixtures::account(MANAGEMENT, "mgmt"))
            .await;
        self.client
            .add_account(fixtures::account(MEMBER_1, "n1"))
            .await;
        self.client
            .add_account(fixtures::account(MEMBER_2, "n2"))
            .await;
    }

    fn orchestrator(&self) -> TeardownOrchestrator {
        TeardownOrchestrator::new(
            self.config.clone(),
            Arc::clone(&self.client) as Arc<dyn OrganizationClient>,
            Arc::clone(&self.reporter) as Arc<dyn Reporter>,
        )
    }

    fn index_of(calls: &[RecordedCall], predicate: impl Fn(&RecordedCall) -> bool) -> usize {
        calls
            .iter()
            .position(predicate)
            .expect("expected call not found")
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_basic_organization_teardown() {
    let harness = TestHarness::new();
    harness.seed_basic_organization().await;

    let report = harness.orchestrator().run().await.unwrap();

    assert_eq!(
        harness.client.deregistrations().await,
        vec![(MEMBER_1.to_string(), "s3.amazonaws.com".to_string())]
    );
    assert_eq!(harness.client.closed_accounts().await, vec![MEMBER_1, MEMBER_2]);
    assert_eq!(harness.client.status_queries().await, vec![MEMBER_1, MEMBER_2]);

    assert_eq!(report.management_account_id, MANAGEMENT);
    assert_eq!(report.deregistered.len(), 1);
    assert_eq!(
        report.closure_batch.as_slice(),
        [MEMBER_1.to_string(), MEMBER_2.to_string()]
    );
    assert_eq!(report.suspension, SuspensionOutcome::AllSuspended { rounds: 1 });
}

#[tokio::test]
async fn test_empty_organization() {
    let harness = TestHarness::new();
    harness
        .client
        .add_account(fixtures::account(MANAGEMENT, "mgmt"))
        .await;

    let report = harness.orchestrator().run().await.unwrap();

    assert!(harness
        .reporter
        .contains(Severity::Info, "No delegated administrators found"));
    assert!(harness
        .reporter
        .contains(Severity::Info, "No member accounts found"));
    assert!(harness.client.status_queries().await.is_empty());
    assert!(report.closure_batch.is_empty());
    assert_eq!(report.suspension, SuspensionOutcome::NotRequired);
}

#[tokio::test]
async fn test_suspension_timeout_is_not_fatal() {
    let harness = TestHarness::new();
    harness.seed_basic_organization().await;
    harness.client.set_suspended_after(None).await;

    let report = harness.orchestrator().run().await.unwrap();

    match &report.suspension {
        SuspensionOutcome::TimedOut { rounds, pending } => {
            assert_eq!(*rounds, 5);
            assert_eq!(pending, &vec![MEMBER_1.to_string(), MEMBER_2.to_string()]);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    // Each round checks every batch account once.
    assert_eq!(harness.client.status_queries().await.len(), 10);
    assert!(harness.reporter.contains(Severity::Warning, "Timed out"));
    assert!(harness
        .reporter
        .contains(Severity::Success, "Organization teardown completed"));
}

// =============================================================================
// Ordering and exclusion properties
// =============================================================================

#[tokio::test]
async fn test_all_deregistrations_precede_first_closure() {
    let harness = TestHarness::new();
    harness
        .client
        .add_delegated_admin(MEMBER_1, &["s3.amazonaws.com", "guardduty.amazonaws.com"])
        .await;
    harness
        .client
        .add_delegated_admin(MEMBER_2, &["securityhub.amazonaws.com"])
        .await;
    harness
        .client
        .add_account(fixtures::account(MEMBER_1, "n1"))
        .await;
    harness
        .client
        .add_account(fixtures::account(MEMBER_2, "n2"))
        .await;

    harness.orchestrator().run().await.unwrap();

    let calls = harness.client.calls().await;
    let last_deregister = calls
        .iter()
        .rposition(|c| matches!(c, RecordedCall::Deregister { .. }))
        .unwrap();
    let first_close =
        TestHarness::index_of(&calls, |c| matches!(c, RecordedCall::CloseAccount(_)));

    assert_eq!(harness.client.deregistrations().await.len(), 3);
    assert!(last_deregister < first_close);
}

#[tokio::test]
async fn test_management_account_never_closed() {
    let harness = TestHarness::new();
    harness
        .client
        .add_account(fixtures::account(MEMBER_1, "n1"))
        .await;
    harness
        .client
        .add_account(fixtures::account(MANAGEMENT, "mgmt"))
        .await;
    harness
        .client
        .add_account(fixtures::account(MEMBER_2, "n2"))
        .await;

    let report = harness.orchestrator().run().await.unwrap();

    assert!(!report.closure_batch.contains(MANAGEMENT));
    assert!(!harness
        .client
        .closed_accounts()
        .await
        .contains(&MANAGEMENT.to_string()));
    assert_eq!(harness.client.closed_accounts().await, vec![MEMBER_1, MEMBER_2]);
}

#[tokio::test]
async fn test_only_active_members_are_closed_in_listing_order() {
    let harness = TestHarness::new();
    let ids = ["444444444444", "555555555555", "666666666666", "777777777777"];
    harness
        .client
        .add_account(fixtures::account(MANAGEMENT, "mgmt"))
        .await;
    for (i, id) in ids.iter().enumerate() {
        harness
            .client
            .add_account(fixtures::account(id, &format!("member-{}", i)))
            .await;
    }
    harness
        .client
        .add_account(fixtures::account_with_status(
            "888888888888",
            "suspended",
            AccountStatus::Suspended,
        ))
        .await;

    let report = harness.orchestrator().run().await.unwrap();

    assert_eq!(harness.client.closed_accounts().await, ids.to_vec());
    assert_eq!(report.closure_batch.len(), ids.len());
}

// =============================================================================
// Failure policy
// =============================================================================

#[tokio::test]
async fn test_deregister_failure_halts_run() {
    let harness = TestHarness::new();
    harness.seed_basic_organization().await;
    let failing = RecordedCall::Deregister {
        account_id: MEMBER_1.to_string(),
        service_principal: "s3.amazonaws.com".to_string(),
    };
    harness.client.fail_call(failing.clone()).await;

    let err = harness.orchestrator().run().await.unwrap_err();

    assert_eq!(
        err.step,
        TeardownStep::Deregister {
            account_id: MEMBER_1.to_string(),
            service_principal: "s3.amazonaws.com".to_string(),
        }
    );
    let calls = harness.client.calls().await;
    assert_eq!(calls.last(), Some(&failing));
    assert!(harness.client.closed_accounts().await.is_empty());
}

#[tokio::test]
async fn test_close_failure_halts_run() {
    let harness = TestHarness::new();
    harness.seed_basic_organization().await;
    let failing = RecordedCall::CloseAccount(MEMBER_1.to_string());
    harness.client.fail_call(failing.clone()).await;

    let err = harness.orchestrator().run().await.unwrap_err();

    assert_eq!(
        err.step,
        TeardownStep::CloseAccount {
            account_id: MEMBER_1.to_string()
        }
    );
    let calls = harness.client.calls().await;
    assert_eq!(calls.last(), Some(&failing));
    assert!(harness.client.status_queries().await.is_empty());
}

#[tokio::test]
async fn test_caller_outside_management_account_fails_preflight() {
    let harness = TestHarness::new();
    harness.seed_basic_organization().await;
    harness.client.set_caller_account_id(MEMBER_2).await;

    let err = harness.orchestrator().run().await.unwrap_err();

    assert_eq!(err.step, TeardownStep::Preflight);
    assert_eq!(
        harness.client.calls().await,
        vec![
            RecordedCall::CallerIdentity,
            RecordedCall::DescribeOrganization
        ]
    );
}

// =============================================================================
// Dry run
// =============================================================================

#[tokio::test]
async fn test_dry_run_issues_no_mutating_calls() {
    let mut harness = TestHarness::new();
    harness.config.dry_run = true;
    harness.seed_basic_organization().await;

    let report = harness.orchestrator().run().await.unwrap();

    assert!(report.dry_run);
    assert!(harness.client.deregistrations().await.is_empty());
    assert!(harness.client.closed_accounts().await.is_empty());
    assert!(harness.client.status_queries().await.is_empty());
    assert_eq!(report.deregistered.len(), 1);
    assert_eq!(
        report.closure_batch.as_slice(),
        [MEMBER_1.to_string(), MEMBER_2.to_string()]
    );
    assert_eq!(report.suspension, SuspensionOutcome::NotRequired);
}
