pub mod config;
pub mod orchestrator;
pub mod organization;
pub mod report;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, AwsConfig, Config, ConfigError,
    OutputConfig, RetryMode, TeardownConfig, CONFIG_PATH_ENV,
};
pub use orchestrator::{
    ClosureBatch, SuspensionOutcome, TeardownError, TeardownOrchestrator, TeardownReport,
    TeardownStep,
};
pub use organization::{
    Account, AccountStatus, AwsOrganizationClient, DelegatedAdministration, OrganizationClient,
    OrganizationError,
};
pub use report::{ConsoleReporter, Reporter, Severity};
