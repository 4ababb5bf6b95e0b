//! Organization API abstraction.
//!
//! This module provides an `OrganizationClient` trait covering the calls the
//! teardown needs, with a production implementation backed by the AWS SDK
//! (Organizations + STS).

mod aws;
mod types;

pub use aws::AwsOrganizationClient;
pub use types::*;
