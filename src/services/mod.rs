//! Service layer for the archiver.
//!
//! This module contains the remote-facing pieces:
//! - Gazette API access (`GazetteClient`, `HttpGazetteClient`)
//! - Retrying flaky calls (`Retrier`, `RetryPolicy`)

mod gazette;
mod retry;

pub use gazette::{Endpoints, GazetteClient, HttpGazetteClient};
pub use retry::{Retrier, RetryPolicy};
