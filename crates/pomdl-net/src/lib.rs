//! Transport layer for POM and metadata downloads.
//!
//! Defines the [`HttpClient`] seam the resolver fetches through, transient vs.
//! permanent failure classification in [`TransportError`], and the bounded
//! retry wrapper [`RetryingClient`]. Non-2xx statuses are responses, not
//! errors: callers decide what a 404 means for their fan-out.
//!
//! The production [`ReqwestClient`] lives behind the default-on `reqwest`
//! feature so tests and alternative transports can drop the dependency.

pub use self::client::{HttpClient, HttpResponse};
pub use self::error::TransportError;
pub use self::retry::{RetryPolicy, RetryingClient, retry_delay};

#[cfg(feature = "reqwest")]
pub use self::client::{ClientSettings, ReqwestClient, Timeouts};

mod client;
mod error;
mod retry;
