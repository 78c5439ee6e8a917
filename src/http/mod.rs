//! Outbound request construction, sending and the retry policy.
mod body;
mod client;
mod sender;

#[cfg(test)]
pub(crate) mod test_server;

pub use body::MAX_RESPONSE_BYTES;
pub use client::{build_client, build_headers};
pub use sender::{ATTEMPT_TIMEOUT, RequestSender, SendOutcome, backoff_delay, select_endpoint};
