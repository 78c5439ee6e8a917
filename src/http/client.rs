use std::time::Duration;

use reqwest::{
    Client,
    header::{
        ACCEPT, CACHE_CONTROL, CONNECTION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName,
        HeaderValue, ORIGIN, PRAGMA, REFERER,
    },
};
use tracing::error;

use crate::{
    domain::RunConfig,
    error::{AppError, AppResult, HttpError, ValidationError},
};

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("rowburst/", env!("CARGO_PKG_VERSION"));

/// Hard ceiling on a whole request; each attempt is also bounded separately.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_MAX_IDLE_PER_HOST: usize = 20;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Builds the pooled client shared by every worker of a run.
///
/// # Errors
///
/// Returns an error when a header value cannot be encoded or the client
/// cannot be built.
pub fn build_client(config: &RunConfig) -> AppResult<Client> {
    let headers = build_headers(config)?;
    Client::builder()
        .default_headers(headers)
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(CLIENT_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(POOL_IDLE_TIMEOUT))
        .build()
        .map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            AppError::http(HttpError::BuildClientFailed { source: err })
        })
}

/// Fixed header set sent with every request of a run.
///
/// # Errors
///
/// Returns an error when the cookie, origin or referer is not a valid
/// header value.
pub fn build_headers(config: &RunConfig) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json;charset=UTF-8"),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    insert_value(&mut headers, ORIGIN, "Origin", &config.origin)?;
    insert_value(&mut headers, REFERER, "Referer", &config.referer)?;
    if let Some(cookie) = config.cookie.as_deref() {
        insert_value(&mut headers, COOKIE, "Cookie", cookie)?;
    }
    Ok(headers)
}

fn insert_value(
    headers: &mut HeaderMap,
    name: HeaderName,
    label: &'static str,
    value: &str,
) -> AppResult<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|_err| AppError::validation(ValidationError::InvalidHeaderValue { name: label }))?;
    headers.insert(name, value);
    Ok(())
}
