use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const SEARCH_CONNECT_TIMEOUT_SECS: u64 = 2;

static CLIENT: OnceCell<Client> = OnceCell::new();
static SEARCH_CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client for quote lookups.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Search index client: short connect timeout, one attempt.
pub fn search_http_client() -> Result<&'static Client> {
    SEARCH_CLIENT.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(Duration::from_secs(SEARCH_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build search http client")
    })
}
