use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) roster_terminal/0.1";

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. stats.nba.com rejects requests without a browser-like
/// origin, so those headers ride on every request.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("failed to build http client")
    })
}
