//! Internode customer tools API
//!
//! Auth: HTTP Basic with the account login
//! API: `GET {base}` lists services, `GET {base}/{service}/usage` returns traffic

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::providers::traits::*;
use crate::storage::CredentialStore;

const USER_AGENT: &str = concat!("isp-usage/", env!("CARGO_PKG_VERSION"));

pub struct InternodeProvider {
    client: reqwest::Client,
    api: ApiConfig,
    store: Box<dyn CredentialStore>,
}

impl InternodeProvider {
    pub fn new(
        api: ApiConfig,
        store: Box<dyn CredentialStore>,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self { client, api, store })
    }
}

/// Resolve `request` against `base_uri` with exactly one slash between segments
pub fn request_url(base_uri: &str, request: Request<'_>) -> String {
    match request {
        Request::Services => base_uri.to_string(),
        Request::Usage(service_id) => format!(
            "{}/{}/usage",
            base_uri.trim_end_matches('/'),
            service_id.trim_matches('/')
        ),
    }
}

#[async_trait]
impl UsageSource for InternodeProvider {
    async fn fetch(&self, request: Request<'_>) -> Result<String, FetchError> {
        let url = request_url(&self.api.base_uri, request);
        // Re-read on every request; the store is the only place the login lives
        let credentials = self.store.load()?;

        log::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await?;

        let status = response.status();
        log::debug!("{} -> {}", url, status);
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized(url));
        }

        Ok(response.text().await?)
    }
}
