//! HTTP client for the REST and GraphQL endpoints under test.
//!
//! Each query function issues the calls of one (API kind, complexity) tier
//! and measures wall-clock time from the first send until the last response
//! body has been read. Request construction happens before the clock starts.

use std::time::{Duration, Instant};

use apibench_core::{ApiKind, Complexity, QueryResult, Repository};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Request, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::queries::{rest_paths, GraphQlRequest};

const USER_AGENT: &str = concat!("apibench/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while talking to the APIs.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The credential cannot be sent as a header value.
    #[error("Credential contains characters not allowed in an HTTP header")]
    InvalidCredential,

    /// The credential check returned something other than 200.
    #[error("Authentication failed with status {0}")]
    AuthenticationFailed(StatusCode),
}

/// Executes one trial's query against a live API.
#[allow(async_fn_in_trait)]
pub trait QueryExecutor {
    async fn execute(
        &self,
        api: ApiKind,
        complexity: Complexity,
        repository: &Repository,
    ) -> Result<QueryResult, ClientError>;
}

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: Option<String>,
}

/// Client for both APIs, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    rest_url: String,
    graphql_url: String,
    rest_headers: HeaderMap,
    graphql_headers: HeaderMap,
}

fn validate_url(url: &str) -> Result<String, ClientError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ClientError::InvalidUrl(format!(
            "URL must start with http:// or https://: {}",
            url
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn auth_header(scheme: &str, credential: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("{} {}", scheme, credential))
        .map_err(|_| ClientError::InvalidCredential)?;
    value.set_sensitive(true);
    Ok(value)
}

impl ApiClient {
    /// Build a client for the endpoints in `api`, authenticating with `credential`.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is not http(s), the credential is not a
    /// valid header value, or the HTTP client cannot be created.
    pub fn new(api: &ApiConfig, credential: &str) -> Result<Self, ClientError> {
        let rest_url = validate_url(&api.rest_url)?;
        let graphql_url = validate_url(&api.graphql_url)?;

        let mut rest_headers = HeaderMap::new();
        rest_headers.insert(AUTHORIZATION, auth_header("token", credential)?);
        rest_headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        rest_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let mut graphql_headers = HeaderMap::new();
        graphql_headers.insert(AUTHORIZATION, auth_header("bearer", credential)?);
        graphql_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        graphql_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = api.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            rest_url,
            graphql_url,
            rest_headers,
            graphql_headers,
        })
    }

    /// Check the credential against `GET {rest}/user` and return the login.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationFailed`] on any non-200 status.
    pub async fn verify_credentials(&self) -> Result<String, ClientError> {
        let url = format!("{}/user", self.rest_url);
        let response = self
            .client
            .get(&url)
            .headers(self.rest_headers.clone())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::AuthenticationFailed(status));
        }

        let user: AuthenticatedUser = response.json().await?;
        Ok(user.login.unwrap_or_else(|| "N/A".to_string()))
    }

    /// Run a REST tier: its calls in order, one after another.
    ///
    /// Size is summed over every response. Status is the FIRST response's
    /// only, so a failing follow-up call (say a 404 on branches) still
    /// reports the status of the repository call.
    pub async fn rest(
        &self,
        complexity: Complexity,
        repository: &Repository,
    ) -> Result<QueryResult, ClientError> {
        let requests = rest_paths(complexity, repository)
            .iter()
            .map(|path| {
                self.client
                    .get(format!("{}{}", self.rest_url, path))
                    .headers(self.rest_headers.clone())
                    .build()
            })
            .collect::<Result<Vec<Request>, _>>()?;

        let start = Instant::now();
        let mut size_bytes = 0u64;
        let mut first_status = None;
        for request in requests {
            let response = self.client.execute(request).await?;
            first_status.get_or_insert(response.status());
            size_bytes += response.bytes().await?.len() as u64;
        }
        let elapsed = start.elapsed();

        let status = first_status.map_or(0, |s| s.as_u16());
        debug!(
            api = "REST",
            %complexity,
            %repository,
            status,
            size_bytes,
            "tier complete"
        );
        Ok(Self::result(elapsed, size_bytes, status))
    }

    /// Run a GraphQL tier: a single POST.
    pub async fn graphql(
        &self,
        complexity: Complexity,
        repository: &Repository,
    ) -> Result<QueryResult, ClientError> {
        let request = self
            .client
            .post(&self.graphql_url)
            .headers(self.graphql_headers.clone())
            .json(&GraphQlRequest::new(complexity, repository))
            .build()?;

        let start = Instant::now();
        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let size_bytes = response.bytes().await?.len() as u64;
        let elapsed = start.elapsed();

        debug!(
            api = "GraphQL",
            %complexity,
            %repository,
            status,
            size_bytes,
            "tier complete"
        );
        Ok(Self::result(elapsed, size_bytes, status))
    }

    fn result(elapsed: Duration, size_bytes: u64, status: u16) -> QueryResult {
        QueryResult {
            time_ms: elapsed.as_secs_f64() * 1000.0,
            size_bytes,
            status,
        }
    }
}

impl QueryExecutor for ApiClient {
    async fn execute(
        &self,
        api: ApiKind,
        complexity: Complexity,
        repository: &Repository,
    ) -> Result<QueryResult, ClientError> {
        match api {
            ApiKind::Rest => self.rest(complexity, repository).await,
            ApiKind::GraphQl => self.graphql(complexity, repository).await,
        }
    }
}
