//! GitHub HTTP client with rate limiting and retries.
//!
//! Wraps the GitHub REST API v3 and implements the [`IssueTracker`] port.
//! Every request waits on a `governor` rate limiter sized to the
//! authenticated budget, and transient failures are retried with
//! exponential backoff.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::{self, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::GitHubApiError;
use super::models::{
    CreateIssueRequest, GitHubComment, GitHubIssue, GitHubMilestone, UpdateIssueRequest,
};
use crate::domain::models::{RetryConfig, SyncSettings};
use crate::domain::ports::{
    IssueDraft, IssueTracker, Milestone, RemoteComment, RemoteIssue, TrackerError, TrackerResult,
};

const PER_PAGE: usize = 100;
const USER_AGENT: &str = "issue-sync";
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GitHubClient`].
#[derive(Clone)]
pub struct GitHubClientConfig {
    pub token: String,
    /// API root, e.g. `https://api.github.com`
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub requests_per_hour: u32,
    pub retry: RetryConfig,
    pub timeout_secs: u64,
}

impl GitHubClientConfig {
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            token: settings.github_token.clone(),
            api_url: settings.api_url.clone(),
            owner: settings.repository.owner.clone(),
            repo: settings.repository.name.clone(),
            requests_per_hour: settings.requests_per_hour,
            retry: settings.retry.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

/// HTTP client for the GitHub issues of a single repository.
pub struct GitHubClient {
    http: Client,
    /// `{api_url}/repos/{owner}/{repo}`
    repo_url: String,
    rate_limiter: DefaultDirectRateLimiter,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a client; fails if the token cannot be sent as a header.
    pub fn new(config: GitHubClientConfig) -> Result<Self, GitHubApiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GitHubApiError::Unauthorized("token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GitHubApiError::from_reqwest(&e))?;

        let per_hour = NonZeroU32::new(config.requests_per_hour).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http,
            repo_url: format!(
                "{}/repos/{}/{}",
                config.api_url.trim_end_matches('/'),
                config.owner,
                config.repo
            ),
            rate_limiter: RateLimiter::direct(Quota::per_hour(per_hour)),
            retry: config.retry,
        })
    }

    fn backoff(&self) -> backoff::ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.retry.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.retry.max_backoff_ms))
            .with_max_elapsed_time(None)
            .build()
    }

    /// Send a request, retrying transient failures up to `max_retries` times.
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, GitHubApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = format!("{}{path}", self.repo_url);
        let max_retries = self.retry.max_retries;
        let max_delay = Duration::from_millis(self.retry.max_backoff_ms);
        let client = self;
        let mut attempt = 0u32;

        backoff::future::retry_notify(
            self.backoff(),
            move || {
                attempt += 1;
                let current = attempt;
                let mut request = client.http.request(method.clone(), &url);
                if let Some(body) = body {
                    request = request.json(body);
                }
                async move {
                    client.rate_limiter.until_ready().await;
                    dispatch(request).await.map_err(|err| {
                        if !err.is_transient() || current > max_retries {
                            backoff::Error::permanent(err)
                        } else if let Some(delay) = err.retry_after() {
                            backoff::Error::retry_after(err, delay.min(max_delay))
                        } else {
                            backoff::Error::transient(err)
                        }
                    })
                }
            },
            |err: GitHubApiError, delay: Duration| {
                tracing::warn!(
                    error = %err,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "GitHub request failed, retrying"
                );
            },
        )
        .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubApiError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    /// Follow `page=N` until a page comes back short.
    async fn paginate<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GitHubApiError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let batch: Vec<T> = self
                .get(&format!("{path}{separator}per_page={PER_PAGE}&page={page}"))
                .await?;
            let last = batch.len() < PER_PAGE;
            items.extend(batch);
            if last {
                return Ok(items);
            }
            page += 1;
        }
    }
}

async fn dispatch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GitHubApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| GitHubApiError::from_reqwest(&e))?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        return Err(GitHubApiError::from_status(status, body, retry_after));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| GitHubApiError::InvalidResponse(e.to_string()))
}

fn tracker_error(operation: &str) -> impl FnOnce(GitHubApiError) -> TrackerError + '_ {
    move |err| TrackerError::request(operation, err.to_string())
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn list_issues(&self) -> TrackerResult<Vec<RemoteIssue>> {
        let issues: Vec<GitHubIssue> = self
            .paginate("/issues?state=all&sort=created&direction=desc")
            .await
            .map_err(tracker_error("list issues"))?;
        Ok(issues.into_iter().map(RemoteIssue::from).collect())
    }

    async fn list_comments(&self, number: u64) -> TrackerResult<Vec<RemoteComment>> {
        let comments: Vec<GitHubComment> = self
            .paginate(&format!("/issues/{number}/comments"))
            .await
            .map_err(|e| TrackerError::request(format!("list comments for #{number}"), e.to_string()))?;
        Ok(comments.into_iter().map(RemoteComment::from).collect())
    }

    async fn list_milestones(&self) -> TrackerResult<Vec<Milestone>> {
        let milestones: Vec<GitHubMilestone> = self
            .paginate("/milestones?state=all")
            .await
            .map_err(tracker_error("list milestones"))?;
        Ok(milestones.into_iter().map(Milestone::from).collect())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> TrackerResult<RemoteIssue> {
        let body = CreateIssueRequest::from(draft);
        let issue: GitHubIssue = self
            .request(Method::POST, "/issues", Some(&body))
            .await
            .map_err(tracker_error("create issue"))?;
        Ok(issue.into())
    }

    async fn update_issue(&self, number: u64, draft: &IssueDraft) -> TrackerResult<RemoteIssue> {
        let body = UpdateIssueRequest::from(draft);
        let issue: GitHubIssue = self
            .request(Method::PATCH, &format!("/issues/{number}"), Some(&body))
            .await
            .map_err(|e| TrackerError::request(format!("update issue #{number}"), e.to_string()))?;
        Ok(issue.into())
    }
}
