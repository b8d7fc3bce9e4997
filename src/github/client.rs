use super::RepoAccess;
use crate::error::{Result, TrackerError};
use crate::model::{CommitRecord, DateWindow};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PER_PAGE: &str = "100";

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// What a request was for; decides how a 404 is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Organization,
    Branches,
    Commits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth another attempt after backoff.
    Retryable,
    /// Skip this query and carry on.
    Transient,
    /// Abort the whole run.
    Fatal,
}

/// `rate_limited` covers both the primary quota and secondary limits, which
/// GitHub reports as a 403 with quota left.
pub fn classify_status(status: StatusCode, rate_limited: bool, target: Target) -> FailureKind {
    match status {
        StatusCode::UNAUTHORIZED => FailureKind::Fatal,
        StatusCode::FORBIDDEN if rate_limited => FailureKind::Retryable,
        StatusCode::FORBIDDEN => FailureKind::Fatal,
        StatusCode::TOO_MANY_REQUESTS => FailureKind::Retryable,
        StatusCode::NOT_FOUND if target == Target::Organization => FailureKind::Fatal,
        s if s.is_server_error() => FailureKind::Retryable,
        _ => FailureKind::Transient,
    }
}

/// Delay requested by a `retry-after` header, in whole seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn is_rate_limited(headers: &HeaderMap, body: &str) -> bool {
    let quota_spent = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");
    quota_spent
        || headers.contains_key(RETRY_AFTER)
        || body.to_ascii_lowercase().contains("rate limit")
}

/// Extract the `rel="next"` URL from a `Link` header value.
pub fn next_link(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let url = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == r#"rel="next""#);
        if !is_next {
            return None;
        }
        url.strip_prefix('<')
            .and_then(|u| u.strip_suffix('>'))
            .map(str::to_string)
    })
}

#[derive(Deserialize)]
struct ApiRepository {
    full_name: String,
}

#[derive(Deserialize)]
struct ApiBranch {
    name: String,
}

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
    html_url: Option<String>,
    commit: ApiCommitDetail,
    author: Option<ApiUser>,
}

#[derive(Deserialize)]
struct ApiCommitDetail {
    message: String,
    author: Option<ApiGitAuthor>,
}

#[derive(Deserialize)]
struct ApiGitAuthor {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ApiUser {
    login: String,
}

pub struct GitHubClient {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_URL, RetryConfig::default())
    }

    pub fn with_base_url(token: &str, base_url: &str, retry: RetryConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TrackerError::Config(format!("GitHub token is not a valid header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        let client = Client::builder()
            .user_agent(concat!("commit-tracker/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TrackerError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        target: Target,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut response = self.send(&format!("{}{}", self.base_url, path), query, target)?;

        loop {
            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_link);

            let page: Vec<T> = response.json().map_err(|e| {
                TrackerError::TransientFetch(format!("Malformed response from {path}: {e}"))
            })?;
            items.extend(page);

            match next {
                Some(url) => response = self.send(&url, &[], target)?,
                None => break,
            }
        }

        Ok(items)
    }

    fn send(&self, url: &str, query: &[(&str, String)], target: Target) -> Result<Response> {
        let mut attempt = 0;
        loop {
            let (failure, requested_delay) = match self.client.get(url).query(query).send() {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    let body = response.text().unwrap_or_default();
                    let message = format!("{url} returned {status}: {}", body.trim());
                    match classify_status(status, is_rate_limited(&headers, &body), target) {
                        FailureKind::Fatal => return Err(TrackerError::FatalFetch(message)),
                        FailureKind::Transient => return Err(TrackerError::TransientFetch(message)),
                        FailureKind::Retryable => (message, retry_after(&headers)),
                    }
                }
                Err(e) => (format!("{url}: {e}"), None),
            };

            if attempt >= self.retry.max_retries {
                return Err(TrackerError::TransientFetch(format!(
                    "{failure} (gave up after {} retries)",
                    self.retry.max_retries
                )));
            }

            let delay = requested_delay.unwrap_or_else(|| self.retry.backoff(attempt));
            warn!(%failure, attempt = attempt + 1, ?delay, "retrying GitHub request");
            thread::sleep(delay);
            attempt += 1;
        }
    }
}

impl RepoAccess for GitHubClient {
    fn list_repositories(&self, organization: &str) -> Result<Vec<String>> {
        let repos: Vec<ApiRepository> = self.get_all(
            &format!("/orgs/{organization}/repos"),
            &[("type", "all".to_string()), ("per_page", PER_PAGE.to_string())],
            Target::Organization,
        )?;
        debug!(organization, count = repos.len(), "listed repositories");
        Ok(repos.into_iter().map(|r| r.full_name).collect())
    }

    fn list_branches(&self, repository: &str) -> Result<Vec<String>> {
        let branches: Vec<ApiBranch> = self.get_all(
            &format!("/repos/{repository}/branches"),
            &[("per_page", PER_PAGE.to_string())],
            Target::Branches,
        )?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    fn fetch_commits(
        &self,
        repository: &str,
        branch: &str,
        user: &str,
        window: &DateWindow,
    ) -> Result<Vec<CommitRecord>> {
        let query = [
            ("sha", branch.to_string()),
            ("author", user.to_string()),
            ("since", window.since().to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("until", window.until().to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("per_page", PER_PAGE.to_string()),
        ];
        let commits: Vec<ApiCommit> =
            self.get_all(&format!("/repos/{repository}/commits"), &query, Target::Commits)?;

        let records = commits
            .into_iter()
            .filter(|c| {
                c.author
                    .as_ref()
                    .is_some_and(|a| a.login.eq_ignore_ascii_case(user))
            })
            .filter_map(|c| {
                let git_author = c.commit.author?;
                Some(CommitRecord {
                    sha: c.sha,
                    author: user.to_string(),
                    author_name: git_author.name.unwrap_or_else(|| "Unknown".to_string()),
                    message: c.commit.message.trim().to_string(),
                    timestamp: git_author.date?,
                    repository: repository.to_string(),
                    branch: branch.to_string(),
                    url: c.html_url,
                })
            })
            .collect();

        Ok(records)
    }
}
