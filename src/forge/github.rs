//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub. All operations are
//! `GET` requests against `/repos/{owner}/{repo}/...`, except profile lookups
//! under `/users/{login}`. List endpoints are
//! paginated with `per_page=100` until a short page or the caller's limit.
//!
//! # Authentication
//!
//! A bearer token is optional. Public repositories can be read without one,
//! at a much lower rate limit.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not implement automatic retry for rate limits (caller's responsibility)
//!
//! # Example
//!
//! ```ignore
//! use tagnotes::forge::github::GitHubForge;
//! use tagnotes::forge::Forge;
//!
//! let forge = GitHubForge::new("JuliaRegistries", "General").with_token(Some(token));
//! let releases = forge.list_releases().await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::traits::{
    ChangeItem, Forge, ForgeError, Issue, Label, ListClosedPullsOpts, Pull, PullRequest, Release,
    User,
};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default GitHub web base URL.
pub const DEFAULT_WEB_BASE: &str = "https://github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "tagnotes";

/// GitHub's maximum page size.
const PER_PAGE: usize = 100;

/// GitHub forge implementation.
///
/// Bound to a single `owner/repo`.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token, if any
    token: Option<String>,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
    /// Web base URL used for compare and tree links
    web_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &self.token.is_some())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("web_base", &self.web_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create an unauthenticated forge for `owner/repo` on github.com.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: None,
            owner: owner.into(),
            repo: repo.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            web_base: DEFAULT_WEB_BASE.to_string(),
        }
    }

    /// Create a forge from an `owner/repo` slug.
    ///
    /// Returns `None` if the slug is malformed.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let (owner, repo) = parse_repo_slug(slug)?;
        Some(Self::new(owner, repo))
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Use a custom API base URL (e.g., `https://github.example.com/api/v3`).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a custom web base URL (e.g., `https://github.example.com`).
    pub fn with_web_base(mut self, web_base: impl Into<String>) -> Self {
        self.web_base = web_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// GET a repository endpoint and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ForgeError> {
        self.get_json_at(&self.repo_url(path), query).await
    }

    /// GET an absolute API URL and decode the JSON body.
    async fn get_json_at<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ForgeError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// GET every page of a list endpoint, up to `limit` entries.
    async fn get_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        limit: usize,
    ) -> Result<Vec<T>, ForgeError> {
        let mut all: Vec<T> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut params = query.to_vec();
            params.push(("per_page", PER_PAGE.to_string()));
            params.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(path, &params).await?;
            let page_count = batch.len();

            for item in batch {
                if all.len() >= limit {
                    return Ok(all);
                }
                all.push(item);
            }

            // Stop if we hit the limit or no more pages
            if all.len() >= limit || page_count < PER_PAGE {
                break;
            }

            page += 1;
        }

        Ok(all)
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // Read headers before the body consumes the response.
        let headers = response.headers();
        let rate_limit_exhausted = headers
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");
        let required_permissions = headers
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if rate_limit_exhausted => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn repo(&self) -> &str {
        &self.repo
    }

    fn html_url(&self) -> String {
        format!("{}/{}/{}", self.web_base, self.owner, self.repo)
    }

    async fn list_releases(&self) -> Result<Vec<Release>, ForgeError> {
        let releases: Vec<GitHubRelease> = self.get_pages("releases", &[], usize::MAX).await?;
        Ok(releases.into_iter().map(Into::into).collect())
    }

    async fn list_closed_items(
        &self,
        since: NaiveDateTime,
    ) -> Result<Vec<ChangeItem>, ForgeError> {
        let query = [
            ("state", "closed".to_string()),
            (
                "since",
                since.and_utc().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
        ];
        let issues: Vec<GitHubIssue> = self.get_pages("issues", &query, usize::MAX).await?;
        Ok(issues.into_iter().map(Into::into).collect())
    }

    async fn issue_closer(&self, number: u64) -> Result<Option<User>, ForgeError> {
        let issue: GitHubIssueDetail = self.get_json(&format!("issues/{}", number), &[]).await?;
        Ok(issue.closed_by)
    }

    async fn pull_merger(&self, number: u64) -> Result<Option<User>, ForgeError> {
        let pull: GitHubPullDetail = self.get_json(&format!("pulls/{}", number), &[]).await?;
        Ok(pull.merged_by)
    }

    async fn user(&self, login: &str) -> Result<User, ForgeError> {
        let url = format!("{}/users/{}", self.api_base, login);
        self.get_json_at(&url, &[]).await
    }

    async fn list_closed_pulls(
        &self,
        opts: ListClosedPullsOpts,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        let mut query = vec![("state", "closed".to_string())];
        if let Some(head) = opts.head.clone() {
            query.push(("head", head));
        }

        let pulls: Vec<GitHubPullListItem> = self
            .get_pages("pulls", &query, opts.effective_limit())
            .await?;
        Ok(pulls.into_iter().map(Into::into).collect())
    }
}

// --------------------------------------------------------------------------
// API Response Types
// --------------------------------------------------------------------------

/// Error response from GitHub API.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Release entry from `GET /repos/{o}/{r}/releases`.
#[derive(Deserialize)]
struct GitHubRelease {
    tag_name: String,
    target_commitish: String,
}

impl From<GitHubRelease> for Release {
    fn from(gh: GitHubRelease) -> Self {
        Release::new(gh.tag_name, gh.target_commitish)
    }
}

/// Entry from `GET /repos/{o}/{r}/issues`, which mixes issues and pulls.
#[derive(Deserialize)]
struct GitHubIssue {
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    labels: Vec<Label>,
    user: User,
    closed_at: Option<DateTime<Utc>>,
    /// Present only on pull requests
    #[serde(default)]
    pull_request: Option<GitHubPullMarker>,
}

#[derive(Deserialize)]
struct GitHubPullMarker {
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
}

impl From<GitHubIssue> for ChangeItem {
    fn from(gh: GitHubIssue) -> Self {
        match gh.pull_request {
            Some(marker) => ChangeItem::Pull(Pull {
                number: gh.number,
                title: gh.title,
                body: gh.body,
                html_url: gh.html_url,
                labels: gh.labels,
                user: gh.user,
                closed_at: gh.closed_at,
                merged_at: marker.merged_at,
                merged_by: None,
            }),
            None => ChangeItem::Issue(Issue {
                number: gh.number,
                title: gh.title,
                body: gh.body,
                html_url: gh.html_url,
                labels: gh.labels,
                user: gh.user,
                closed_at: gh.closed_at,
                closed_by: None,
            }),
        }
    }
}

/// Single issue from `GET /repos/{o}/{r}/issues/{n}`.
#[derive(Deserialize)]
struct GitHubIssueDetail {
    #[serde(default)]
    closed_by: Option<User>,
}

/// Single pull from `GET /repos/{o}/{r}/pulls/{n}`.
#[derive(Deserialize)]
struct GitHubPullDetail {
    #[serde(default)]
    merged_by: Option<User>,
}

/// Entry from `GET /repos/{o}/{r}/pulls`.
#[derive(Deserialize)]
struct GitHubPullListItem {
    number: u64,
    html_url: String,
    title: String,
    body: Option<String>,
    head: GitHubBranchRef,
    merged_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GitHubBranchRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

impl From<GitHubPullListItem> for PullRequest {
    fn from(gh: GitHubPullListItem) -> Self {
        PullRequest {
            number: gh.number,
            url: gh.html_url,
            head: gh.head.ref_name,
            title: gh.title,
            body: gh.body,
            merged: gh.merged_at.is_some(),
            closed_at: gh.closed_at,
        }
    }
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use tagnotes::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:octocat/Hello.jl.git").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "Hello.jl");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    parse_repo_slug(rest)
}

/// Parse an `owner/repo` slug.
///
/// # Example
///
/// ```
/// use tagnotes::forge::github::parse_repo_slug;
///
/// assert_eq!(
///     parse_repo_slug("JuliaRegistries/General"),
///     Some(("JuliaRegistries".to_string(), "General".to_string()))
/// );
/// assert_eq!(parse_repo_slug("General"), None);
/// ```
pub fn parse_repo_slug(slug: &str) -> Option<(String, String)> {
    let (owner, repo) = slug.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
