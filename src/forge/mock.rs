//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge provides a deterministic implementation of the `Forge` trait
//! for use in tests. It serves releases, closed items, closed pull requests
//! and user profiles from memory, records every call, and can be configured to fail.
//!
//! # Example
//!
//! ```
//! use tagnotes::forge::mock::MockForge;
//! use tagnotes::forge::{Forge, Release};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new("Me", "PkgName.jl")
//!     .with_releases(vec![Release::new("v1.0.0", "master")]);
//!
//! let releases = forge.list_releases().await.unwrap();
//! assert_eq!(releases[0].tag, "v1.0.0");
//! # });
//! ```

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex};

use super::traits::{
    ChangeItem, Forge, ForgeError, ListClosedPullsOpts, PullRequest, Release, User,
};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    owner: String,
    repo: String,
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockForgeInner {
    releases: Vec<Release>,
    /// Closed items, with closers/mergers already filled in.
    items: Vec<ChangeItem>,
    closed_pulls: Vec<PullRequest>,
    /// Profiles served by `user`.
    users: Vec<User>,
    /// Return nothing for head-filtered pull queries.
    ignore_head_filter: bool,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    ListReleases(ForgeError),
    ListClosedItems(ForgeError),
    IssueCloser(ForgeError),
    PullMerger(ForgeError),
    User(ForgeError),
    ListClosedPulls(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    ListReleases,
    ListClosedItems { since: NaiveDateTime },
    IssueCloser { number: u64 },
    PullMerger { number: u64 },
    User { login: String },
    ListClosedPulls { head: Option<String> },
}

impl MockForge {
    /// Create an empty mock forge for `owner/repo`.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            inner: Arc::new(Mutex::new(MockForgeInner::default())),
        }
    }

    /// Serve these releases.
    pub fn with_releases(self, releases: Vec<Release>) -> Self {
        self.lock().releases = releases;
        self
    }

    /// Serve these closed issues and pull requests.
    ///
    /// `closed_by`/`merged_by` on the given items are what
    /// `issue_closer`/`pull_merger` return; the listing strips them.
    pub fn with_items(self, items: Vec<ChangeItem>) -> Self {
        self.lock().items = items;
        self
    }

    /// Serve these closed pull requests.
    pub fn with_closed_pulls(self, pulls: Vec<PullRequest>) -> Self {
        self.lock().closed_pulls = pulls;
        self
    }

    /// Serve these user profiles.
    ///
    /// Logins without a profile here resolve to a user with no display name.
    pub fn with_users(self, users: Vec<User>) -> Self {
        self.lock().users = users;
        self
    }

    /// Make head-filtered pull queries come back empty, as GitHub does for
    /// some branch names.
    pub fn ignore_head_filter(self) -> Self {
        self.lock().ignore_head_filter = true;
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use tagnotes::forge::mock::{MockForge, FailOn};
    /// use tagnotes::forge::ForgeError;
    ///
    /// let forge = MockForge::new("o", "r")
    ///     .fail_on(FailOn::ListReleases(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockForgeInner> {
        // A poisoned lock only happens after a panicking test thread.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    fn check_fail(&self, op: &str) -> Result<(), ForgeError> {
        let inner = self.lock();
        let err = match (&inner.fail_on, op) {
            (Some(FailOn::ListReleases(e)), "list_releases")
            | (Some(FailOn::ListClosedItems(e)), "list_closed_items")
            | (Some(FailOn::IssueCloser(e)), "issue_closer")
            | (Some(FailOn::PullMerger(e)), "pull_merger")
            | (Some(FailOn::User(e)), "user")
            | (Some(FailOn::ListClosedPulls(e)), "list_closed_pulls") => e.clone(),
            _ => return Ok(()),
        };
        Err(err)
    }

    fn find_item(&self, number: u64) -> Option<ChangeItem> {
        self.lock()
            .items
            .iter()
            .find(|i| i.number() == number)
            .cloned()
    }
}

/// Drop closing actors, matching what the listing endpoint returns.
fn shallow(item: &ChangeItem) -> ChangeItem {
    match item {
        ChangeItem::Issue(issue) => {
            let mut issue = issue.clone();
            issue.closed_by = None;
            ChangeItem::Issue(issue)
        }
        ChangeItem::Pull(pull) => {
            let mut pull = pull.clone();
            pull.merged_by = None;
            ChangeItem::Pull(pull)
        }
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn repo(&self) -> &str {
        &self.repo
    }

    fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    async fn list_releases(&self) -> Result<Vec<Release>, ForgeError> {
        self.record(MockOperation::ListReleases);
        self.check_fail("list_releases")?;
        Ok(self.lock().releases.clone())
    }

    async fn list_closed_items(
        &self,
        since: NaiveDateTime,
    ) -> Result<Vec<ChangeItem>, ForgeError> {
        self.record(MockOperation::ListClosedItems { since });
        self.check_fail("list_closed_items")?;
        Ok(self.lock().items.iter().map(shallow).collect())
    }

    async fn issue_closer(&self, number: u64) -> Result<Option<User>, ForgeError> {
        self.record(MockOperation::IssueCloser { number });
        self.check_fail("issue_closer")?;
        match self.find_item(number) {
            Some(ChangeItem::Issue(issue)) => Ok(issue.closed_by),
            _ => Err(ForgeError::NotFound(format!("issue #{}", number))),
        }
    }

    async fn pull_merger(&self, number: u64) -> Result<Option<User>, ForgeError> {
        self.record(MockOperation::PullMerger { number });
        self.check_fail("pull_merger")?;
        match self.find_item(number) {
            Some(ChangeItem::Pull(pull)) => Ok(pull.merged_by),
            _ => Err(ForgeError::NotFound(format!("pull request #{}", number))),
        }
    }

    async fn user(&self, login: &str) -> Result<User, ForgeError> {
        self.record(MockOperation::User {
            login: login.to_string(),
        });
        self.check_fail("user")?;
        let known = self.lock().users.iter().find(|u| u.login == login).cloned();
        Ok(known.unwrap_or_else(|| User {
            login: login.to_string(),
            name: None,
            html_url: format!("https://github.com/{}", login),
        }))
    }

    async fn list_closed_pulls(
        &self,
        opts: ListClosedPullsOpts,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        self.record(MockOperation::ListClosedPulls {
            head: opts.head.clone(),
        });
        self.check_fail("list_closed_pulls")?;

        let inner = self.lock();
        let pulls = inner.closed_pulls.iter();
        let matched: Vec<PullRequest> = match opts.head {
            Some(_) if inner.ignore_head_filter => Vec::new(),
            Some(ref head) => pulls
                .filter(|p| format!("{}:{}", self.owner, p.head) == *head)
                .take(opts.effective_limit())
                .cloned()
                .collect(),
            None => pulls.take(opts.effective_limit()).cloned().collect(),
        };
        Ok(matched)
    }
}
