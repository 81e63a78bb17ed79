//! changelog
//!
//! The changelog of one release, collected from the forge, the registry
//! and local history.
//!
//! # Overview
//!
//! [`Changelog::get`] runs these steps:
//! 1. Pick the previous final release below the target version.
//! 2. Bound the window by commit dates: the previous release's commit (or
//!    the first commit) up to the release commit.
//! 3. Fetch closed issues and merged pull requests in that window.
//! 4. Look up custom notes in the registry pull request.
//! 5. Render everything through the template.
//!
//! Failures from the forge or from git stop the run; nothing is retried.
//! Missing pieces (no previous release, no registry pull request, no
//! notes) are not errors, they only leave keys out of the context.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use tagnotes::changelog::Changelog;
//! use tagnotes::core::project::Project;
//! use tagnotes::forge::github::GitHubForge;
//! use tagnotes::git::Git;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let git = Git::open(Path::new("."))?;
//! let project = Project::load(git.work_dir()?)?;
//!
//! let changelog = Changelog::new(
//!     Arc::new(GitHubForge::new("Me", "PkgName.jl")),
//!     Arc::new(GitHubForge::new("JuliaRegistries", "General")),
//!     Box::new(git),
//!     project,
//! );
//! let text = changelog.get("v1.2.3", "abcdef").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod collect;
pub mod format;
pub mod registry;
pub mod render;
pub mod window;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::core::project::Project;
use crate::core::version::previous_release;
use crate::forge::{Forge, ForgeError, ListClosedPullsOpts, Release};
use crate::git::{CommitLog, GitError};

use self::format::{format_issue, format_pull};
use self::registry::RegistryLookup;
use self::render::{RenderError, Renderer, TemplateContext};

/// Errors from building a changelog.
#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error(transparent)]
    Forge(#[from] ForgeError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("commit date of '{rev}' is not RFC 3339: '{value}'")]
    InvalidCommitDate { rev: String, value: String },

    #[error("repository has no commits")]
    EmptyHistory,
}

/// Changelog generator for one package repository.
pub struct Changelog {
    repo: Arc<dyn Forge>,
    registry: Arc<dyn Forge>,
    history: Box<dyn CommitLog>,
    project: Project,
    renderer: Renderer,
    registry_scan_limit: usize,
}

impl Changelog {
    /// Create a changelog generator using the default template.
    pub fn new(
        repo: Arc<dyn Forge>,
        registry: Arc<dyn Forge>,
        history: Box<dyn CommitLog>,
        project: Project,
    ) -> Self {
        Self {
            repo,
            registry,
            history,
            project,
            renderer: Renderer::default(),
            registry_scan_limit: ListClosedPullsOpts::DEFAULT_LIMIT,
        }
    }

    /// Use `template` instead of the default template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.renderer = Renderer::new(template);
        self
    }

    /// Scan this many closed registry pull requests when the head filter
    /// finds nothing.
    pub fn with_registry_scan_limit(mut self, limit: usize) -> Self {
        self.registry_scan_limit = limit;
        self
    }

    /// Render the changelog for `version`, released at commit `sha`.
    pub async fn get(&self, version: &str, sha: &str) -> Result<String, ChangelogError> {
        let context = self.collect_data(version, sha).await?;
        let text = self.renderer.render(&context)?;
        info!(version, "changelog rendered");
        Ok(text)
    }

    /// The release immediately preceding `version`, if any.
    pub async fn previous_release(&self, version: &str) -> Result<Option<Release>, ForgeError> {
        let releases = self.repo.list_releases().await?;
        Ok(previous_release(&releases, version).cloned())
    }

    /// Custom release notes from the registry pull request of `version`.
    pub async fn custom_release_notes(&self, version: &str) -> Result<Option<String>, ForgeError> {
        RegistryLookup::new(self.registry.as_ref(), &self.project)
            .with_scan_limit(self.registry_scan_limit)
            .custom_release_notes(version)
            .await
    }

    /// Collect everything the template can refer to.
    pub async fn collect_data(
        &self,
        version: &str,
        sha: &str,
    ) -> Result<TemplateContext, ChangelogError> {
        let previous = self.previous_release(version).await?;

        let end = window::version_end(self.history.as_ref(), sha)?;
        let start = match &previous {
            Some(release) => window::version_end(self.history.as_ref(), release.commit_ref())?,
            None => {
                let first = window::first_sha(self.history.as_ref())?;
                window::version_end(self.history.as_ref(), &first)?
            }
        };
        debug!(%start, %end, "changelog window");

        let items = collect::issues_and_pulls(self.repo.as_ref(), start, end).await?;
        let issues: Vec<_> = collect::issues(&items).map(format_issue).collect();
        let pulls: Vec<_> = collect::pulls(&items).map(format_pull).collect();

        let custom = self.custom_release_notes(version).await?;

        let html_url = self.repo.html_url();
        let previous_release = previous.map(|r| r.tag);
        let compare_url = previous_release
            .as_ref()
            .map(|prev| format!("{}/compare/{}...{}", html_url, prev, version));

        Ok(TemplateContext {
            package: self.project.name.clone(),
            version: version.to_string(),
            previous_release,
            compare_url,
            version_url: format!("{}/tree/{}", html_url, version),
            custom,
            issues: non_empty(issues),
            pulls: non_empty(pulls),
        })
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
