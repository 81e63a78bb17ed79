//! changelog::registry
//!
//! Registry pull request lookup and custom release notes.
//!
//! # Design
//!
//! A release is registered through a pull request against the registry
//! repository, opened from the branch
//! `registrator/<name>/<uuid prefix>/<version>`. The head filter of the
//! pull request listing is tried first. It misses some branch names, so an
//! empty answer falls back to scanning recent closed pull requests and
//! comparing the branch byte for byte.
//!
//! Release authors can put notes in that pull request's body between
//! [`BEGIN_MARKER`] and [`END_MARKER`], usually block-quoted.

use tracing::{debug, info};

use crate::core::project::Project;
use crate::forge::{Forge, ForgeError, ListClosedPullsOpts, PullRequest};

/// Line opening the custom notes block.
pub const BEGIN_MARKER: &str = "<!-- BEGIN RELEASE NOTES -->";

/// Line closing the custom notes block.
pub const END_MARKER: &str = "<!-- END RELEASE NOTES -->";

/// Registry pull request lookups for one project.
pub struct RegistryLookup<'a> {
    registry: &'a dyn Forge,
    project: &'a Project,
    scan_limit: usize,
}

impl<'a> RegistryLookup<'a> {
    pub fn new(registry: &'a dyn Forge, project: &'a Project) -> Self {
        Self {
            registry,
            project,
            scan_limit: ListClosedPullsOpts::DEFAULT_LIMIT,
        }
    }

    /// Number of closed pull requests the fallback scan looks at.
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Branch the registration pull request for `version` is opened from.
    ///
    /// # Example
    ///
    /// ```
    /// use tagnotes::changelog::registry::RegistryLookup;
    /// use tagnotes::core::project::Project;
    /// use tagnotes::forge::mock::MockForge;
    /// use uuid::Uuid;
    ///
    /// let uuid = Uuid::parse_str("abcdef01-2345-6789-abcd-ef0123456789").unwrap();
    /// let project = Project::new("PkgName", uuid);
    /// let registry = MockForge::new("JuliaRegistries", "General");
    /// let lookup = RegistryLookup::new(&registry, &project);
    /// assert_eq!(lookup.branch("v1.2.3"), "registrator/pkgname/abcdef01/v1.2.3");
    /// ```
    pub fn branch(&self, version: &str) -> String {
        format!(
            "registrator/{}/{}/{}",
            self.project.name.to_lowercase(),
            self.project.short_uuid(),
            version
        )
    }

    /// Find the registry pull request for `version`.
    ///
    /// Returns `Ok(None)` if neither the head filter nor the scan finds it.
    pub async fn registry_pr(&self, version: &str) -> Result<Option<PullRequest>, ForgeError> {
        let branch = self.branch(version);
        let head = format!("{}:{}", self.registry.owner(), branch);

        let mut opts = ListClosedPullsOpts::with_head(head);
        opts.limit = Some(1);
        if let Some(pr) = self.registry.list_closed_pulls(opts).await?.into_iter().next() {
            debug!(number = pr.number, %branch, "registry pull request found by head");
            return Ok(Some(pr));
        }

        debug!(%branch, limit = self.scan_limit, "head filter missed, scanning closed pull requests");
        let opts = ListClosedPullsOpts {
            head: None,
            limit: Some(self.scan_limit),
        };
        let found = self
            .registry
            .list_closed_pulls(opts)
            .await?
            .into_iter()
            .find(|pr| pr.head == branch);

        match &found {
            Some(pr) => debug!(number = pr.number, "registry pull request found by scan"),
            None => info!(%branch, "no registry pull request found"),
        }
        Ok(found)
    }

    /// Custom release notes for `version`, if its registry pull request
    /// carries any.
    pub async fn custom_release_notes(&self, version: &str) -> Result<Option<String>, ForgeError> {
        let Some(pr) = self.registry_pr(version).await? else {
            return Ok(None);
        };

        let notes = pr.body.as_deref().and_then(extract_release_notes);
        debug!(number = pr.number, found = notes.is_some(), "custom release notes");
        Ok(notes)
    }
}

/// Extract the custom notes block from a pull request body.
///
/// Each marker has to sit alone on its line. Inside the block a leading
/// `> ` is removed from every line and the result is trimmed. Returns
/// `None` if a marker is missing or the block is empty.
///
/// # Example
///
/// ```
/// use tagnotes::changelog::registry::extract_release_notes;
///
/// let body = "intro\n<!-- BEGIN RELEASE NOTES -->\n> Foo\n> Bar\n<!-- END RELEASE NOTES -->\n";
/// assert_eq!(extract_release_notes(body).as_deref(), Some("Foo\nBar"));
/// ```
pub fn extract_release_notes(body: &str) -> Option<String> {
    let mut lines = body.lines();
    lines.by_ref().find(|line| line.trim() == BEGIN_MARKER)?;

    let mut block = Vec::new();
    for line in lines {
        if line.trim() == END_MARKER {
            let notes = block.join("\n");
            let notes = notes.trim();
            return (!notes.is_empty()).then(|| notes.to_string());
        }
        block.push(unquote(line));
    }
    None
}

fn unquote(line: &str) -> &str {
    let stripped = line.trim_start();
    stripped
        .strip_prefix("> ")
        .or_else(|| stripped.strip_prefix('>'))
        .unwrap_or(line)
}
