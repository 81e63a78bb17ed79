//! cli::commands::changelog
//!
//! Print the changelog of one release.
//!
//! # Design
//!
//! Settings are resolved in this order (later overrides earlier):
//! defaults, global config, repo config, flags. The package repository
//! comes from `--repo`, else the `origin` remote. The package identity is
//! read from `Project.toml` in the work tree.
//!
//! # Example
//!
//! ```bash
//! tagnotes changelog v1.2.3 "$(git rev-parse HEAD)"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use tracing::debug;

use crate::changelog::Changelog;
use crate::cli::args::ChangelogArgs;
use crate::cli::Context;
use crate::core::config::{read_template, Config};
use crate::core::project::Project;
use crate::forge::github::{parse_github_url, parse_repo_slug, GitHubForge};
use crate::git::Git;

/// Run the changelog command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn changelog(ctx: &Context, args: &ChangelogArgs) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let text = rt.block_on(changelog_async(ctx, args))?;
    println!("{}", text);
    Ok(())
}

async fn changelog_async(ctx: &Context, args: &ChangelogArgs) -> Result<String> {
    let cwd = match &ctx.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let git = Git::open(&cwd).context("failed to open repository")?;
    let work_dir = git.work_dir()?.to_path_buf();
    let config = Config::load(Some(&work_dir)).context("failed to load config")?;
    let project = Project::load(&work_dir)?;

    let (owner, repo) = resolve_repo(args.repo.as_deref(), &git)?;
    let registry_slug = args
        .registry
        .clone()
        .unwrap_or_else(|| config.registry().to_string());
    let (registry_owner, registry_name) = parse_repo_slug(&registry_slug)
        .ok_or_else(|| anyhow!("invalid registry '{}', expected 'owner/name'", registry_slug))?;

    debug!(
        repo = %format!("{}/{}", owner, repo),
        registry = %registry_slug,
        package = %project.name,
        "changelog sources"
    );

    let github = |owner: String, name: String| {
        GitHubForge::new(owner, name)
            .with_token(args.token.clone())
            .with_api_base(config.api_base())
            .with_web_base(config.web_base())
    };

    let mut changelog = Changelog::new(
        Arc::new(github(owner, repo)),
        Arc::new(github(registry_owner, registry_name)),
        Box::new(git),
        project,
    )
    .with_registry_scan_limit(config.registry_scan_limit());

    if let Some(template) = resolve_template(args.template_file.as_deref(), &config, &cwd)? {
        changelog = changelog.with_template(template);
    }

    changelog
        .get(&args.version, &args.sha)
        .await
        .with_context(|| format!("failed to build changelog for {}", args.version))
}

/// `owner/name` of the package repository.
fn resolve_repo(flag: Option<&str>, git: &Git) -> Result<(String, String)> {
    if let Some(slug) = flag {
        return parse_repo_slug(slug)
            .ok_or_else(|| anyhow!("invalid repository '{}', expected 'owner/name'", slug));
    }

    let url = git
        .remote_url("origin")?
        .ok_or_else(|| anyhow!("no 'origin' remote; pass --repo owner/name"))?;
    parse_github_url(&url)
        .ok_or_else(|| anyhow!("'origin' ({}) is not a GitHub repository; pass --repo", url))
}

/// Template from `--template-file` (relative to `cwd`), else from config.
fn resolve_template(flag: Option<&Path>, config: &Config, cwd: &Path) -> Result<Option<String>> {
    if let Some(path) = flag {
        let path: PathBuf = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        return Ok(Some(read_template(&path)?));
    }
    Ok(config.template()?)
}
