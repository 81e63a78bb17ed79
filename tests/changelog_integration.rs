//! End-to-end changelog tests over MockForge and a stubbed history.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use tagnotes::changelog::Changelog;
use tagnotes::core::project::Project;
use tagnotes::forge::mock::{MockForge, MockOperation};
use tagnotes::forge::{ChangeItem, Issue, Label, Pull, PullRequest, Release, User};
use tagnotes::git::{CommitLog, GitError};

const PREV_SHA: &str = "2222222222222222222222222222222222222222";
const RELEASE_SHA: &str = "3333333333333333333333333333333333333333";

/// History with a fixed date per revision.
struct StubHistory {
    dates: HashMap<String, String>,
    ids: Vec<String>,
}

impl StubHistory {
    fn new() -> Self {
        let mut dates = HashMap::new();
        dates.insert("first".to_string(), "2019-01-01T00:00:00+00:00".to_string());
        dates.insert(PREV_SHA.to_string(), "2019-06-01T12:00:00+02:00".to_string());
        dates.insert(RELEASE_SHA.to_string(), "2019-10-05T13:45:17+07:00".to_string());
        Self {
            dates,
            ids: vec![RELEASE_SHA.to_string(), PREV_SHA.to_string(), "first".to_string()],
        }
    }
}

impl CommitLog for StubHistory {
    fn committer_date(&self, rev: &str) -> Result<String, GitError> {
        self.dates.get(rev).cloned().ok_or_else(|| GitError::RefNotFound {
            refname: rev.to_string(),
        })
    }

    fn commit_ids(&self) -> Result<Vec<String>, GitError> {
        Ok(self.ids.clone())
    }
}

fn project() -> Project {
    Project::new(
        "PkgName",
        Uuid::parse_str("abcdef01-2345-6789-abcd-ef0123456789").unwrap(),
    )
}

fn user(login: &str) -> User {
    User {
        login: login.to_string(),
        name: None,
        html_url: format!("https://github.com/{}", login),
    }
}

fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, month, day, 0, 0, 0).unwrap()
}

fn issue(number: u64, title: &str, closed: DateTime<Utc>, labels: &[&str]) -> ChangeItem {
    ChangeItem::Issue(Issue {
        number,
        title: title.to_string(),
        body: None,
        html_url: format!("https://github.com/Me/PkgName.jl/issues/{}", number),
        labels: labels
            .iter()
            .map(|l| Label {
                name: l.to_string(),
            })
            .collect(),
        user: user("reporter"),
        closed_at: Some(closed),
        closed_by: Some(user("closer")),
    })
}

fn pull(number: u64, title: &str, closed: DateTime<Utc>, merged: bool) -> ChangeItem {
    ChangeItem::Pull(Pull {
        number,
        title: title.to_string(),
        body: None,
        html_url: format!("https://github.com/Me/PkgName.jl/pull/{}", number),
        labels: vec![],
        user: user("author"),
        closed_at: Some(closed),
        merged_at: merged.then_some(closed),
        merged_by: merged.then(|| user("merger")),
    })
}

fn registry_pr(number: u64, head: &str, body: &str) -> PullRequest {
    PullRequest {
        number,
        url: format!("https://github.com/JuliaRegistries/General/pull/{}", number),
        head: head.to_string(),
        title: format!("New version: PkgName {}", number),
        body: Some(body.to_string()),
        merged: true,
        closed_at: Some(at(10, 5)),
    }
}

fn repo() -> MockForge {
    MockForge::new("Me", "PkgName.jl")
        .with_releases(vec![
            Release::new("v1.2.4-rc1", "master"),
            Release::new("v1.2.2", PREV_SHA),
            Release::new("v1.0.10", "master"),
            Release::new("not-a-version", "master"),
        ])
        .with_items(vec![
            issue(1, "Issue title", at(7, 1), &[]),
            issue(2, "Old issue", at(5, 1), &[]),
            issue(5, "Internal chore", at(7, 2), &["changelog-skip"]),
            pull(3, "Pull title", at(8, 1), true),
            pull(4, "Abandoned pull", at(8, 2), false),
            pull(6, "Too late", at(11, 1), true),
        ])
}

fn registry() -> MockForge {
    let notes = "Registering PkgName\n\
        <!-- BEGIN RELEASE NOTES -->\n\
        > Custom release notes\n\
        <!-- END RELEASE NOTES -->\n\
        Generated by Registrator";
    MockForge::new("JuliaRegistries", "General").with_closed_pulls(vec![
        registry_pr(100, "registrator/pkgname/abcdef01/v1.2.2", "old"),
        registry_pr(101, "registrator/pkgname/abcdef01/v1.2.3", notes),
    ])
}

fn changelog(repo: MockForge, registry: MockForge) -> Changelog {
    Changelog::new(
        Arc::new(repo),
        Arc::new(registry),
        Box::new(StubHistory::new()),
        project(),
    )
}

#[tokio::test]
async fn default_changelog() {
    let text = changelog(repo(), registry())
        .get("v1.2.3", RELEASE_SHA)
        .await
        .unwrap();

    let expected = "\
## PkgName v1.2.3

[Diff since v1.2.2](https://github.com/Me/PkgName.jl/compare/v1.2.2...v1.2.3)

Custom release notes

**Closed issues:**
- Issue title (#1)

**Merged pull requests:**
- Pull title (#3) (@author)";
    assert_eq!(text, expected);
}

#[tokio::test]
async fn window_starts_at_previous_release_commit() {
    let forge = repo();
    changelog(forge.clone(), registry())
        .collect_data("v1.2.3", RELEASE_SHA)
        .await
        .unwrap();

    // 2019-06-01T12:00:00+02:00
    let since = Utc.with_ymd_and_hms(2019, 6, 1, 10, 0, 0).unwrap().naive_utc();
    assert_eq!(
        forge.operations(),
        vec![
            MockOperation::ListReleases,
            MockOperation::ListClosedItems { since },
            MockOperation::IssueCloser { number: 1 },
            MockOperation::User {
                login: "reporter".to_string()
            },
            MockOperation::User {
                login: "closer".to_string()
            },
            MockOperation::IssueCloser { number: 5 },
            MockOperation::PullMerger { number: 3 },
            MockOperation::User {
                login: "author".to_string()
            },
            MockOperation::User {
                login: "merger".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn closing_actors_reach_the_template() {
    let text = changelog(repo(), registry())
        .with_template(
            "{% for i in issues %}{{ i.closer.username }} {% endfor %}\
             {% for p in pulls %}{{ p.merger.username }}{% endfor %}",
        )
        .get("v1.2.3", RELEASE_SHA)
        .await
        .unwrap();
    assert_eq!(text, "closer merger");
}

#[tokio::test]
async fn display_names_reach_the_template() {
    let named = |login: &str, name: &str| User {
        name: Some(name.to_string()),
        ..user(login)
    };
    let forge = repo().with_users(vec![
        named("author", "Ada Author"),
        named("closer", "Cy Closer"),
        named("merger", "Mo Merger"),
    ]);

    let text = changelog(forge, registry())
        .with_template(
            "{% for i in issues %}{{ i.author.name or i.author.username }}/{{ i.closer.name }} {% endfor %}\
             {% for p in pulls %}{{ p.author.name }}/{{ p.merger.name }}{% endfor %}",
        )
        .get("v1.2.3", RELEASE_SHA)
        .await
        .unwrap();
    assert_eq!(text, "reporter/Cy Closer Ada Author/Mo Merger");
}

#[tokio::test]
async fn first_release_uses_initial_commit() {
    let forge = MockForge::new("Me", "PkgName.jl").with_items(vec![
        issue(1, "Early issue", at(2, 1), &[]),
    ]);
    let text = changelog(forge, MockForge::new("JuliaRegistries", "General"))
        .get("v0.1.0", RELEASE_SHA)
        .await
        .unwrap();

    assert_eq!(
        text,
        "## PkgName v0.1.0\n\n\
         [Initial release](https://github.com/Me/PkgName.jl/tree/v0.1.0)\n\n\
         **Closed issues:**\n\
         - Early issue (#1)"
    );
}

#[tokio::test]
async fn version_only_template() {
    let text = changelog(repo(), registry())
        .with_template("{{ version }}")
        .get("v1.2.3", RELEASE_SHA)
        .await
        .unwrap();
    assert_eq!(text, "v1.2.3");
}

#[tokio::test]
async fn registry_fallback_scan_finds_notes() {
    let registry = registry().ignore_head_filter();
    let context = changelog(repo(), registry.clone())
        .collect_data("v1.2.3", RELEASE_SHA)
        .await
        .unwrap();

    assert_eq!(context.custom.as_deref(), Some("Custom release notes"));
    assert_eq!(
        registry.operations(),
        vec![
            MockOperation::ListClosedPulls {
                head: Some("JuliaRegistries:registrator/pkgname/abcdef01/v1.2.3".to_string())
            },
            MockOperation::ListClosedPulls { head: None },
        ]
    );
}
