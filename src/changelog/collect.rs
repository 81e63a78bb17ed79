//! changelog::collect
//!
//! Closed issues and merged pull requests inside the reporting window.
//!
//! One listing query returns both kinds of entity. [`issues`] and [`pulls`]
//! are pure filters over that one result, so callers fetch once and split.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use crate::forge::{ChangeItem, Forge, ForgeError, Issue, Pull, User};

/// Fetch the issues and pull requests closed in `[start, end)`.
///
/// Pull requests closed without merging are dropped. The closing actor
/// of every kept item is fetched and filled in, and the author and closing
/// actor get their display names (one profile lookup per login).
///
/// # Errors
///
/// Any forge error is returned unchanged.
pub async fn issues_and_pulls(
    forge: &dyn Forge,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<ChangeItem>, ForgeError> {
    let listed = forge.list_closed_items(start).await?;
    let mut names = DisplayNames::new(forge);
    let mut items = Vec::with_capacity(listed.len());

    for item in listed {
        if !in_window(item.closed_at(), start, end) {
            debug!(kind = %item.kind(), number = item.number(), "closed outside window");
            continue;
        }

        match item {
            ChangeItem::Issue(mut issue) => {
                issue.closed_by = forge.issue_closer(issue.number).await?;
                names.fill(&mut issue.user).await?;
                if let Some(closer) = issue.closed_by.as_mut() {
                    names.fill(closer).await?;
                }
                items.push(ChangeItem::Issue(issue));
            }
            ChangeItem::Pull(pull) if pull.merged_at.is_none() => {
                debug!(number = pull.number, "skipping unmerged pull request");
            }
            ChangeItem::Pull(mut pull) => {
                pull.merged_by = forge.pull_merger(pull.number).await?;
                names.fill(&mut pull.user).await?;
                if let Some(merger) = pull.merged_by.as_mut() {
                    names.fill(merger).await?;
                }
                items.push(ChangeItem::Pull(pull));
            }
        }
    }

    debug!(%start, %end, count = items.len(), "collected closed items");
    Ok(items)
}

/// Display names looked up during one collection, keyed by login.
struct DisplayNames<'a> {
    forge: &'a dyn Forge,
    cache: HashMap<String, Option<String>>,
}

impl<'a> DisplayNames<'a> {
    fn new(forge: &'a dyn Forge) -> Self {
        Self {
            forge,
            cache: HashMap::new(),
        }
    }

    /// Set `user.name` from the profile unless the payload already had it.
    async fn fill(&mut self, user: &mut User) -> Result<(), ForgeError> {
        if user.name.is_some() {
            return Ok(());
        }
        if let Some(name) = self.cache.get(&user.login) {
            user.name = name.clone();
            return Ok(());
        }

        let profile = self.forge.user(&user.login).await?;
        self.cache.insert(user.login.clone(), profile.name.clone());
        user.name = profile.name;
        Ok(())
    }
}

/// Whether a close time falls in `[start, end)`.
///
/// Items without a close time are outside every window.
pub fn in_window(
    closed_at: Option<DateTime<Utc>>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    closed_at
        .map(|t| t.naive_utc())
        .is_some_and(|t| start <= t && t < end)
}

/// The issues among `items`, in order.
pub fn issues(items: &[ChangeItem]) -> impl Iterator<Item = &Issue> {
    items.iter().filter_map(|item| match item {
        ChangeItem::Issue(issue) => Some(issue),
        ChangeItem::Pull(_) => None,
    })
}

/// The pull requests among `items`, in order.
pub fn pulls(items: &[ChangeItem]) -> impl Iterator<Item = &Pull> {
    items.iter().filter_map(|item| match item {
        ChangeItem::Pull(pull) => Some(pull),
        ChangeItem::Issue(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockForge, MockOperation};
    use crate::forge::{ItemKind, User};
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, hour, 0, 0).unwrap()
    }

    fn user(login: &str) -> User {
        User {
            login: login.to_string(),
            name: None,
            html_url: format!("https://github.com/{}", login),
        }
    }

    fn issue(number: u64, closed_at: DateTime<Utc>) -> ChangeItem {
        ChangeItem::Issue(Issue {
            number,
            title: format!("Issue {}", number),
            body: None,
            html_url: String::new(),
            labels: vec![],
            user: user("author"),
            closed_at: Some(closed_at),
            closed_by: Some(user("closer")),
        })
    }

    fn pull(number: u64, closed_at: DateTime<Utc>, merged: bool) -> ChangeItem {
        ChangeItem::Pull(Pull {
            number,
            title: format!("Pull {}", number),
            body: None,
            html_url: String::new(),
            labels: vec![],
            user: user("author"),
            closed_at: Some(closed_at),
            merged_at: merged.then_some(closed_at),
            merged_by: merged.then(|| user("merger")),
        })
    }

    #[test]
    fn window_is_half_open() {
        let start = at(1).naive_utc();
        let end = at(3).naive_utc();

        assert!(in_window(Some(at(1)), start, end));
        assert!(in_window(Some(at(2)), start, end));
        assert!(!in_window(Some(at(3)), start, end));
        assert!(!in_window(Some(at(1) - Duration::seconds(1)), start, end));
        assert!(!in_window(None, start, end));
    }

    #[test]
    fn issues_and_pulls_partition_mixed_items() {
        let mut items = Vec::new();
        for i in (0..20).step_by(2) {
            items.push(issue(i, at(1)));
            items.push(pull(i + 1, at(1), true));
        }

        let issue_numbers: Vec<u64> = issues(&items).map(|i| i.number).collect();
        let pull_numbers: Vec<u64> = pulls(&items).map(|p| p.number).collect();

        assert_eq!(issue_numbers, (0..20).step_by(2).collect::<Vec<_>>());
        assert_eq!(pull_numbers, (1..20).step_by(2).collect::<Vec<_>>());
        assert_eq!(issue_numbers.len() + pull_numbers.len(), items.len());
    }

    #[tokio::test]
    async fn collects_only_window_and_merged() {
        let forge = MockForge::new("o", "r").with_items(vec![
            issue(1, at(0)),
            issue(2, at(2)),
            pull(3, at(2), true),
            pull(4, at(2), false),
            pull(5, at(5), true),
        ]);

        let items = issues_and_pulls(&forge, at(1).naive_utc(), at(4).naive_utc())
            .await
            .unwrap();

        let numbers: Vec<(ItemKind, u64)> = items.iter().map(|i| (i.kind(), i.number())).collect();
        assert_eq!(numbers, vec![(ItemKind::Issue, 2), (ItemKind::Pull, 3)]);
    }

    #[tokio::test]
    async fn fills_in_closing_actors_once_per_kept_item() {
        let forge = MockForge::new("o", "r").with_items(vec![
            issue(1, at(2)),
            pull(2, at(2), true),
            issue(3, at(9)),
        ]);

        let items = issues_and_pulls(&forge, at(1).naive_utc(), at(4).naive_utc())
            .await
            .unwrap();

        match &items[0] {
            ChangeItem::Issue(i) => assert_eq!(i.closed_by.as_ref().unwrap().login, "closer"),
            other => panic!("unexpected {:?}", other),
        }
        match &items[1] {
            ChangeItem::Pull(p) => assert_eq!(p.merged_by.as_ref().unwrap().login, "merger"),
            other => panic!("unexpected {:?}", other),
        }

        // The shared author is looked up once.
        let ops = forge.operations();
        assert_eq!(
            ops,
            vec![
                MockOperation::ListClosedItems {
                    since: at(1).naive_utc()
                },
                MockOperation::IssueCloser { number: 1 },
                MockOperation::User {
                    login: "author".to_string()
                },
                MockOperation::User {
                    login: "closer".to_string()
                },
                MockOperation::PullMerger { number: 2 },
                MockOperation::User {
                    login: "merger".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn display_names_come_from_profiles() {
        let named = |login: &str, name: &str| User {
            name: Some(name.to_string()),
            ..user(login)
        };
        let forge = MockForge::new("o", "r")
            .with_items(vec![issue(1, at(2)), pull(2, at(2), true)])
            .with_users(vec![
                named("author", "Ada Author"),
                named("closer", "Cy Closer"),
            ]);

        let items = issues_and_pulls(&forge, at(1).naive_utc(), at(4).naive_utc())
            .await
            .unwrap();

        match &items[0] {
            ChangeItem::Issue(i) => {
                assert_eq!(i.user.name.as_deref(), Some("Ada Author"));
                assert_eq!(
                    i.closed_by.as_ref().unwrap().name.as_deref(),
                    Some("Cy Closer")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        match &items[1] {
            ChangeItem::Pull(p) => {
                assert_eq!(p.user.name.as_deref(), Some("Ada Author"));
                assert_eq!(p.merged_by.as_ref().unwrap().name, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn names_in_payload_skip_profile_lookup() {
        let mut item = issue(1, at(2));
        if let ChangeItem::Issue(i) = &mut item {
            i.user.name = Some("Already Named".to_string());
        }
        let forge = MockForge::new("o", "r").with_items(vec![item]);

        let items = issues_and_pulls(&forge, at(1).naive_utc(), at(4).naive_utc())
            .await
            .unwrap();

        match &items[0] {
            ChangeItem::Issue(i) => assert_eq!(i.user.name.as_deref(), Some("Already Named")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!forge.operations().contains(&MockOperation::User {
            login: "author".to_string()
        }));
    }

    #[tokio::test]
    async fn profile_failure_propagates() {
        let forge = MockForge::new("o", "r")
            .with_items(vec![issue(1, at(2))])
            .fail_on(FailOn::User(ForgeError::NotFound("user".into())));

        let result = issues_and_pulls(&forge, at(1).naive_utc(), at(4).naive_utc()).await;
        assert!(matches!(result, Err(ForgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn forge_failure_propagates() {
        let forge = MockForge::new("o", "r")
            .with_items(vec![issue(1, at(2))])
            .fail_on(FailOn::IssueCloser(ForgeError::RateLimited));

        let result = issues_and_pulls(&forge, at(1).naive_utc(), at(4).naive_utc()).await;
        assert!(matches!(result, Err(ForgeError::RateLimited)));
    }
}
