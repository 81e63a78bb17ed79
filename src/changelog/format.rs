//! changelog::format
//!
//! Template-ready projections of forge entities.

use serde::Serialize;

use crate::forge::{Issue, Pull, User};

/// A user as seen by templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: Option<String>,
    pub url: String,
    pub username: String,
}

/// An issue as seen by templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueView {
    pub author: Person,
    pub body: String,
    pub labels: Vec<String>,
    pub closer: Option<Person>,
    pub number: u64,
    pub title: String,
    pub url: String,
}

/// A pull request as seen by templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullView {
    pub author: Person,
    pub body: String,
    pub labels: Vec<String>,
    pub merger: Option<Person>,
    pub number: u64,
    pub title: String,
    pub url: String,
}

pub fn format_user(user: &User) -> Person {
    Person {
        name: user.name.clone(),
        url: user.html_url.clone(),
        username: user.login.clone(),
    }
}

pub fn format_issue(issue: &Issue) -> IssueView {
    IssueView {
        author: format_user(&issue.user),
        body: issue.body.clone().unwrap_or_default(),
        labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
        closer: issue.closed_by.as_ref().map(format_user),
        number: issue.number,
        title: issue.title.clone(),
        url: issue.html_url.clone(),
    }
}

pub fn format_pull(pull: &Pull) -> PullView {
    PullView {
        author: format_user(&pull.user),
        body: pull.body.clone().unwrap_or_default(),
        labels: pull.labels.iter().map(|l| l.name.clone()).collect(),
        merger: pull.merged_by.as_ref().map(format_user),
        number: pull.number,
        title: pull.title.clone(),
        url: pull.html_url.clone(),
    }
}
