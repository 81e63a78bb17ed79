//! forge
//!
//! Read-only abstraction over a remote hosting service (GitHub v1).
//!
//! # Architecture
//!
//! The `Forge` trait defines every host API query the changelog needs.
//! Changelog code only sees `&dyn Forge`, so the same logic runs against
//! [`github::GitHubForge`] in production and [`mock::MockForge`] in tests.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and the entities it returns
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use tagnotes::forge::github::GitHubForge;
//! use tagnotes::forge::{Forge, ListClosedPullsOpts};
//!
//! let registry = GitHubForge::from_slug("JuliaRegistries/General").unwrap();
//! let pulls = registry
//!     .list_closed_pulls(ListClosedPullsOpts::with_head("JuliaRegistries:branch"))
//!     .await?;
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
