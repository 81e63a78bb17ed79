//! core
//!
//! Domain types and rules that need no network access.
//!
//! # Modules
//!
//! - [`version`]: Tag parsing and previous-release resolution
//! - [`project`]: Package name and UUID from the project file
//! - [`config`]: Configuration schema and loading

pub mod config;
pub mod project;
pub mod version;
