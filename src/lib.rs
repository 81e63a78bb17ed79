//! tagnotes - Changelogs for tagged package releases
//!
//! tagnotes writes the Markdown changelog of one release: the issues closed
//! and pull requests merged since the previous release, plus custom notes
//! the release author left in the package registry's pull request.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, wires sources)
//! - [`changelog`] - Window resolution, collection, registry notes, rendering
//! - [`core`] - Versions, project identity, configuration
//! - [`git`] - Read-only queries against the local clone
//! - [`forge`] - Abstraction for the hosting service (GitHub)

pub mod changelog;
pub mod cli;
pub mod core;
pub mod forge;
pub mod git;
