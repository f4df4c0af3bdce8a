//! # wikibase-importer
//!
//! Imports graph-shaped data (d:swarm GDM resources with literal and resource
//! statements) into a Wikibase instance over the MediaWiki action API.
//!
//! ## Architecture
//!
//! - **Session client**: three-step login handshake, then `wbeditentity`
//!   calls with one immutable edit token and cookie set
//! - **Response interpretation**: created entity, recoverable property label
//!   conflict, or fatal failure
//! - **Identifier cache**: at most one remote creation per source URI per run
//! - **Translation**: statements become claims, provenance becomes qualifiers
//! - **Orchestration**: resources are imported one at a time, in order

pub mod cache;
pub mod client;
pub mod entity;
pub mod errors;
pub mod source;
pub mod types;

pub mod pipeline;
pub mod utils;

#[cfg(test)]
mod testing;

pub use client::{SessionClient, WikibaseApi};
pub use errors::{ImportError, Result};
pub use pipeline::{ImportOrchestrator, ImportSummary};
pub use types::ImporterConfig;
