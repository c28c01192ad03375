//! `armui` is the backend of a web dashboard for the Automatic Ripping Machine.
//!
//! # Overview
//!
//! The service aggregates state from three places and presents it as one API:
//! - the ripping service's REST API (live state and all write actions)
//! - a read-only mirror of the ripping service's SQLite database
//! - the transcoding service's REST API
//!
//! It also normalizes search results from movie/TV and music metadata providers.
//!
//! Every upstream dependency may be down at any time. Aggregation paths degrade
//! to empty or `null` fields instead of failing, and upstream calls are modelled as
//! [`upstream::Upstream`] outcomes so "could not ask" never looks like "nothing there".
//!
//! # Modules
//!
//! - [`cli`] - Command-line arguments for the server binary
//! - [`config`] - Process settings, config masking and the config fallback resolver
//! - [`mirror`] - Read-only access to the ripping service's database
//! - [`upstream`] - HTTP clients for the ripping, transcoding and CRC services
//! - [`logs`] - Log listing, reading and line parsing
//! - [`progress`] - Per-job rip progress extraction
//! - [`metadata`] - Movie/TV and music metadata normalization
//! - [`management`] - Aggregations composed from the modules above
//! - [`server`] - The HTTP surface

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod cli;
pub mod config;
pub mod logs;
pub mod management;
pub mod metadata;
pub mod mirror;
pub mod progress;
pub mod server;
pub mod upstream;

pub use error::*;
