//! Build badge updater — keeps a repository's status badge in sync with its
//! latest Cloud Build result.
//!
//! Cloud Build publishes a notification for every build state change; Pub/Sub
//! pushes them here over HTTP. On a terminal SUCCESS/FAILURE build of the
//! watched repository, the matching pre-rendered SVG is copied over the
//! published badge object (server-side, with no-cache metadata). Everything
//! else is acked and ignored.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
