// src/lib.rs
// =============================================================================
// site-guardian: the crawling engine behind the CLI.
//
// Two independent read paths:
// - checker: "which links on this page are broken?"
// - sitemap: "what does this site's sitemap tree contain?"
//
// They share only the HTTP plumbing (fetch), the options (config) and the
// error types (error).
// =============================================================================

pub mod checker;
pub mod config;
pub mod error;
pub mod fetch;
pub mod sitemap;

pub use config::{CheckOptions, SitemapOptions};
pub use error::{GuardianError, Result, TransportErrorKind};
