//! `Linkdex` - the per-server lookup core of a link-archiving Discord bot
//!
//! This crate provides the datastore behind the bot's search commands: it
//! ingests download/video link announcements scanned from chat messages,
//! keeps one durable table pair per server, and serves ranked fuzzy-text and
//! exact-id lookups for both live autocomplete and final query resolution.
//! The Discord gateway, slash-command registration, and embed formatting live
//! in the surrounding bot layer and talk to this crate through plain types
//! and a pair of small traits.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::enum_glob_use,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Unified error types and result handling
pub mod errors;
/// Chat-message ingestion - pattern extraction, title resolution, channel scans
pub mod ingest;
/// Query engine - exact lookups, ranked fuzzy search, suggestion lists
pub mod query;
/// Tenant registry - one lazily created record store per server
pub mod registry;
/// Similarity scoring for fuzzy search
pub mod score;
/// Per-tenant settings consumed by ingestion and query callers
pub mod settings;
/// Durable per-tenant record tables
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use errors::{Error, Result};
pub use registry::StoreRegistry;
