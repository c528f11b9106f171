#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Real-Debrid adapter: HTTP client plus the remote-state synchronizer.
//!
//! Layout: `types.rs` (wire DTOs), `convert.rs` (wire-to-domain mapping),
//! `client.rs` (`RealDebridClient` implementing the provider contract),
//! `sync.rs` (`Synchronizer` with pagination, merge, selection and the
//! link-readiness heuristic).

mod client;
mod convert;
mod sync;
mod types;

pub use client::RealDebridClient;
pub use sync::{ClockOffset, Synchronizer};
