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

//! Typed configuration for the debrid provider client and the symlink worker.
//!
//! Layout: `model.rs` (typed settings carriers), `validate.rs`
//! (validation/parsing helpers), `error.rs` (structured errors). Loading and
//! persistence of these settings belong to the hosting application; this
//! crate only defines the shapes and the rules a valid document satisfies.

pub mod error;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{MountSettings, ProviderSettings};
pub use validate::{validate_mount_settings, validate_provider_settings};
