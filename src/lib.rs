//! Vitrine-RS Library
//!
//! Client-side data layer for a remote product catalog, built around an
//! optimistic mutation flow: speculative cache writes, wholesale rollback on
//! failure, and settle-time reconciliation with the server.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod services;
pub mod state;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
