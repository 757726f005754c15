//! Manuals Server Library
//!
//! The server binary is in main.rs; everything it serves is built from the
//! modules below so integration tests can drive the same router.
//!
//! # Modules
//!
//! - `document`: document references and the URLs derived from them
//! - `proxy`: upstream client and response header curation
//! - `routes`: HTTP surface (`/proxy`, `/health`)
//! - `prefetch`: debounced hover warm-ups
//! - `viewer`: viewer host and the renderer polling bridge

pub mod config;
pub mod document;
pub mod error;
pub mod prefetch;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod viewer;
