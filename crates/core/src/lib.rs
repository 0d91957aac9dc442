//! Launchpad Core - Shared types library.
//!
//! This crate provides the types shared by every Launchpad component:
//! - `server` - Landing page API (signup capture and admin listing)
//! - `cli` - Command-line tools for migrations and signup export
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is opt-in via the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and validated email addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
