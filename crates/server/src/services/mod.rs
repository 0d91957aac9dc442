//! Business logic services.

pub mod signups;

pub use signups::{SignupError, SignupService};
