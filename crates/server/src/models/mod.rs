//! Domain models.

pub mod signup;
pub mod user;

pub use signup::{CreatedSignup, Signup};
pub use user::User;
