//! Getting rendered pages out of the portal.

pub mod auth;

pub use auth::login;
