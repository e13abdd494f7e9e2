//! Access gate: identity-token verification, sign-in and the admin check.
//!
//! Split into domain types, a repository seam over the users table and the
//! service that ties them to the identity provider's tokens.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AccessGate, SessionVerifier};
