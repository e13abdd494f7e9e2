//! Service layer providing the business operations behind the HTTP surface.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod booking_service;
pub mod catalog_service;
pub mod contact_service;
pub mod blog_service;
pub mod user_service;
pub mod notify;
#[cfg(test)]
pub mod test_support;
