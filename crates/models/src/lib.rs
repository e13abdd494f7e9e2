pub mod errors;
pub mod db;
pub mod validation;
pub mod user;
pub mod service;
pub mod sub_service;
pub mod booking;
pub mod contact;
pub mod blog;

#[cfg(test)]
mod tests;
