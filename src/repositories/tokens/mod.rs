pub mod revocation_repository;

pub use revocation_repository::*;
