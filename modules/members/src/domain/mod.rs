pub mod error;
pub mod predicate;
pub mod repo;
pub mod service;
