//! Item module: ingestion pipeline over pluggable stores (domain, repository, service).
//!
//! `service::ItemService` validates a submission, resolves its image through an
//! `ImageHost` and appends the canonical record to an `ItemStore`.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::ItemService;
