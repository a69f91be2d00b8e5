//! Service layer: the item ingestion pipeline and its collaborators.
//! - `item`: domain types, store abstraction with memory/Postgres backends, `ItemService`.
//! - `image`: image backends (local disk, remote hosting API) and storage naming.
//! - `observability`: Prometheus counters for the pipeline.

pub mod errors;
pub mod item;
pub mod image;
pub mod observability;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
