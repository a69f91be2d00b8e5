//! Persistence models: the `item` entity, its field rules and connection helpers.

pub mod errors;
pub mod db;
pub mod item;

#[cfg(test)]
mod tests;
