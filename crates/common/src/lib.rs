//! Shared building blocks for the itemhub workspace: response types,
//! logging setup and startup environment checks.

pub mod types;
pub mod env;

pub mod utils {
    pub mod logging;
}
