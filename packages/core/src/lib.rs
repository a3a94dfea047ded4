// Library root: exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod dashboard;
pub mod error;
pub mod insights;
pub mod services;

// These modules are only needed by the binary.
pub mod cli;
pub mod config;
pub mod logging;
