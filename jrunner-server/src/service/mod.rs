//! Service Module
//!
//! Business logic layer for the server. Services validate requests,
//! orchestrate the config store and run registry, and own the error
//! taxonomy the API layer maps to HTTP statuses.

pub mod columns;
pub mod runs;
pub mod scripts;

// Re-export for convenience
pub use columns as column_service;
pub use runs as run_service;
pub use scripts as script_service;
