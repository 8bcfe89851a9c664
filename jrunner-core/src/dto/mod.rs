//! Request and response shapes for the HTTP surface
//!
//! Field names follow the dashboard's wire format (camelCase). These types
//! are shared between the server handlers and the integration tests.

pub mod columns;
pub mod runs;
pub mod scripts;
