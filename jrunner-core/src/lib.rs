//! jrunner Core
//!
//! Core types and merge logic for the jrunner dashboard.
//!
//! This crate contains:
//! - Domain types: script definitions, columns, run records
//! - DTOs: request/response shapes for the HTTP surface

pub mod domain;
pub mod dto;
