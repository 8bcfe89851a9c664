//! Core domain types
//!
//! This module contains the domain structures shared across the jrunner
//! server: script definitions with their override layer, board columns,
//! and run lifecycle types.

pub mod column;
pub mod run;
pub mod script;
