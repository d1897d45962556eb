//! Quarry Core
//!
//! Core types and abstractions shared by the Quarry client and CLI.
//!
//! This crate contains:
//! - Domain types: job identifiers and the status protocol of the compilation service
//! - DTOs: request and result bodies for the compile and verify endpoints
//! - Diagnostics: a parser that turns compiler output into structured annotations

pub mod diagnostics;
pub mod domain;
pub mod dto;
pub mod endpoints;
