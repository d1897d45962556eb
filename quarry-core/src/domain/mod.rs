//! Core domain types
//!
//! This module contains the domain structures of the asynchronous job protocol.
//! They are shared between the client (which drives the protocol) and the CLI
//! (which renders it).

pub mod job;
