#![doc = "readme-sync-core: core logic library for readme-sync."]

//! This crate contains all parsing, decision and pipeline logic for readme-sync.
//! Transport clients (the source-control content API and the documentation
//! host API) are not included here; they implement the traits in [`contract`].
//!
//! # Usage
//! Add this as a dependency for all shared pipeline, parsing, config, and sync code.

pub mod config;
pub mod contract;
pub mod document;
pub mod scanner;
pub mod synchronise;
