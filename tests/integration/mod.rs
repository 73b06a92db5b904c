//! Integration tests for linkbundle
//!
//! These drive the store, storage and codec together through the public API.

#[path = "../common/mod.rs"]
pub mod common;

pub mod data_transfer;
pub mod persistence;
pub mod share_flow;
pub mod store_invariants;
