//! linkbundle - a personal link organizer
//!
//! Links are grouped into categories, collected into shareable bundles and
//! attached to scheduled activities. The whole collection lives in a single
//! JSON document that every change is saved back to.

pub mod cli;
pub mod config;
pub mod models;
pub mod search;
pub mod store;

pub use config::Config;
pub use store::{ImportError, SharedImportOptions, StateStore};
