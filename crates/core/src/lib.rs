//! Grocery Core - Shared types library.
//!
//! This crate provides the domain vocabulary used by every other component:
//! - `server` - HTTP service, ownership store, batch mutation engine
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The ownership decision lives here so that it can
//! be tested without a store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, names, and quantities
//! - [`model`] - Accounts, lists, items, and the acting identity
//! - [`authz`] - The ownership decision over the Item → List → Account chain

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authz;
pub mod model;
pub mod types;

pub use authz::Decision;
pub use model::*;
pub use types::*;
