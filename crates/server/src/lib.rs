//! Grocery list server library.
//!
//! Accounts own grocery lists and lists own items. Every operation runs on
//! behalf of an explicitly passed [`grocery_core::AccountIdentity`], checks
//! ownership against the store inside its own transaction, and commits only
//! after every check has passed.
//!
//! The crate is a library so the router and services can be tested against
//! [`db::MemoryStore`] without a database; `main.rs` wires it to `PostgreSQL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
