//! Business logic services.
//!
//! # Services
//!
//! - `accounts` - Registration, login, self-only profile changes
//! - `lists` - Owner-scoped list CRUD
//! - `items` - Item CRUD, authorized through the parent list
//! - `batch` - All-or-nothing multi-item create and delete
//!
//! Every operation takes the acting [`grocery_core::AccountIdentity`] as an
//! explicit argument and runs in exactly one store transaction. Services
//! are cheap borrowing wrappers, built per request from [`AppState`].
//!
//! [`AppState`]: crate::state::AppState

pub mod accounts;
pub mod batch;
mod error;
#[cfg(test)]
mod faults;
pub mod guard;
pub mod items;
pub mod lists;

pub use accounts::{AccountService, AccountUpdate, Registration};
pub use batch::BatchEngine;
pub use error::ServiceError;
pub use items::{ItemDraft, ItemPatch, ItemService};
pub use lists::ListService;
