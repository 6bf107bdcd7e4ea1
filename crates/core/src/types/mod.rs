//! Core types for the grocery list service.
//!
//! This module provides type-safe wrappers for common domain concepts.
//! Every wrapper validates on construction, so a value that exists is valid.

pub mod email;
pub mod id;
pub mod name;
pub mod quantity;

pub use email::{Email, EmailError};
pub use id::*;
pub use name::{DisplayName, Name, NameError};
pub use quantity::{Quantity, QuantityError};
