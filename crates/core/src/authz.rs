//! Ownership decisions.
//!
//! These functions only compare IDs. Loading the resources, and reporting a
//! missing resource as not-found before any decision is made, is the
//! caller's job.

use serde::Serialize;

use crate::model::{AccountIdentity, GroceryList, Item};
use crate::types::AccountId;

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// Returns `true` for [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// A list is accessible only to its owner.
#[must_use]
pub fn authorize_list(identity: &AccountIdentity, list: &GroceryList) -> Decision {
    Decision::from_bool(list.owner_id == identity.id)
}

/// An item is accessible only to the owner of its parent list.
///
/// `parent` must be the list the item references; any other list is denied
/// rather than trusted.
#[must_use]
pub fn authorize_item(identity: &AccountIdentity, item: &Item, parent: &GroceryList) -> Decision {
    if item.list_id != parent.id {
        return Decision::Deny;
    }
    authorize_list(identity, parent)
}

/// Profile changes are self-only.
#[must_use]
pub fn authorize_account(identity: &AccountIdentity, account_id: AccountId) -> Decision {
    Decision::from_bool(identity.id == account_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{DisplayName, ItemId, ListId, Name, Quantity};

    fn identity(id: i64) -> AccountIdentity {
        AccountIdentity {
            id: AccountId::new(id),
            name: DisplayName::parse(&format!("user{id}")).unwrap(),
        }
    }

    fn list(id: i64, owner: i64) -> GroceryList {
        GroceryList {
            id: ListId::new(id),
            name: Name::parse("Weekly").unwrap(),
            owner_id: AccountId::new(owner),
            created_at: Utc::now(),
        }
    }

    fn item(id: i64, list_id: i64) -> Item {
        Item {
            id: ItemId::new(id),
            name: Name::parse("Milk").unwrap(),
            completed: false,
            quantity: Quantity::DEFAULT,
            list_id: ListId::new(list_id),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_owner_is_allowed() {
        assert_eq!(authorize_list(&identity(1), &list(10, 1)), Decision::Allow);
        assert_eq!(authorize_list(&identity(2), &list(10, 1)), Decision::Deny);
    }

    #[test]
    fn test_item_ownership_is_transitive() {
        let parent = list(10, 1);
        let milk = item(100, 10);

        assert!(authorize_item(&identity(1), &milk, &parent).is_allowed());
        for other in [0, 2, 3, 99] {
            assert_eq!(
                authorize_item(&identity(other), &milk, &parent),
                Decision::Deny
            );
        }
    }

    #[test]
    fn test_item_with_mismatched_parent_is_denied() {
        let someone_elses = list(11, 1);
        assert_eq!(
            authorize_item(&identity(1), &item(100, 10), &someone_elses),
            Decision::Deny
        );
    }

    #[test]
    fn test_account_is_self_only() {
        assert!(authorize_account(&identity(5), AccountId::new(5)).is_allowed());
        assert!(!authorize_account(&identity(5), AccountId::new(6)).is_allowed());
    }
}
