//! The order record.

use serde::{Deserialize, Serialize};

/// A stored purchase: who bought, how much, and where it stands.
///
/// `id` is `None` until storage assigns one; from then on it never
/// changes. Records are immutable, so updates produce a new value via
/// [`Order::with_status`] and friends.
///
/// Serialized with camelCase keys: `{"id", "userId", "totalAmount", "status"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    id: Option<i64>,
    user_id: i64,
    total_amount: i64,
    status: String,
}

impl Order {
    /// A new, not yet stored order.
    #[must_use]
    pub fn new(user_id: i64, total_amount: i64, status: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id,
            total_amount,
            status: status.into(),
        }
    }

    /// Primary key, once stored.
    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    /// Owning user.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Amount in currency minor units.
    #[must_use]
    pub const fn total_amount(&self) -> i64 {
        self.total_amount
    }

    /// Free-form status such as `PENDING` or `PAID`.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The same order carrying `id`.
    #[must_use]
    pub fn with_id(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    /// The same order with a new status.
    #[must_use]
    pub fn with_status(self, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..self
        }
    }

    /// `true` when saving this order inserts a new row.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.id.is_none()
    }
}
