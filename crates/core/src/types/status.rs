//! Status enums: account roles and the order fulfillment lifecycle.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A customer placing orders.
    #[default]
    Customer,
    /// Store staff managing the menu and the kitchen board.
    Admin,
}

impl Role {
    /// Storage/wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Error returned when a string is not one of the five order statuses.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status value: {0}")]
pub struct StatusParseError(pub String);

/// Order fulfillment status.
///
/// The happy path is `Placed -> Preparing -> OutForDelivery -> Delivered`;
/// `Cancelled` can be reached from any non-terminal state. The wire values are
/// the human-readable labels shown on the kitchen board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Placed")]
    Placed,
    #[serde(rename = "Preparing")]
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Placed,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage/wire label of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "Order Placed",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether no further transition is expected from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The next status on the happy path, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Placed => Some(Self::Preparing),
            Self::Preparing => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Statuses reachable from `self` under the strict lifecycle.
    #[must_use]
    pub fn allowed_next(self) -> Vec<Self> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.next().into_iter().chain([Self::Cancelled]).collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StatusParseError(s.to_owned()))
    }
}

/// A status change rejected by [`TransitionPolicy::Strict`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot move an order from '{from}' to '{to}'")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// How staff status changes are checked.
///
/// `Permissive` lets staff set any of the five statuses on any order, which is
/// how mis-clicks on the kitchen board get corrected. `Strict` only allows the
/// happy-path step or a cancellation of a live order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    /// Check a single status change.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the strict policy forbids the move.
    pub fn check(self, from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
        match self {
            Self::Permissive => Ok(()),
            Self::Strict if from.allowed_next().contains(&to) => Ok(()),
            Self::Strict => Err(TransitionError { from, to }),
        }
    }

    /// Statuses an order may currently be in for a move to `to` to succeed.
    ///
    /// Storage backends use this to make the check and the write a single
    /// conditional update.
    #[must_use]
    pub fn allowed_predecessors(self, to: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|from| self.check(*from, to).is_ok())
            .collect()
    }
}
