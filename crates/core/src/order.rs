//! Order line items and placement validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AmountError, ProductId, ensure_positive};

/// One line of an order, captured at placement time.
///
/// Name and unit price are copied from the menu so the order stays readable
/// after the catalog item is edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LineItem {
    /// Unit price times quantity, or `None` if it does not fit a [`Decimal`].
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Reasons an order is rejected at placement.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    #[error("order must contain at least one item")]
    NoItems,
    #[error("item {index}: name cannot be empty")]
    BlankItemName { index: usize },
    #[error("item {index}: quantity must be at least 1")]
    InvalidQuantity { index: usize },
    #[error("item {index}: {source}")]
    InvalidPrice {
        index: usize,
        #[source]
        source: AmountError,
    },
    #[error(transparent)]
    InvalidTotal(#[from] AmountError),
    #[error("total amount {actual} does not match item subtotals {expected}")]
    TotalMismatch { expected: Decimal, actual: Decimal },
    #[error("a delivery address or table number is required")]
    MissingDeliveryTarget,
    #[error("item {index}: order amount is too large")]
    AmountOverflow { index: usize },
}

/// An order as submitted by a customer, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub table_no: String,
}

impl NewOrder {
    /// Validate and normalize the order for placement.
    ///
    /// Trims the delivery fields and item names. Stock availability is not
    /// checked here; the menu's availability flag only affects browsing.
    ///
    /// # Errors
    ///
    /// Returns the first [`OrderValidationError`] found.
    pub fn validate(mut self) -> Result<Self, OrderValidationError> {
        if self.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }

        for (index, item) in self.items.iter_mut().enumerate() {
            item.name = item.name.trim().to_owned();
            if item.name.is_empty() {
                return Err(OrderValidationError::BlankItemName { index });
            }
            if item.quantity == 0 {
                return Err(OrderValidationError::InvalidQuantity { index });
            }
            ensure_positive("price", item.price)
                .map_err(|source| OrderValidationError::InvalidPrice { index, source })?;
        }

        ensure_positive("totalAmount", self.total_amount)?;

        let mut expected = Decimal::ZERO;
        for (index, item) in self.items.iter().enumerate() {
            expected = item
                .subtotal()
                .and_then(|subtotal| expected.checked_add(subtotal))
                .ok_or(OrderValidationError::AmountOverflow { index })?;
        }
        if expected != self.total_amount {
            return Err(OrderValidationError::TotalMismatch {
                expected,
                actual: self.total_amount,
            });
        }

        self.address = self.address.trim().to_owned();
        self.table_no = self.table_no.trim().to_owned();
        if self.address.is_empty() && self.table_no.is_empty() {
            return Err(OrderValidationError::MissingDeliveryTarget);
        }

        Ok(self)
    }
}
