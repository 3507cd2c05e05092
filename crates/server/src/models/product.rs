//! Menu (catalog) items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bakehouse_core::{AmountError, ProductId, ensure_positive};

/// A menu item as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    /// Image URL or a single glyph shown in place of a photo.
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_available: bool,
}

/// Reasons a submitted menu item is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error(transparent)]
    Price(#[from] AmountError),
}

/// A menu item submitted by staff.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProduct {
    /// Trim text fields and check that the item can be listed.
    ///
    /// A blank description is dropped rather than stored.
    ///
    /// # Errors
    ///
    /// Returns [`ProductValidationError`] for blank required fields or a
    /// price that is not strictly positive.
    pub fn validate(mut self) -> Result<Self, ProductValidationError> {
        for (field, value) in [
            ("name", &mut self.name),
            ("category", &mut self.category),
            ("image", &mut self.image),
        ] {
            *value = value.trim().to_owned();
            if value.is_empty() {
                return Err(ProductValidationError::MissingField { field });
            }
        }
        ensure_positive("price", self.price)?;
        self.description = self
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());
        Ok(self)
    }
}
