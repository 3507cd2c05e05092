//! Menu management.

use thiserror::Error;

use bakehouse_core::ProductId;

use crate::db::{ProductStore, RepositoryError};
use crate::models::{NewProduct, Product, ProductValidationError};

/// Errors from menu operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Invalid(#[from] ProductValidationError),

    /// One entry of a bulk upload is invalid; nothing was stored.
    #[error("item {index}: {source}")]
    InvalidItem {
        index: usize,
        #[source]
        source: ProductValidationError,
    },

    #[error("no products supplied")]
    Empty,

    #[error("product not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Menu service.
pub struct CatalogService<'a> {
    products: &'a dyn ProductStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(products: &'a dyn ProductStore) -> Self {
        Self { products }
    }

    /// Every menu item, available or not.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// Add one item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` for blank fields or a non-positive price.
    pub async fn create(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let product = product.validate()?;
        let created = self.products.create(&product).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "Product added");
        Ok(created)
    }

    /// Add a whole menu at once. Either every item is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::InvalidItem` naming the first bad entry.
    pub async fn create_many(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }

        let products = products
            .into_iter()
            .enumerate()
            .map(|(index, product)| {
                product
                    .validate()
                    .map_err(|source| CatalogError::InvalidItem { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let created = self.products.create_many(&products).await?;
        tracing::info!(count = created.len(), "Products added in bulk");
        Ok(created)
    }

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no item has this id.
    pub async fn remove(&self, id: ProductId) -> Result<(), CatalogError> {
        if !self.products.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        tracing::info!(product_id = %id, "Product removed");
        Ok(())
    }

    /// Flip an item between available and out of stock.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no item has this id.
    pub async fn toggle_availability(&self, id: ProductId) -> Result<Product, CatalogError> {
        let product = self
            .products
            .toggle_availability(id)
            .await?
            .ok_or(CatalogError::NotFound)?;
        tracing::info!(
            product_id = %id,
            is_available = product.is_available,
            "Product availability changed"
        );
        Ok(product)
    }
}
