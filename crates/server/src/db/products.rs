//! `PostgreSQL` menu storage.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use bakehouse_core::ProductId;

use super::{ProductStore, RepositoryError};
use crate::models::{NewProduct, Product};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    category: String,
    image: String,
    description: Option<String>,
    is_available: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            category: row.category,
            image: row.image,
            description: row.description,
            is_available: row.is_available,
        }
    }
}

const INSERT_PRODUCT: &str = r"
    INSERT INTO products (name, price, category, image, description)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, name, price, category, image, description, is_available
";

/// Menu storage backed by the `products` table.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, category, image, description, is_available
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(INSERT_PRODUCT)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.category)
            .bind(&product.image)
            .bind(product.description.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn create_many(&self, products: &[NewProduct]) -> Result<Vec<Product>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(products.len());

        for product in products {
            let row = sqlx::query_as::<_, ProductRow>(INSERT_PRODUCT)
                .bind(&product.name)
                .bind(product.price)
                .bind(&product.category)
                .bind(&product.image)
                .bind(product.description.as_deref())
                .fetch_one(&mut *tx)
                .await?;
            created.push(row.into());
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_availability(
        &self,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET is_available = NOT is_available
            WHERE id = $1
            RETURNING id, name, price, category, image, description, is_available
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }
}
