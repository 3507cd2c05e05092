//! Seed the menu from a YAML file.
//!
//! The file is a list of menu items in the same shape the bulk upload
//! endpoint accepts:
//!
//! ```yaml
//! - name: Black Forest Cake
//!   price: 450
//!   category: Cakes
//!   image: "🎂"
//!   description: Chocolate sponge with cherries
//! - name: Masala Chai
//!   price: 30
//!   category: Beverages
//!   image: "☕"
//! ```
//!
//! Every item is validated before anything is written, and the items are
//! inserted in one transaction.

use std::path::Path;

use tracing::{error, info};

use bakehouse_server::db::{self, PgProductStore};
use bakehouse_server::models::NewProduct;
use bakehouse_server::services::{CatalogError, CatalogService};

/// Parse a menu file's contents.
fn parse_menu(content: &str) -> Result<Vec<NewProduct>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Add every item in `file_path` to the menu.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or parsed, any item is invalid, or the insert fails.
pub async fn menu(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading menu from file");

    // Read and parse before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let items = parse_menu(&content)?;
    info!(items = items.len(), "Parsed menu");

    let database_url = super::database_url()
        .ok_or("BAKEHOUSE_DATABASE_URL (or DATABASE_URL) not set")?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let products = PgProductStore::new(pool);
    match CatalogService::new(&products).create_many(items).await {
        Ok(created) => {
            info!("Seeding complete! Items added: {}", created.len());
            Ok(())
        }
        Err(e @ (CatalogError::InvalidItem { .. } | CatalogError::Empty)) => {
            error!("Menu validation failed, nothing was added: {e}");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
