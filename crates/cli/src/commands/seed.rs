//! Seed the product catalog from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - name: USB-C Hub
//!   price: "49.99"
//!   category: accessories
//!   image_url: https://img.voltlane.dev/hub.webp
//!   description: Seven ports, aluminium shell.
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use voltlane_core::types::Price;
use voltlane_remote::rest::RestRemote;
use voltlane_remote::{DocumentStore, collections, server_timestamp};
use voltlane_storefront::StorefrontConfig;

/// One catalog entry in the seed file.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    price: Price,
    category: String,
    image_url: String,
    #[serde(default)]
    description: String,
}

/// Seed products from a YAML file into the configured remote service.
///
/// # Errors
///
/// Returns an error if configuration is missing, the file cannot be read
/// or parsed, or any write fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let config = StorefrontConfig::from_env()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let products: Vec<SeedProduct> = serde_yaml::from_str(&content)?;
    info!(count = products.len(), "Parsed catalog entries");

    let remote = RestRemote::new(&config.rest_config())?;

    let mut inserted = 0usize;
    for product in &products {
        let payload = json!({
            "name": product.name,
            "price": product.price,
            "category": product.category,
            "imageURL": product.image_url,
            "description": product.description,
            "createdAt": server_timestamp(),
        });
        match remote.add(collections::PRODUCTS, payload).await {
            Ok(id) => {
                info!(product_id = %id, name = %product.name, "Product seeded");
                inserted += 1;
            }
            Err(err) => {
                error!(name = %product.name, "Seeding failed: {err}");
                return Err(err.into());
            }
        }
    }

    info!(inserted, "Seeding complete");
    Ok(())
}
