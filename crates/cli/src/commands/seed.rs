//! Seed the catalog with products from a YAML file.
//!
//! The file holds a `products` list; entries already in the catalog
//! (matched by name, case-insensitive) are skipped so the command can be
//! re-run safely.
//!
//! ```yaml
//! products:
//!   - name: Ethiopia Yirgacheffe
//!     description: Floral cup with citrus acidity.
//!     origin: Ethiopia
//!     price: "14.50"
//!     currency: EUR
//!     image_url: /media/files/yirgacheffe.jpg
//!     active: true
//! ```
//!
//! Prices are quoted strings so they parse as exact decimals. `currency`
//! defaults to USD and `active` to true.

use std::path::Path;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, info};

use roastline_admin::db::{
    self,
    catalog::{CatalogRepository, NewProduct},
};
use roastline_core::{CurrencyCode, Price};

/// A product entry in the seed file.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    #[serde(default)]
    description: String,
    origin: Option<String>,
    price: Decimal,
    currency: Option<String>,
    image_url: Option<String>,
    #[serde(default = "default_active")]
    active: bool,
}

const fn default_active() -> bool {
    true
}

/// Top-level seed file structure.
#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<SeedProduct>,
}

/// Validate all entries before touching the database.
fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    if seed.products.is_empty() {
        errors.push("file contains no products".to_owned());
    }

    for (i, product) in seed.products.iter().enumerate() {
        if product.name.trim().is_empty() {
            errors.push(format!("products[{i}]: name is empty"));
        }
        if product.price <= Decimal::ZERO {
            errors.push(format!(
                "products[{i}] ({}): price must be positive",
                product.name
            ));
        }
        if let Some(currency) = &product.currency
            && let Err(e) = currency.parse::<CurrencyCode>()
        {
            errors.push(format!("products[{i}] ({}): {e}", product.name));
        }
    }

    errors
}

/// Seed catalog products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or fails validation, or if a
/// database operation fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "STOREFRONT_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("seed file does not exist: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // A bad file should fail before any connection is opened
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(products = seed.products.len(), "Parsed seed file");

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Seed file validated successfully");

    let pool = db::create_pool(&database_url).await?;
    info!("Opened the shop database");

    let catalog = CatalogRepository::new(&pool);

    let mut created = 0;
    let mut skipped = 0;

    for entry in &seed.products {
        if catalog.find_by_name_ci(&entry.name).await?.is_some() {
            skipped += 1;
            continue;
        }

        // Validation already checked the code parses
        let currency = entry
            .currency
            .as_deref()
            .and_then(|code| code.parse::<CurrencyCode>().ok())
            .unwrap_or_default();

        let product = catalog
            .create(&NewProduct {
                name: entry.name.clone(),
                description: entry.description.clone(),
                origin: entry.origin.clone(),
                price: Price::new(entry.price, currency),
                image_url: entry.image_url.clone(),
            })
            .await?;

        // New rows start inactive; flip the ones the file marks active
        if entry.active {
            catalog.set_active(product.id, true).await?;
        }

        created += 1;
    }

    info!(created, skipped, "Seed finished");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file_with_defaults() {
        let yaml = r#"
products:
  - name: Ethiopia Yirgacheffe
    price: "14.50"
  - name: Colombia Huila
    description: Chocolate and red fruit.
    origin: Colombia
    price: "12.00"
    currency: EUR
    active: false
"#;

        let seed: SeedFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(seed.products.len(), 2);

        let first = &seed.products[0];
        assert_eq!(first.name, "Ethiopia Yirgacheffe");
        assert_eq!(first.price, Decimal::new(1450, 2));
        assert!(first.description.is_empty());
        assert!(first.currency.is_none());
        assert!(first.active);

        let second = &seed.products[1];
        assert_eq!(second.currency.as_deref(), Some("EUR"));
        assert!(!second.active);
    }

    #[test]
    fn test_validate_flags_bad_entries() {
        let yaml = r#"
products:
  - name: ""
    price: "10.00"
  - name: Free Coffee
    price: "0.00"
  - name: Moon Beans
    price: "5.00"
    currency: XYZ
"#;

        let seed: SeedFile = serde_yaml::from_str(yaml).unwrap();
        let errors = validate(&seed);

        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("name is empty"));
        assert!(errors[1].contains("price must be positive"));
        assert!(errors[2].contains("unsupported currency code"));
    }

    #[test]
    fn test_validate_rejects_empty_file() {
        let seed: SeedFile = serde_yaml::from_str("products: []").unwrap();
        let errors = validate(&seed);
        assert_eq!(errors, vec!["file contains no products".to_owned()]);
    }
}
