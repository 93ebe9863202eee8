//! Seed fixture loading from seed.toml.
//!
//! The seed file carries demo users, catalog products, and quote templates
//! used to bootstrap a fresh installation. Seeding itself lives in
//! [`crate::core::maintenance`] and is idempotent; this module only parses
//! the file.

use crate::entities::enums::Role;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Structure of the entire seed.toml file
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    /// Users to create if missing (matched by email)
    #[serde(default)]
    pub users: Vec<UserSeed>,
    /// Catalog products to create if missing (matched by SKU)
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    /// Quote templates to create if missing (matched by title)
    #[serde(default)]
    pub quote_templates: Vec<QuoteTemplateSeed>,
}

/// A single seeded user
#[derive(Debug, Deserialize, Clone)]
pub struct UserSeed {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub organization: Option<String>,
}

/// A single seeded catalog product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
}

/// A single seeded quote template
#[derive(Debug, Deserialize, Clone)]
pub struct QuoteTemplateSeed {
    pub title: String,
    pub body: String,
    pub default_price_cents: i64,
}

/// Loads seed fixtures from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_seed_config() {
        let toml_str = r#"
            [[users]]
            name = "Dana Ops"
            email = "dana@pawport.example"
            role = "staff"

            [[users]]
            name = "Island Air Cargo"
            email = "cargo@islandair.example"
            role = "partner"
            organization = "island-air"

            [[products]]
            sku = "CRATE-L"
            name = "Travel crate (large)"
            price_cents = 18900
            description = "IATA-compliant large crate"

            [[quote_templates]]
            title = "Domestic dog"
            body = "Door-to-door ground and air transport for one dog."
            default_price_cents = 95000
        "#;

        let config: SeedConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[0].role, Role::Staff);
        assert_eq!(config.users[1].organization.as_deref(), Some("island-air"));
        assert_eq!(config.products.len(), 1);
        assert_eq!(config.products[0].price_cents, 18900);
        assert_eq!(config.quote_templates.len(), 1);
        assert_eq!(config.quote_templates[0].default_price_cents, 95000);
    }

    #[test]
    fn test_parse_empty_sections() {
        let config: SeedConfig = toml::from_str("").unwrap();
        assert!(config.users.is_empty());
        assert!(config.products.is_empty());
        assert!(config.quote_templates.is_empty());
    }
}
