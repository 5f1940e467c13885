use crate::core::filter_tree::ParentSync;
use crate::core::pricing::PricingPolicy;
use crate::core::search::{DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_LENGTH};
use crate::utils::error::{Result, StorefrontError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub cart_id: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub eco_threshold: Decimal,
    pub eco_discount_percentage: Decimal,
    pub location_offer_discount_percentage: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let policy = PricingPolicy::default();
        Self {
            eco_threshold: policy.eco_threshold,
            eco_discount_percentage: policy.eco_discount_percentage,
            location_offer_discount_percentage: crate::core::offers::default_location_offer_percentage(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub default_min_price: Decimal,
    pub default_max_price: Decimal,
    pub parent_sync: ParentSync,
    pub search_debounce_ms: u64,
    pub min_search_length: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_min_price: Decimal::ONE,
            default_max_price: Decimal::ONE_HUNDRED,
            parent_sync: ParentSync::default(),
            search_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            min_search_length: DEFAULT_MIN_QUERY_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub path: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: "./storefront-settings.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

impl StorefrontConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StorefrontError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StorefrontError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StorefrontError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            eco_threshold: self.pricing.eco_threshold,
            eco_discount_percentage: self.pricing.eco_discount_percentage,
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.listing.search_debounce_ms)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for StorefrontConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;

        if let Some(cart_id) = &self.api.cart_id {
            validation::validate_non_empty_string("api.cart_id", cart_id)?;
        }
        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }

        validation::validate_range(
            "pricing.eco_threshold",
            self.pricing.eco_threshold,
            Decimal::ZERO,
            Decimal::ONE,
        )?;
        validation::validate_percentage(
            "pricing.eco_discount_percentage",
            self.pricing.eco_discount_percentage,
        )?;
        validation::validate_percentage(
            "pricing.location_offer_discount_percentage",
            self.pricing.location_offer_discount_percentage,
        )?;

        validation::validate_price_bounds(
            "listing.default_min_price",
            self.listing.default_min_price,
            self.listing.default_max_price,
        )?;
        validation::validate_positive_number(
            "listing.min_search_length",
            self.listing.min_search_length as u64,
            1,
        )?;

        validation::validate_path("settings.path", &self.settings.path)?;

        if let Some(level) = self.log_level() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(StorefrontError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Unsupported level. Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[api]
base_url = "https://api.example.com"
"#;

        let config = StorefrontConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.pricing_policy(), PricingPolicy::default());
        assert_eq!(config.listing.parent_sync, ParentSync::Lenient);
        assert_eq!(config.listing.default_max_price, Decimal::ONE_HUNDRED);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
base_url = "https://api.example.com/v1"
cart_id = "01HCART"
timeout_seconds = 5

[pricing]
eco_threshold = 0.6
eco_discount_percentage = 7.5
location_offer_discount_percentage = 10

[listing]
default_min_price = 5
default_max_price = 250
parent_sync = "strict"
search_debounce_ms = 150
min_search_length = 3

[settings]
path = "./flags.json"

[logging]
level = "debug"
json = true
"#;

        let config = StorefrontConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.cart_id.as_deref(), Some("01HCART"));
        assert_eq!(config.pricing.eco_threshold, Decimal::new(6, 1));
        assert_eq!(config.pricing.eco_discount_percentage, Decimal::new(75, 1));
        assert_eq!(config.listing.parent_sync, ParentSync::Strict);
        assert_eq!(config.listing.min_search_length, 3);
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STOREFRONT_TEST_CART_ID", "cart-from-env");

        let toml_content = r#"
[api]
base_url = "https://api.example.com"
cart_id = "${STOREFRONT_TEST_CART_ID}"
"#;

        let config = StorefrontConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.cart_id.as_deref(), Some("cart-from-env"));

        std::env::remove_var("STOREFRONT_TEST_CART_ID");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = StorefrontConfig::from_toml_str(
            r#"
[api]
base_url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(invalid_url.validate().is_err());

        let inverted_prices = StorefrontConfig::from_toml_str(
            r#"
[api]
base_url = "https://api.example.com"

[listing]
default_min_price = 200
default_max_price = 100
"#,
        )
        .unwrap();
        assert!(inverted_prices.validate().is_err());

        let bad_threshold = StorefrontConfig::from_toml_str(
            r#"
[api]
base_url = "https://api.example.com"

[pricing]
eco_threshold = 1.5
"#,
        )
        .unwrap();
        assert!(bad_threshold.validate().is_err());

        let bad_level = StorefrontConfig::from_toml_str(
            r#"
[api]
base_url = "https://api.example.com"

[logging]
level = "loud"
"#,
        )
        .unwrap();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_unknown_parent_sync_is_a_parse_error() {
        let result = StorefrontConfig::from_toml_str(
            r#"
[api]
base_url = "https://api.example.com"

[listing]
parent_sync = "sometimes"
"#,
        );
        assert!(matches!(
            result,
            Err(StorefrontError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"http://localhost:8091\"\n")
            .unwrap();

        let config = StorefrontConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8091");
    }
}
