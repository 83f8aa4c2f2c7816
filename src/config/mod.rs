use crate::error::Result;
use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CATEGORY_VOCABULARY: &[&str] = &[
    "Reusable Bottles & Cups",
    "Reusable Bags",
    "Kitchen & Food Storage",
    "Cleaning Supplies",
    "Personal Care",
    "Bathroom",
    "Clothing & Accessories",
    "Home & Living",
    "Energy Saving",
    "Gardening & Composting",
    "Baby & Kids",
    "Office & Stationery",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub catalog_path: PathBuf,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub chat_model: String,
    pub profile_model: String,
    pub embedding_model: String,
    pub upstream_timeout_secs: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub paraphrase_cache_ttl_secs: u64,
    pub embedding_cache_size: usize,
    #[serde(default = "default_category_vocabulary")]
    pub category_vocabulary: Vec<String>,
    #[serde(default)]
    pub admin_token: Option<String>,
}

fn default_category_vocabulary() -> Vec<String> {
    DEFAULT_CATEGORY_VOCABULARY
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl Config {
    /// Load configuration from defaults, optional `config/` files and `APP_*` environment variables.
    pub fn load() -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("category_vocabulary"),
            );

        Self::from_builder(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("catalog_path", "data/products.csv")?
            .set_default(
                "gemini_base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("chat_model", "gemini-2.0-flash")?
            .set_default("profile_model", "gemini-2.0-flash-lite")?
            .set_default("embedding_model", "text-embedding-004")?
            .set_default("upstream_timeout_secs", 30)?
            .set_default("default_page_size", 20)?
            .set_default("max_page_size", 100)?
            .set_default("paraphrase_cache_ttl_secs", 3600)?
            .set_default("embedding_cache_size", 256)?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        use crate::error::ApiError;

        if self.gemini_api_key.trim().is_empty() {
            return Err(ApiError::Configuration(
                "gemini_api_key must not be empty".to_string(),
            ));
        }
        if self.max_page_size == 0 {
            return Err(ApiError::Configuration(
                "max_page_size must be at least 1".to_string(),
            ));
        }
        if self.category_vocabulary.is_empty() {
            return Err(ApiError::Configuration(
                "category_vocabulary must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
