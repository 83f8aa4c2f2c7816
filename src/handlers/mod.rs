pub mod assistant;
pub mod catalog;
pub mod health;
pub mod products;

pub use assistant::assistant_config;
pub use catalog::{catalog_config, CatalogAdmin};
pub use health::health_check;
pub use products::products_config;
