pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ml;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, CatalogHandle};
pub use config::Config;
pub use error::{ApiError, Result};
