use actix_web::{web, Scope};

use crate::handlers::{assistant_config, catalog_config, health_check, products_config};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .configure(products_config)
        .configure(assistant_config)
        .configure(catalog_config)
}
