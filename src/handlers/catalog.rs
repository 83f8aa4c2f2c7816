use crate::{
    catalog::Catalog,
    error::ApiError,
    services::RecommendationService,
};
use actix_web::{web, HttpRequest, HttpResponse};
use std::path::PathBuf;
use tracing::{error, info, warn};

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Where the catalog is reloaded from, and who may trigger it.
#[derive(Debug, Clone)]
pub struct CatalogAdmin {
    pub path: PathBuf,
    pub token: Option<String>,
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            .service(web::resource("/stats").route(web::get().to(catalog_stats)))
            .service(web::resource("/reload").route(web::post().to(reload_catalog))),
    );
}

pub async fn catalog_stats(
    recommendations: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(recommendations.catalog().snapshot().stats()))
}

/// Re-read the catalog file and swap it in. The old catalog keeps serving if loading fails.
pub async fn reload_catalog(
    req: HttpRequest,
    admin: web::Data<CatalogAdmin>,
    recommendations: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let expected = admin
        .token
        .as_deref()
        .ok_or_else(|| ApiError::NotFound("catalog reload is disabled".to_string()))?;

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(expected) {
        warn!("Rejected catalog reload with missing or invalid admin token");
        return Err(ApiError::Unauthorized("invalid admin token".to_string()));
    }

    let path = admin.path.clone();
    info!("Reloading catalog from {}", path.display());
    let catalog = web::block(move || Catalog::load(path))
        .await
        .map_err(|e| ApiError::Internal(format!("catalog reload task failed: {}", e)))?
        .map_err(|e| {
            error!("Catalog reload failed, keeping current catalog: {}", e);
            e
        })?;

    let stats = catalog.stats();
    recommendations.catalog().replace(catalog);
    Ok(HttpResponse::Ok().json(stats))
}
