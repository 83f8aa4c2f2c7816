use crate::{
    error::ApiError,
    models::{
        PageLimits, Paging, ProductQueryParams, ProductSearchRequest, ProductsResponse,
        ProfileRecommendationRequest,
    },
    services::RecommendationService,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use tracing::info;

pub fn products_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .service(web::resource("").route(web::get().to(get_products)))
            .service(web::resource("/search").route(web::post().to(search_products)))
            .service(
                web::resource("/recommendations").route(web::post().to(recommend_products)),
            ),
    );
}

/// `GET /api/products?query=&start=&count=`
pub async fn get_products(
    params: web::Query<ProductQueryParams>,
    limits: web::Data<PageLimits>,
    recommendations: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let paging = Paging::resolve(params.start, params.count, &limits);
    let products = recommendations
        .get_products(&params.query, paging.start, paging.count)
        .await?;

    Ok(HttpResponse::Ok().json(ProductsResponse { products }))
}

/// Search for products based on a custom user query
pub async fn search_products(
    request: Json<ProductSearchRequest>,
    limits: web::Data<PageLimits>,
    recommendations: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let paging = Paging::resolve(request.start, request.count, &limits);
    info!("Product search: '{}'", request.query.trim());

    let products = recommendations
        .get_products(&request.query, paging.start, paging.count)
        .await?;

    Ok(HttpResponse::Ok().json(ProductsResponse { products }))
}

/// Generate product recommendations based on the user's profile
pub async fn recommend_products(
    request: Json<ProfileRecommendationRequest>,
    limits: web::Data<PageLimits>,
    recommendations: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let paging = Paging::resolve(request.start, request.count, &limits);
    let products = recommendations
        .recommend_for_profile(&request.profile, paging.start, paging.count)
        .await?;

    Ok(HttpResponse::Ok().json(ProductsResponse { products }))
}
