use crate::{
    catalog::{Catalog, CatalogHandle},
    config::Config,
    error::Result,
    handlers::CatalogAdmin,
    ml::CachingEmbedder,
    models::PageLimits,
    routes::api_routes,
    services::{AssistantService, GeminiClient, QueryTransformer, RecommendationService},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::{net::TcpListener, sync::Arc, time::Duration};

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        // A catalog that fails to load is fatal at startup
        let catalog = CatalogHandle::new(Catalog::load(&self.config.catalog_path)?);

        let gemini = GeminiClient::new(&self.config)?;
        let embedder = CachingEmbedder::new(gemini.clone(), self.config.embedding_cache_size);
        let generator = Arc::new(gemini);

        let transformer = QueryTransformer::new(
            generator.clone(),
            self.config.chat_model.clone(),
            self.config.category_vocabulary.clone(),
            self.config.paraphrase_cache_ttl_secs,
        );

        let recommendation_service = web::Data::new(RecommendationService::new(
            catalog,
            transformer,
            Arc::new(embedder),
            Duration::from_secs(self.config.upstream_timeout_secs),
        ));
        let assistant_service = web::Data::new(AssistantService::new(
            generator,
            self.config.chat_model.clone(),
            self.config.profile_model.clone(),
        ));
        let page_limits = web::Data::new(PageLimits {
            default_count: self.config.default_page_size,
            max_count: self.config.max_page_size,
        });
        let catalog_admin = web::Data::new(CatalogAdmin {
            path: self.config.catalog_path.clone(),
            token: self.config.admin_token.clone(),
        });

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(recommendation_service.clone())
                .app_data(assistant_service.clone())
                .app_data(page_limits.clone())
                .app_data(catalog_admin.clone())
                .service(api_routes())
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
