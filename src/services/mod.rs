pub mod assistant;
pub mod gemini;
pub mod query_transformer;
pub mod ranking;
pub mod recommendation;
pub mod sanitizer;

// Re-export public types
pub use assistant::AssistantService;
pub use gemini::GeminiClient;
pub use query_transformer::QueryTransformer;
pub use recommendation::RecommendationService;
