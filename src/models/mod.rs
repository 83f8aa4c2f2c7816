use serde::{Deserialize, Serialize};

pub use chat::{ChatReply, ChatRole, ChatTurn, Suggestion};
pub use product::{CleanProduct, Product, NOT_AVAILABLE};
pub use profile::{SurveyAnswers, UserProfile};

mod chat;
mod product;
mod profile;

/// Query-string parameters for `GET /api/products`
#[derive(Debug, Clone, Deserialize)]
pub struct ProductQueryParams {
    pub query: String,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub count: Option<i64>,
}

/// Request body for a free-text product search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchRequest {
    pub query: String,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub count: Option<i64>,
}

/// Request body for profile-driven product recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecommendationRequest {
    pub profile: UserProfile,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<CleanProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub chat_history: Vec<ChatTurn>,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub ai_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_profile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryPayload {
    pub chat_history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePayload {
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummaryResponse {
    pub ai_profile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub catalog_products: usize,
}

/// Page size defaults shared by every product endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_count: usize,
    pub max_count: usize,
}

/// A resolved page window. Negative inputs clamp to zero; `count` is capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub start: usize,
    pub count: usize,
}

impl Paging {
    pub fn resolve(start: Option<i64>, count: Option<i64>, limits: &PageLimits) -> Self {
        let clamp = |v: i64| usize::try_from(v.max(0)).unwrap_or(usize::MAX);
        Self {
            start: start.map(clamp).unwrap_or(0),
            count: count
                .map(clamp)
                .unwrap_or(limits.default_count)
                .min(limits.max_count),
        }
    }
}
