use crate::{
    error::ApiError,
    models::{
        ChatHistoryPayload, ChatRequest, ChatResponse, ProfilePayload, ProfileSummaryResponse,
        SuggestionsResponse,
    },
    services::AssistantService,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};

pub fn assistant_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/chat").route(web::post().to(chat)))
        .service(web::resource("/chat/summary").route(web::post().to(summarize_chat)))
        .service(web::resource("/profile/summary").route(web::post().to(summarize_profile)))
        .service(web::resource("/suggestions").route(web::post().to(suggestions)));
}

/// Handle one turn of the AI chat
pub async fn chat(
    request: Json<ChatRequest>,
    assistant: web::Data<AssistantService>,
) -> Result<HttpResponse, ApiError> {
    let reply = assistant
        .chat(&request.chat_history, &request.profile)
        .await?;

    Ok(HttpResponse::Ok().json(ChatResponse {
        ai_response: reply.response,
        new_profile: reply.new_profile,
    }))
}

pub async fn summarize_chat(
    request: Json<ChatHistoryPayload>,
    assistant: web::Data<AssistantService>,
) -> Result<HttpResponse, ApiError> {
    let chat_history = assistant.summarize_chat(&request.chat_history).await?;
    Ok(HttpResponse::Ok().json(ChatHistoryPayload { chat_history }))
}

pub async fn summarize_profile(
    request: Json<ProfilePayload>,
    assistant: web::Data<AssistantService>,
) -> Result<HttpResponse, ApiError> {
    let ai_profile = assistant.summarize_profile(&request.profile).await?;
    Ok(HttpResponse::Ok().json(ProfileSummaryResponse { ai_profile }))
}

pub async fn suggestions(
    request: Json<ProfilePayload>,
    assistant: web::Data<AssistantService>,
) -> Result<HttpResponse, ApiError> {
    let suggestions = assistant.suggestions(&request.profile).await?;
    Ok(HttpResponse::Ok().json(SuggestionsResponse { suggestions }))
}
