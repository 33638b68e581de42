//! HTTP API: JSON endpoints over the conversation store and the generator.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use pageforge_core::ForgeError;
use pageforge_generator::HtmlGenerator;
use pageforge_store::{display_name, ConversationStore};

/// Conversation name given to image-originated conversations, which have no
/// initiating prompt to derive one from.
const IMAGE_CONVERSATION_NAME: &str = "Generated from image";

/// Shared application state for API handlers.
pub struct AppState {
    pub store: ConversationStore,
    pub generator: HtmlGenerator,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate-html", post(generate_html))
        .route("/save-html", post(save_html))
        .route("/get-conversation", get(get_conversation))
        .route("/get-conversations", get(get_conversations))
        .route("/reset-template", post(reset_template))
        .route("/undo", post(undo))
        .route("/image-to-html", post(image_to_html))
        .route("/regenerate-image", post(regenerate_image))
        .route("/api/health", get(health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub instruction: String,
    /// Whether to also generate a background image. Defaults to off.
    #[serde(rename = "addImage", default)]
    pub add_image: bool,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub html_content: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UndoRequest {
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageToHtmlRequest {
    /// Base64-encoded image bytes.
    pub image: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub conversation_id: String,
    /// Defaults to on: regenerating without an image would be a no-op.
    #[serde(rename = "addImage", default = "default_true")]
    pub add_image: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "pageforge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn generate_html(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Value>, StatusCode> {
    handle_generate(&state, req).await.map(Json).map_err(into_status)
}

async fn save_html(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<Value>, StatusCode> {
    handle_save(&state, req).await.map(Json).map_err(into_status)
}

async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<Value> {
    Json(handle_history(&state, query).await)
}

async fn get_conversations(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(handle_list(&state).await)
}

async fn reset_template(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(handle_reset(&state).await)
}

async fn undo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UndoRequest>,
) -> Json<Value> {
    Json(handle_undo(&state, req).await)
}

async fn image_to_html(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImageToHtmlRequest>,
) -> Result<Json<Value>, StatusCode> {
    handle_image_to_html(&state, req).await.map(Json).map_err(into_status)
}

async fn regenerate_image(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<Value>, StatusCode> {
    handle_regenerate(&state, req).await.map(Json).map_err(into_status)
}

fn into_status(err: ForgeError) -> StatusCode {
    error!(error = %err, "request failed");
    match err {
        ForgeError::RemoteApi { .. } => StatusCode::BAD_GATEWAY,
        ForgeError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ---------------------------------------------------------------------------
// Endpoint logic, separated from the axum plumbing for testability
// ---------------------------------------------------------------------------

/// Create a new conversation from an instruction, or apply the instruction as
/// a change to an existing one.
pub(crate) async fn handle_generate(
    state: &AppState,
    req: GenerateRequest,
) -> Result<Value, ForgeError> {
    if state.store.contains(&req.conversation_id).await {
        let current = state
            .store
            .read_current(&req.conversation_id)
            .await
            .unwrap_or_default();
        let html = state.generator.apply_change(&current, &req.instruction).await?;
        state.store.append(&req.conversation_id, html.clone()).await?;
        return Ok(json!({ "html": html }));
    }

    let mut html = state.generator.generate_initial(&req.instruction).await?;
    if req.add_image {
        html = state
            .generator
            .add_background_image(&html, &req.instruction)
            .await
            .into_markup();
    }
    state
        .store
        .create(
            &req.conversation_id,
            display_name(&req.instruction),
            Some(req.instruction.clone()),
            html.clone(),
        )
        .await?;
    Ok(json!({ "html": html }))
}

/// Append a caller-supplied snapshot verbatim, bypassing generation.
pub(crate) async fn handle_save(state: &AppState, req: SaveRequest) -> Result<Value, ForgeError> {
    match state.store.append(&req.conversation_id, req.html_content).await {
        Ok(()) => Ok(json!({ "status": "success" })),
        Err(ForgeError::ConversationNotFound(_)) => {
            Ok(json!({ "status": "failed", "reason": "Invalid conversation ID" }))
        }
        Err(e) => Err(e),
    }
}

/// Full-history export: all snapshots joined in order. A debug/legacy view;
/// concatenated full documents are not themselves valid markup.
pub(crate) async fn handle_history(state: &AppState, query: HistoryQuery) -> Value {
    json!({ "html": state.store.read_concatenated(&query.conversation_id).await })
}

pub(crate) async fn handle_list(state: &AppState) -> Value {
    json!({ "conversations": state.store.list().await })
}

pub(crate) async fn handle_reset(state: &AppState) -> Value {
    state.store.reset().await;
    json!({ "status": "reset successful" })
}

pub(crate) async fn handle_undo(state: &AppState, req: UndoRequest) -> Value {
    json!({ "html": state.store.undo(&req.conversation_id).await })
}

/// Seed a conversation from an uploaded image, or treat the generated markup
/// as a change request against an existing conversation.
pub(crate) async fn handle_image_to_html(
    state: &AppState,
    req: ImageToHtmlRequest,
) -> Result<Value, ForgeError> {
    let html = state.generator.image_to_html(&req.image).await?;

    if !state.store.contains(&req.conversation_id).await {
        state
            .store
            .create(&req.conversation_id, IMAGE_CONVERSATION_NAME, None, html.clone())
            .await?;
        return Ok(json!({ "html": html }));
    }

    let current = state
        .store
        .read_current(&req.conversation_id)
        .await
        .unwrap_or_default();
    let merged = state.generator.apply_change(&current, &html).await?;
    state.store.append(&req.conversation_id, merged.clone()).await?;
    Ok(json!({ "html": merged }))
}

/// Regenerate the background image for the current snapshot, replacing it in
/// place. Image-originated conversations have no original prompt to reuse and
/// fail deterministically with a soft status.
pub(crate) async fn handle_regenerate(
    state: &AppState,
    req: RegenerateRequest,
) -> Result<Value, ForgeError> {
    if !state.store.contains(&req.conversation_id).await {
        return Ok(json!({ "status": "failed", "reason": "No existing template to modify" }));
    }
    let Some(original_prompt) = state.store.original_prompt(&req.conversation_id).await else {
        return Ok(json!({
            "status": "failed",
            "reason": "no original prompt recorded for this conversation",
        }));
    };

    let mut current = state
        .store
        .read_current(&req.conversation_id)
        .await
        .unwrap_or_default();
    if req.add_image {
        current = state
            .generator
            .add_background_image(&current, &original_prompt)
            .await
            .into_markup();
    }
    state.store.replace_last(&req.conversation_id, current.clone()).await?;
    Ok(json!({ "html": current }))
}
