use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use noteweave_core::{
    AiAction, AiRequest, AiResponse, DeleteResponse, ErrorResponse, HealthResponse, Settings,
    SettingsError,
};
use noteweave_knowledge::{
    GraphView, KnowledgeError, KnowledgeSettings, Link, Note, NoteCreateRequest,
    NoteUpdateRequest, RelatedNote,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::assistant::{AssistantError, run_action};
use crate::state::{AppState, LogEntry};

/// Errors surfaced by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Note not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::Knowledge(KnowledgeError::UnknownNote(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Knowledge(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Assistant(AssistantError::Disabled) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Assistant(AssistantError::UnknownAction(_)) => StatusCode::BAD_REQUEST,
            ApiError::Assistant(AssistantError::Provider(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Settings(SettingsError::Invalid(_) | SettingsError::Parse(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<usize>,
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!("Server listening on {}", bind_addr);
    serve(listener, state).await?;
    Ok(())
}

/// Serve on an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/notes", get(list_notes_handler).post(create_note_handler))
        .route(
            "/notes/{id}",
            get(get_note_handler)
                .put(update_note_handler)
                .delete(delete_note_handler),
        )
        .route("/notes/{id}/related", get(related_handler))
        .route("/graph", get(graph_handler))
        .route("/links", get(links_handler))
        .route("/tags", get(tags_handler))
        .route("/ai", post(ai_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn log_requests(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    state.log(LogEntry::HttpRequest {
        method,
        path,
        status: response.status().as_u16(),
    });
    response
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_available: state.ai_available().await,
    })
}

async fn list_notes_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Note>>> {
    let notes = match query.q.as_deref() {
        Some(q) => state.engine.search(q).await?,
        None => state.engine.list_notes().await?,
    };
    Ok(Json(notes))
}

async fn create_note_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NoteCreateRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let note = state.engine.create_note(request).await?;
    state.log(LogEntry::NoteChanged {
        change: "created".to_string(),
        note_id: note.id.clone(),
    });
    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    state
        .engine
        .get_note(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<NoteUpdateRequest>,
) -> ApiResult<Json<Note>> {
    let note = state.engine.update_note(&id, request).await?;
    state.log(LogEntry::NoteChanged {
        change: "updated".to_string(),
        note_id: id,
    });
    Ok(Json(note))
}

async fn delete_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.engine.delete_note(&id).await?;
    if deleted {
        state.log(LogEntry::NoteChanged {
            change: "deleted".to_string(),
            note_id: id,
        });
    }
    Ok(Json(DeleteResponse { deleted }))
}

async fn related_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<RelatedQuery>,
) -> ApiResult<Json<Vec<RelatedNote>>> {
    // The default follows the live settings, which `PUT /settings` may change.
    let limit = match query.limit {
        Some(limit) => limit,
        None => KnowledgeSettings::from(&state.settings().await.knowledge).related_limit,
    };
    let related = state.engine.related(&id, Some(limit)).await?;
    Ok(Json(related))
}

async fn graph_handler(State(state): State<Arc<AppState>>) -> Json<GraphView> {
    Json(state.engine.graph().await)
}

async fn links_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Link>> {
    Json(state.engine.links().await)
}

async fn tags_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.engine.tags().await?))
}

/// AI handler - POST /ai
async fn ai_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AiRequest>,
) -> ApiResult<Json<AiResponse>> {
    let action: AiAction = request
        .action
        .parse()
        .map_err(|_| AssistantError::UnknownAction(request.action.clone()))?;
    let assistant = state.assistant().await?;

    let mut response = run_action(assistant.as_ref(), action, &request.content).await?;
    if action == AiAction::SmartSearch {
        response.matches = state
            .engine
            .search_terms(&response.terms)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
    }

    state.log(LogEntry::AiAction {
        action: action.to_string(),
        model: assistant.model().to_string(),
    });
    Ok(Json(response))
}

async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(state.settings().await)
}

async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> ApiResult<Json<Settings>> {
    let settings = state.replace_settings(settings).await?;
    Ok(Json(settings))
}
