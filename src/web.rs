use crate::{
    app::{AppError, BrowseResponse, SavedTool, SessionStore, ToolHub},
    bookmarks::BookmarkState,
    catalog::{ToolId, ALL_CATEGORIES},
    eid::Eid,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio::signal;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct SharedState {
    hub: Arc<ToolHub>,
    sessions: Arc<SessionStore>,
}

impl SharedState {
    pub fn new(hub: Arc<ToolHub>, session_ttl: Duration) -> Self {
        Self {
            hub,
            sessions: Arc::new(SessionStore::new(session_ttl)),
        }
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/categories", get(categories))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", delete(close_session))
        .route("/api/sessions/:id/bookmarks", get(saved_tools))
        .route("/api/tools/search", post(search))
        .route("/api/bookmarks/toggle", post(toggle_bookmark))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(Arc::new(state))
}

async fn start_app(hub: ToolHub, listen: &str, session_ttl: Duration) -> anyhow::Result<()> {
    let state = SharedState::new(Arc::new(hub), session_ttl);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL.min(session_ttl));
        loop {
            interval.tick().await;
            sessions.evict_expired().await;
        }
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("listening on {listen}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => log::error!("failed to install signal handler: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

pub fn start_daemon(hub: ToolHub, listen: &str, session_ttl: Duration) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(hub, listen, session_ttl))
}

#[derive(Debug)]
struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            AppError::Catalog(_) | AppError::Search(_) => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn categories(State(state): State<Arc<SharedState>>) -> Json<Vec<String>> {
    Json(state.hub.category_options())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Eid,
}

async fn create_session(State(state): State<Arc<SharedState>>) -> Json<SessionResponse> {
    let session_id = state.sessions.create().await;
    Json(SessionResponse { session_id })
}

async fn close_session(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<Eid>,
) -> Result<StatusCode, HttpError> {
    state.sessions.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn saved_tools(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<Eid>,
) -> Result<Json<Vec<SavedTool>>, HttpError> {
    let bookmarks = state.sessions.bookmarks(&id).await?;
    Ok(Json(state.hub.saved_tools(&bookmarks)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub session_id: Eid,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

async fn search(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<BrowseResponse>, HttpError> {
    log::debug!("payload: {payload:?}");

    let bookmarks = state.sessions.bookmarks(&payload.session_id).await?;
    let category = payload.category.as_deref().unwrap_or(ALL_CATEGORIES);

    // embedding is CPU-bound
    let response = tokio::task::block_in_place(|| {
        state
            .hub
            .browse(payload.query.as_deref(), category, &bookmarks)
    })?;

    Ok(Json(response))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    pub session_id: Eid,
    pub tool_id: ToolId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub tool_id: ToolId,
    /// `None` when the tool is not in the catalog; nothing was changed.
    pub state: Option<BookmarkState>,
}

async fn toggle_bookmark(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, HttpError> {
    log::debug!("payload: {payload:?}");

    let new_state = state
        .sessions
        .with_session(&payload.session_id, |session| {
            state.hub.toggle_bookmark(&mut session.bookmarks, payload.tool_id)
        })
        .await?;

    Ok(Json(ToggleResponse {
        tool_id: payload.tool_id,
        state: new_state,
    }))
}
