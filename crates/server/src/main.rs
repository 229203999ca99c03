use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use frame_api::{advance, demo_frame, frame_html, maze_frame, ApiContext, FrameConfig};
use renderer::Renderer;
use shared::{
    domain::{Action, PlayerId},
    error::{ApiError, ErrorCode, FrameError},
    protocol::FrameSignaturePacket,
};
use storage::Storage;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext {
        storage,
        renderer: Renderer::new(),
        frames: FrameConfig {
            public_url: settings.public_url,
            demo_image_url: settings.demo_image_url,
            frame_size: settings.frame_size,
        },
    };

    let state = AppState { api };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/frame", get(get_frame))
        .route("/frame", post(post_frame))
        .route("/test/:code", get(probe_frame))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            Json(ApiError::new(ErrorCode::StoreUnavailable, e.to_string())),
        )
    })?;
    Ok("ok")
}

/// The static demo frame. No state is touched.
async fn get_frame(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let props = demo_frame(&state.api);
    let html = frame_html(&props).map_err(frame_error)?;
    Ok(Html(html))
}

/// A button press from a Farcaster client: run the full cycle and answer
/// with the next frame. Bodies that fail to parse count as a bare press.
async fn post_frame(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let packet: FrameSignaturePacket = if body.is_empty() {
        FrameSignaturePacket::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_default()
    };

    let cycle = advance(&state.api, packet.player(), packet.action())
        .await
        .map_err(frame_error)?;
    let props = maze_frame(&state.api, &cycle);
    let html = frame_html(&props).map_err(frame_error)?;
    Ok(Html(html))
}

/// Diagnostic probe: codes "1".."4" act before rendering, anything else
/// renders the current board untouched. Answers with the bare image data
/// URL rather than a frame document.
async fn probe_frame(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<String, (StatusCode, Json<ApiError>)> {
    let action = Action::from_probe_code(&code);
    let cycle = advance(&state.api, PlayerId::ANONYMOUS, action)
        .await
        .map_err(frame_error)?;
    Ok(cycle.image_data_url)
}

fn frame_error(error: FrameError) -> (StatusCode, Json<ApiError>) {
    let status = match &error {
        FrameError::TooManyButtons(_) => StatusCode::BAD_REQUEST,
        FrameError::StoreUnavailable(_) => StatusCode::BAD_GATEWAY,
        FrameError::RenderFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiError::from(error)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
