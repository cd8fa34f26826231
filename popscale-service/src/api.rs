//! HTTP API for the scaling service.
//!
//! - `GET /health`: liveness
//! - `GET /api/status`: latest scaling worker snapshot
//! - `GET|PUT /api/players`: read or push the live player count

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::coordinator::{ScalingStatus, StatusHandle};
use crate::error::ServiceError;
use crate::players::LivePlayerCount;

/// Application state
pub struct AppState {
    pub status: StatusHandle,
    /// Present only when the live player source is configured
    pub live: Option<LivePlayerCount>,
    pub start_time: Instant,
}

/// Build the API router
pub fn router(status: StatusHandle, live: Option<LivePlayerCount>) -> Router {
    let state = Arc::new(AppState {
        status,
        live,
        start_time: Instant::now(),
    });

    let api_routes = Router::new()
        .route("/status", get(status_handler))
        .route("/players", get(get_players_handler).put(update_players_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Health ===

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// === Status ===

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<ScalingStatus> {
    Json(ScalingStatus::clone(&state.status.load()))
}

// === Players ===

/// Body of `PUT /api/players` and response of both player endpoints.
/// A null count marks the population as unknown.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerCountBody {
    pub count: Option<u32>,
}

fn live_source(state: &AppState) -> Result<&LivePlayerCount, ServiceError> {
    state.live.as_ref().ok_or_else(|| ServiceError::InvalidRequest {
        message: "player count is read from the player list file".to_string(),
    })
}

async fn get_players_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlayerCountBody>, ServiceError> {
    let live = live_source(&state)?;
    Ok(Json(PlayerCountBody { count: live.get() }))
}

async fn update_players_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlayerCountBody>,
) -> Result<Json<PlayerCountBody>, ServiceError> {
    let live = live_source(&state)?;
    match request.count {
        Some(count) => live.set(count),
        None => live.clear(),
    }
    info!(count = ?request.count, "Live player count updated");
    Ok(Json(PlayerCountBody { count: live.get() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_swap::ArcSwap;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    fn status_handle() -> StatusHandle {
        Arc::new(ArcSwap::from_pointee(ScalingStatus::default()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn put_players(body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri("/api/players")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(status_handle(), None);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_status_reflects_snapshot() {
        let status = status_handle();
        status.store(Arc::new(ScalingStatus {
            players: Some(17),
            level: Some(2),
            writes: 1,
            ..ScalingStatus::default()
        }));

        let app = router(status, None);
        let response = app
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["players"], 17);
        assert_eq!(json["level"], 2);
        assert_eq!(json["writes"], 1);
    }

    #[tokio::test]
    async fn test_push_live_count() {
        let live = LivePlayerCount::new();
        let app = router(status_handle(), Some(live.clone()));

        let response = app
            .clone()
            .oneshot(put_players(r#"{"count": 23}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["count"], 23);
        assert_eq!(live.get(), Some(23));

        let response = app.oneshot(put_players(r#"{"count": null}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(live.get(), None);
    }

    #[tokio::test]
    async fn test_push_rejected_for_file_source() {
        let app = router(status_handle(), None);
        let response = app.oneshot(put_players(r#"{"count": 5}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "invalid_request");
    }
}
