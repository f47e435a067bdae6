//! HTTP server setup with Axum

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::rest::{analysis, state};
use super::websocket::{handler::ws_handler, state::AppState};

/// Create the Axum router with all relay endpoints
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // CORS configuration - dashboards are served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // REST API endpoints
        .route("/api/state", get(state::get_state))
        .route("/api/events", get(state::get_events))
        .route("/api/stats", get(state::get_stats))
        .route("/api/events/:id/analysis", get(analysis::get_event_analysis))
        .layer(cors)
        .with_state(app_state)
}

/// Serve the relay until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    app_state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(addr = ?addr, "relay listening");
    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendClient;
    use crate::state::ClientState;
    use crate::types::AggregateStats;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::util::ServiceExt;
    use url::Url;

    fn app_state() -> Arc<AppState> {
        let client = Arc::new(ClientState::new(10));
        // Nothing listens on the discard port; lookups fail fast
        let backend =
            BackendClient::new(Url::parse("http://127.0.0.1:9").unwrap(), Duration::from_secs(1))
                .unwrap();
        Arc::new(AppState::new(client, backend))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(app_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_state_endpoint_reflects_client_state() {
        let state = app_state();
        let stats: AggregateStats = [("total_events".to_string(), 42)].into_iter().collect();
        state.client.replace_snapshot(Vec::new(), stats);
        state.client.set_online(true);

        let (status, json) = get_json(create_router(Arc::clone(&state)), "/api/state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["version"], 2);
        assert_eq!(json["data"]["online"], true);
        assert_eq!(json["data"]["stats"]["total_events"], 42);

        let (_, json) = get_json(create_router(state), "/api/stats").await;
        assert_eq!(json["data"]["total_events"], 42);
    }

    #[tokio::test]
    async fn test_events_and_stats_versions_match_payload() {
        let state = app_state();
        let router = create_router(Arc::clone(&state));

        let (_, json) = get_json(router.clone(), "/api/events").await;
        assert_eq!(json["version"], 0);
        assert!(json["data"].as_array().unwrap().is_empty());

        let mut event = crate::types::Event::from_message(
            r#"{"id":1,"type":"PRIV_ESC","severity":"HIGH","details":"d","pid":5,"process_name":"sh","timestamp":"1"}"#,
        )
        .unwrap();
        state.client.apply_live_event(event.clone());
        event.id = Some(2);
        state.client.apply_live_event(event);

        let (_, json) = get_json(router.clone(), "/api/events").await;
        assert_eq!(json["version"], 2);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);

        let (_, json) = get_json(router, "/api/stats").await;
        assert_eq!(json["version"], 2);
        assert_eq!(json["data"]["total_events"], 2);
        assert_eq!(json["data"]["high_severity"], 2);
    }

    #[tokio::test]
    async fn test_analysis_backend_unreachable_is_bad_gateway() {
        let (status, json) = get_json(create_router(app_state()), "/api/events/5/analysis").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "BAD_GATEWAY");
    }
}
