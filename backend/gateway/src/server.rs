//! Main HTTP Gateway Server.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use appify_chat::ConversationController;

use crate::routes;
use crate::session_registry::SessionRegistry;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub controller: Arc<ConversationController>,
    pub sessions: SessionRegistry,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            controller: Arc::new(controller),
            sessions: SessionRegistry::new(),
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/sessions", post(routes::open_session))
        .route(
            "/api/sessions/:id",
            get(routes::reload_session).delete(routes::close_session),
        )
        .route("/api/sessions/:id/turns", post(routes::submit_turn))
        .route("/api/sessions/:id/api-key", post(routes::set_api_key))
        .route("/api/sessions/:id/download", get(routes::download))
        .route("/api/commands", get(routes::list_commands))
        .route("/api/fix-instruction", post(routes::build_fix_instruction))
        .route("/api/health", get(routes::health))
        .with_state(state)
}

/// Starts the Axum HTTP server and runs until Ctrl-C.
///
/// CORS is permissive: the host shell serves the UI from another origin.
#[instrument(skip(state))]
pub async fn start_server(bind: &str, state: GatewayState) -> Result<()> {
    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("[Gateway] HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("[Gateway] Shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use appify_chat::ChatSettings;
    use appify_core::{ChatStore, TurnResult};
    use appify_generator::{GeneratorRegistry, MockGenerator};
    use appify_store::InMemoryChatStore;

    fn app() -> (tempfile::TempDir, Arc<InMemoryChatStore>, Router) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryChatStore::new());
        let generator = MockGenerator::new("mock")
            .with_result(TurnResult::with_code("st.title('Hi')", "Added a title."));
        let controller = ConversationController::new(
            store.clone(),
            GeneratorRegistry::fixed(Arc::new(generator)),
            dir.path().join("streamlit_app.py"),
            ChatSettings::default(),
        );
        (dir, store, build_router(GatewayState::new(controller)))
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder
                .header("x-appify-user-id", user)
                .header("x-appify-username", "Ada");
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, req).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn open(app: &Router, user: &str) -> String {
        let (status, body) = send_json(app, request("POST", "/api/sessions", Some(user), None)).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let (_dir, _store, app) = app();
        let (status, _) = send(&app, request("POST", "/api/sessions", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, request("POST", "/api/sessions", Some("abc"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_open_session_greets_user() {
        let (_dir, _store, app) = app();
        let (status, body) = send_json(&app, request("POST", "/api/sessions", Some("7"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["view"], "chat");
        let messages = body["view"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["id"], "message_0");
        assert!(messages[0]["content"].as_str().unwrap().starts_with("Hello Ada!"));
    }

    #[tokio::test]
    async fn test_turn_then_download() {
        let (_dir, _store, app) = app();
        let id = open(&app, "7").await;

        let turn = request(
            "POST",
            &format!("/api/sessions/{id}/turns"),
            Some("7"),
            Some(json!({ "instruction": "add a title" })),
        );
        let (status, body) = send_json(&app, turn).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tries_left"], 4);
        assert!(body["message"].as_str().unwrap().ends_with("Added a title."));

        let resp = app
            .clone()
            .oneshot(request("GET", &format!("/api/sessions/{id}/download"), Some("7"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/x-python");
        assert!(resp.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("streamlit_app.py"));
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"st.title('Hi')");
    }

    #[tokio::test]
    async fn test_quota_exhausted_turn_is_402() {
        let (_dir, store, app) = app();
        store.set_tries(7, 4).await;
        let id = open(&app, "7").await;
        let uri = format!("/api/sessions/{id}/turns");

        let (status, _) = send(&app, request("POST", &uri, Some("7"), Some(json!({ "instruction": "hi" })))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.get_tries(7).await.unwrap(), 5);

        let (status, body) = send_json(&app, request("POST", &uri, Some("7"), Some(json!({ "instruction": "again" })))).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert!(body["error"].as_str().unwrap().contains("quota"));

        let key = request(
            "POST",
            &format!("/api/sessions/{id}/api-key"),
            Some("7"),
            Some(json!({ "api_key": "sk-own" })),
        );
        let (status, _) = send(&app, key).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send_json(&app, request("POST", &uri, Some("7"), Some(json!({ "instruction": "again" })))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["tries_left"].is_null());
    }

    #[tokio::test]
    async fn test_sessions_are_private() {
        let (_dir, _store, app) = app();
        let id = open(&app, "7").await;

        let turn = request(
            "POST",
            &format!("/api/sessions/{id}/turns"),
            Some("8"),
            Some(json!({ "instruction": "hi" })),
        );
        let (status, _) = send(&app, turn).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, request("DELETE", &format!("/api/sessions/{id}"), Some("7"), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, request("DELETE", &format!("/api/sessions/{id}"), Some("7"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_commands_and_fix_instruction() {
        let (_dir, _store, app) = app();

        let (status, body) = send_json(&app, request("GET", "/api/commands", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let aliases: Vec<_> = body.as_array().unwrap().iter().map(|c| c["alias"].clone()).collect();
        assert_eq!(aliases, vec![json!("/undo"), json!("/reset"), json!("/save")]);

        let fix = request("POST", "/api/fix-instruction", None, Some(json!({ "error": "NameError: x" })));
        let (status, body) = send_json(&app, fix).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["instruction"], "Fix this error: NameError: x");
        let notices = body["notices"].as_array().unwrap();
        assert_eq!(notices.len(), 2);
        assert!(notices[0]["text"].as_str().unwrap().contains("NameError: x"));
    }

    #[tokio::test]
    async fn test_reload_replays_conversation() {
        let (_dir, _store, app) = app();
        let id = open(&app, "7").await;
        let turn = request(
            "POST",
            &format!("/api/sessions/{id}/turns"),
            Some("7"),
            Some(json!({ "instruction": "add a title" })),
        );
        let (status, _) = send(&app, turn).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send_json(&app, request("GET", &format!("/api/sessions/{id}"), Some("7"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], id.as_str());
        assert_eq!(body["view"]["view"], "chat");
        let messages = body["view"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["content"], "add a title");
        assert_eq!(messages[2]["id"], "message_2");

        let (status, _) = send(&app, request("GET", &format!("/api/sessions/{id}"), Some("8"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_undo_and_save_turns() {
        let (_dir, _store, app) = app();
        let id = open(&app, "7").await;
        let uri = format!("/api/sessions/{id}/turns");
        let turn = |instruction: &str| request("POST", &uri, Some("7"), Some(json!({ "instruction": instruction })));

        let (status, _) = send(&app, turn("add a title")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send_json(&app, turn("/undo")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Code reverted");
        // Commands do not spend an attempt.
        assert_eq!(body["tries_left"], 4);

        let (status, bytes) = send(&app, request("GET", &format!("/api/sessions/{id}/download"), Some("7"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(bytes).unwrap(), appify_chat::PLACEHOLDER_CODE);

        let (status, body) = send_json(&app, turn("/save")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Code saved");
        assert_eq!(body["download"]["file_name"], "streamlit_app.py");
        assert_eq!(body["download"]["content"], appify_chat::PLACEHOLDER_CODE);

        let (_, body) = send_json(&app, request("GET", &format!("/api/sessions/{id}"), Some("7"), None)).await;
        let contents: Vec<_> = body["view"]["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(contents[1..], ["add a title", "/undo", "Code reverted", "/save", "Code saved"]);
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, _store, app) = app();
        open(&app, "1").await;
        let (status, body) = send_json(&app, request("GET", "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_sessions"], 1);
    }
}
