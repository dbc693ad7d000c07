//! HTTP routes for the notebook server.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{Html, Json},
    routing::get,
};
use lit_notebook::ServerType;
use lit_notebook::template::escape_attribute;
use serde::Serialize;
use tower_http::cors::CorsLayer;

/// Application state shared across handlers.
#[derive(Debug, Clone, Serialize)]
pub struct AppState {
    /// How the server is hosted.
    pub server_type: ServerType,
    /// Names of the loaded models, sorted.
    pub models: Vec<String>,
    /// Names of the loaded datasets, sorted.
    pub datasets: Vec<String>,
}

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/info", get(info_handler))
        // The notebook page is served from a different origin than the frame.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Landing page listing what the server was started with.
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(index_page(&state))
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Loaded model and dataset names.
async fn info_handler(State(state): State<Arc<AppState>>) -> Json<AppState> {
    Json(state.as_ref().clone())
}

fn index_page(state: &AppState) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>LIT</title>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 2rem; }}
        h1 {{ color: #7c3aed; }}
        .empty {{ color: #6b7280; font-style: italic; }}
    </style>
</head>
<body>
    <h1>LIT</h1>
    <p>Server type: <code>{server_type}</code></p>
    <h2>Models</h2>
    {models}
    <h2>Datasets</h2>
    {datasets}
</body>
</html>"#,
        server_type = state.server_type.as_str(),
        models = name_list(&state.models),
        datasets = name_list(&state.datasets),
    )
}

fn name_list(names: &[String]) -> String {
    if names.is_empty() {
        return r#"<p class="empty">none</p>"#.to_string();
    }
    let items: String = names
        .iter()
        .map(|name| format!("<li>{}</li>", escape_attribute(name)))
        .collect();
    format!("<ul>{items}</ul>")
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            server_type: ServerType::Notebook,
            models: vec!["sst2-tiny".to_string(), "<b>evil</b>".to_string()],
            datasets: vec![],
        })
    }

    async fn get_body(uri: &str) -> (StatusCode, String) {
        let response = create_router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_info_lists_names() {
        let (status, body) = get_body("/api/info").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["server_type"], "notebook");
        assert_eq!(json["models"][0], "sst2-tiny");
        assert_eq!(json["datasets"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_index_escapes_names() {
        let (status, body) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<li>sst2-tiny</li>"));
        assert!(body.contains("<li>&lt;b&gt;evil&lt;/b&gt;</li>"));
        assert!(body.contains(r#"<p class="empty">none</p>"#));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = get_body("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
