//! Static file server over the build output.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use pressmark_core::Config;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    output_dir: Arc<PathBuf>,
}

/// Serve the output directory until interrupted
pub async fn serve_site(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    let output_dir = config.output_dir();
    let port = port.unwrap_or(config.server.port);

    if !output_dir.join("index.html").is_file() {
        tracing::warn!("No index.html in {:?}; run `pressmark build` first", output_dir);
    }

    let app = router(output_dir);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Serving on http://localhost:{}", port);
    println!("\nServing at http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(output_dir: PathBuf) -> Router {
    let state = AppState {
        output_dir: Arc::new(output_dir),
    };

    Router::new()
        .route("/", get(serve_path))
        .route("/{*path}", get(serve_path))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve a file, a directory's index.html, or fall back to the site index
async fn serve_path(State(state): State<AppState>, uri: Uri) -> Response {
    if let Some(file_path) = resolve(&state.output_dir, uri.path()) {
        if let Ok(content) = fs::read(&file_path).await {
            return file_response(&file_path, content);
        }
    }

    let index_path = state.output_dir.join("index.html");
    match fs::read(&index_path).await {
        Ok(content) => file_response(&index_path, content),
        Err(_) => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Map a request path onto the output directory, rejecting escapes
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let path = root.join(relative);
    if path.is_dir() {
        Some(path.join("index.html"))
    } else {
        Some(path)
    }
}

fn file_response(path: &Path, content: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for_path(path))],
        content,
    )
        .into_response()
}

fn content_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
