use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::archive::ARCHIVE_NAME;
use crate::error::ShareError;
use crate::registry::base_name;
use crate::state::AppState;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Shared Files</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: Arial, sans-serif;
            background-color: #333;
            color: #ddd;
            padding: 20px;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 90%;
            flex-direction: column;
        }
        a, p {
            color: white;
            text-decoration: none;
            padding: 10px;
            margin: 5px;
            background: #121212;
            width: 90vw;
            text-align: center;
        }
        a:hover { text-decoration: underline; }
        p, p a { background-color: #00061f; }
    </style>
</head>
<body>
    <h1>Shared Files</h1>
{{FILE_LINKS}}
    <p><a href="/download_all">Download All as ZIP</a></p>
</body>
</html>
"#;

/// The full route table. Everything hangs off one [`AppState`].
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/file/{index}", get(serve_file))
        .route("/download_all", get(download_all))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// One link per registry entry, in registration order. An empty registry
/// still renders the page, just with no file links.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let links: String = state
        .registry
        .list()
        .iter()
        .enumerate()
        .map(|(i, path)| {
            format!(
                "    <a href=\"/file/{i}\">{}</a>\n",
                escape_html(&base_name(path))
            )
        })
        .collect();

    Html(INDEX_HTML.replace("{{FILE_LINKS}}", &links))
}

/// Streams the shared file at `index` as an attachment.
pub async fn serve_file(
    Path(index): Path<usize>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ShareError> {
    let path = state.registry.get(index)?;

    let filename = base_name(&path);
    let mime_type = mime_guess::from_path(&path).first_or_octet_stream();

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(ShareError::Unreadable)?;
    let size = file
        .metadata()
        .await
        .map_err(ShareError::Unreadable)?
        .len();

    info!(index, file = %filename, size, "serving shared file");

    let stream = tokio_util::io::ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let disposition = format!(
        "attachment; filename=\"{}\"",
        filename.replace('"', "\\\"")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, size.to_string()),
        ],
        body,
    ))
}

/// Everything in the registry as one ZIP, rebuilt only when the registry
/// changed since the last call.
pub async fn download_all(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ShareError> {
    let (paths, generation) = state.registry.snapshot();
    if paths.is_empty() {
        return Err(ShareError::NothingShared);
    }

    let bytes = state.archive.get_or_build(generation, &paths).await?;

    info!(files = paths.len(), size = bytes.len(), "serving archive");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_NAME}\""),
            ),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        axum::body::Body::from(bytes),
    ))
}

/// Escapes a file name for embedding in the index page markup.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
