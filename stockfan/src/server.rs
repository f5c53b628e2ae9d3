//! HTTP entry point (feature `server`).
//!
//! | Method | Path       | Response                                        |
//! |--------|------------|-------------------------------------------------|
//! | GET    | `/`        | Minimal lookup form                              |
//! | POST   | `/lookup`  | form `code` → 200 rows / 400 / 404 `{"error"}`  |
//! | GET    | `/sources` | registered source ids and kinds                  |
//! | GET    | `/health`  | `ok`                                             |

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::lookup::{LookupError, StockLookup};

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Stock lookup</title></head>
<body>
<form id="lookup">
  <input name="code" placeholder="Product code" autofocus>
  <button type="submit">Look up</button>
</form>
<pre id="result"></pre>
<script>
document.getElementById("lookup").addEventListener("submit", async (e) => {
  e.preventDefault();
  const res = await fetch("/lookup", { method: "POST", body: new URLSearchParams(new FormData(e.target)) });
  document.getElementById("result").textContent = JSON.stringify(await res.json(), null, 2);
});
</script>
</body>
</html>
"#;

#[derive(Debug, Deserialize)]
struct LookupForm {
    #[serde(default)]
    code: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct SourceInfo {
    id: String,
    kind: &'static str,
}

/// Build the router over a shared coordinator.
pub fn router(lookup: Arc<StockLookup>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/lookup", post(lookup_stock))
        .route("/sources", get(list_sources))
        .route("/health", get(health))
        .with_state(lookup)
}

/// Serve until `shutdown` is cancelled.
pub async fn serve(
    addr: SocketAddr,
    lookup: Arc<StockLookup>,
    shutdown: CancellationToken,
) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(lookup))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn lookup_stock(
    State(lookup): State<Arc<StockLookup>>,
    Form(form): Form<LookupForm>,
) -> Response {
    match lookup.lookup(&form.code).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            let status = match e {
                LookupError::Validation(_) => StatusCode::BAD_REQUEST,
                LookupError::NotFound { .. } => StatusCode::NOT_FOUND,
            };
            (
                status,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn list_sources(State(lookup): State<Arc<StockLookup>>) -> Json<Vec<SourceInfo>> {
    let sources = lookup
        .registry()
        .iter()
        .map(|s| SourceInfo {
            id: s.id().to_string(),
            kind: s.location().kind().as_str(),
        })
        .collect();
    Json(sources)
}

async fn health() -> &'static str {
    "ok"
}
