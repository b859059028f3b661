//! Development server: renders pages from the live collection, with locale
//! redirects and optional rebuild-on-change with live reload

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{ContentCollector, ContentStore};
use crate::i18n::Resolution;
use crate::pages::{PageRenderer, PageStatus};
use crate::seo;
use crate::Folio;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    folio: Folio,
    store: Arc<ContentStore>,
    pages: PageRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let collection = folio.collect()?;
    let store = Arc::new(ContentStore::new(collection));
    let pages = PageRenderer::new(&folio.config, folio.load_messages()?)?;

    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        folio: folio.clone(),
        store: store.clone(),
        pages,
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = router(state, folio);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let folio = folio.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_rebuild(folio, store, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<ServerState>, folio: &Folio) -> Router {
    Router::new()
        .route("/__livereload", get(livereload_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/robots.txt", get(robots_handler))
        .nest_service("/static", ServeDir::new(&folio.static_dir))
        .fallback(page_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Recollect on content changes and publish the new collection
///
/// A failed rebuild leaves the previous collection in place.
fn watch_and_rebuild(
    folio: Folio,
    store: Arc<ContentStore>,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if !folio.content_dir.exists() {
        tracing::warn!("Content directory {:?} does not exist, nothing to watch", folio.content_dir);
        return Ok(());
    }
    debouncer
        .watcher()
        .watch(&folio.content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", folio.content_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                // Filter out editor and VCS noise
                let relevant_events: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant_events.is_empty() {
                    continue;
                }

                for event in &relevant_events {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match ContentCollector::new(&folio).collect() {
                    Ok(collection) => {
                        let count = collection.len();
                        store.replace(collection);
                        tracing::info!("Rebuilt collection with {} posts", count);
                        // Notify all connected clients to reload
                        let _ = reload_tx.send(());
                    }
                    Err(e) => {
                        tracing::error!("Rebuild failed, keeping previous content: {}", e);
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

async fn sitemap_handler(State(state): State<Arc<ServerState>>) -> Response {
    if !state.folio.config.sitemap.enable {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    let collection = state.store.snapshot();
    let xml = seo::render_sitemap(&state.folio.config, state.pages.resolver(), &collection);
    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

async fn robots_handler(State(state): State<Arc<ServerState>>) -> Response {
    if !state.folio.config.sitemap.robots {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    seo::render_robots(&state.folio.config).into_response()
}

/// Resolve the locale of any other path, then render the page
async fn page_handler(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let path = uri.path();

    // Reserved paths are never locale-prefixed
    if state.folio.config.i18n.is_passthrough(path) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match state.pages.resolver().resolve(path) {
        Resolution::Redirect {
            location,
            permanent,
        } => {
            let location = match uri.query() {
                Some(query) => format!("{}?{}", location, query),
                None => location,
            };
            tracing::debug!("Redirecting {} to {}", path, location);
            if permanent {
                Redirect::permanent(&location).into_response()
            } else {
                Redirect::temporary(&location).into_response()
            }
        }
        Resolution::Resolved { locale, route } => {
            let route = percent_decode_str(&route).decode_utf8_lossy();
            let collection = state.store.snapshot();

            match state.pages.render_route(&collection, locale, &route) {
                Ok(page) => {
                    let status = match page.status {
                        PageStatus::Ok => StatusCode::OK,
                        PageStatus::NotFound => StatusCode::NOT_FOUND,
                    };
                    let html = if state.live_reload {
                        inject_live_reload(&page.html)
                    } else {
                        page.html
                    };
                    (status, Html(html)).into_response()
                }
                Err(e) => {
                    tracing::error!("Failed to render {}: {}", path, e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
                }
            }
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Collection;
    use std::fs;
    use tempfile::TempDir;

    fn state(config: &str, live_reload: bool) -> (TempDir, Arc<ServerState>) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), config).unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("hello.mdx"),
            "---\ntitle: Hello\ndate: 2024-01-15\nsummary: Hi\nlang: en\n---\nBody.\n",
        )
        .unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        let store = Arc::new(ContentStore::new(folio.collect().unwrap()));
        let pages = PageRenderer::new(&folio.config, folio.load_messages().unwrap()).unwrap();
        let (reload_tx, _) = broadcast::channel(16);

        let state = Arc::new(ServerState {
            folio,
            store,
            pages,
            reload_tx,
            live_reload,
        });
        (dir, state)
    }

    async fn get_page(state: &Arc<ServerState>, uri: &str) -> Response {
        page_handler(State(state.clone()), uri.parse::<Uri>().unwrap()).await
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_root_redirects_to_default_locale() {
        let (_dir, state) = state("url: https://example.dev\n", false);

        let response = get_page(&state, "/").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/en");

        let response = get_page(&state, "/fr/blog?page=2").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/en/fr/blog?page=2");
    }

    #[tokio::test]
    async fn test_permanent_redirects_when_configured() {
        let (_dir, state) = state("i18n:\n  permanent_redirect: true\n", false);
        let response = get_page(&state, "/blog").await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&response), "/en/blog");
    }

    #[tokio::test]
    async fn test_pages_and_not_found() {
        let (_dir, state) = state("title: Test\n", false);

        assert_eq!(get_page(&state, "/en").await.status(), StatusCode::OK);
        assert_eq!(get_page(&state, "/it/blog").await.status(), StatusCode::OK);
        assert_eq!(get_page(&state, "/en/blog/hello").await.status(), StatusCode::OK);
        assert_eq!(get_page(&state, "/it/blog/hello").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get_page(&state, "/en/blog/missing").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_passthrough_paths_are_not_redirected() {
        let (_dir, state) = state("title: Test\n", false);
        let response = get_page(&state, "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_pages_follow_store_swaps() {
        let (_dir, state) = state("title: Test\n", false);
        assert_eq!(get_page(&state, "/en/blog/hello").await.status(), StatusCode::OK);

        state.store.replace(Collection::empty());
        assert_eq!(get_page(&state, "/en/blog/hello").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sitemap_and_robots() {
        let (_dir, state) = state("url: https://example.dev\n", false);

        let response = sitemap_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );

        let response = robots_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body>x</body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</body>\n</html>"));

        let html = inject_live_reload("fragment");
        assert!(html.starts_with("fragment"));
        assert!(html.contains("<script>"));
    }
}
