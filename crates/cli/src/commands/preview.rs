use super::site;
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use folio_core::Route;
use folio_generator::{GenerateOptions, generate_site};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use percent_encoding::percent_decode_str;
use std::{net::SocketAddr, path::PathBuf};
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::debug;

#[derive(Clone)]
struct AppState {
    site_path: PathBuf,
    reload_tx: broadcast::Sender<()>,
}

/// Start preview server with hot reload for local development.
///
/// Every request re-reads the site and renders it in memory, so what is
/// served always matches the files on disk. Pages subscribe to `/_reload`
/// and refresh when the watcher sees a change.
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("🖋  Starting preview server...");
    println!("   Site: {}", path.display());

    let site = site::load(&path)?;

    println!("   ✓ Loaded: {}", site.config.metadata.title);
    println!("   ✓ Posts: {}", site.posts.len());
    println!("   ✓ Pages: {}", site.pages.len());
    site::print_report(&site.report);

    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        site_path: path.clone(),
        reload_tx: reload_tx.clone(),
    };

    let watcher_path = path.clone();
    let watcher_tx = reload_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_path, watcher_tx).await {
            eprintln!("File watcher error: {}", e);
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/_reload", get(sse_handler))
        .fallback(site_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch for file changes and trigger reload
async fn watch_files(path: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                // Editors write hidden swap files and `~` backups
                if event.paths.iter().any(|p| {
                    let filename = p.file_name().unwrap_or_default().to_string_lossy();
                    !filename.starts_with('.') && !filename.ends_with('~')
                }) {
                    debug!(paths = ?event.paths, "change detected");
                    println!("   📝 File changed, reloading...");
                    let _ = reload_tx.send(());
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    yield Ok(Event::default().data("reload"));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Serve a file from the static dir, a generated asset, or a rendered page.
///
/// Static files are checked before the site is collected and rendered.
async fn site_handler(State(state): State<AppState>, request: Request) -> Response {
    let config = match site::load_config(&state.site_path) {
        Ok(config) => config,
        Err(e) => return error_page("Configuration Error", &format!("{:#}", e)),
    };

    // Tag routes may hold spaces or `#`, which arrive percent-encoded
    let request_path = percent_decode_str(request.uri().path())
        .decode_utf8_lossy()
        .into_owned();
    let route = Route::parse(&request_path).ok();
    let static_dir = state.site_path.join(&config.content.static_dir);

    // Static files win over generated assets, same as `build`
    let is_static_file = route
        .as_ref()
        .map(|r| static_dir.join(r.as_str().trim_start_matches('/')).is_file())
        .unwrap_or(false);
    if is_static_file {
        return serve_static(static_dir, request).await;
    }

    let site = match site::collect(&state.site_path, config) {
        Ok(site) => site,
        Err(e) => return error_page("Configuration Error", &format!("{:#}", e)),
    };

    let generated = match generate_site(
        &site.config,
        &site.posts,
        &site.pages,
        GenerateOptions { preview: true },
    ) {
        Ok(generated) => generated,
        Err(e) => return error_page("Build Error", &e.to_string()),
    };

    let name = request_path.trim_start_matches('/');
    if let Some(bytes) = generated.asset(name) {
        return ([(header::CONTENT_TYPE, content_type(name))], bytes.to_vec()).into_response();
    }

    if let Some(html) = route.as_ref().and_then(|r| generated.page(r.as_str())) {
        return Html(html.to_string()).into_response();
    }

    serve_static(static_dir, request).await
}

async fn serve_static(static_dir: PathBuf, request: Request) -> Response {
    match ServeDir::new(static_dir).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn content_type(name: &str) -> &'static str {
    if name.ends_with(".css") {
        "text/css; charset=utf-8"
    } else if name.ends_with(".js") {
        "application/javascript; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

fn error_page(title: &str, message: &str) -> Response {
    let html = format!(
        r#"<!DOCTYPE html>
<html><head><title>{title}</title></head><body>
<h1>{title}</h1>
<pre>{message}</pre>
<script>
    const source = new EventSource('/_reload');
    source.onmessage = () => location.reload();
</script>
</body></html>"#,
        title = html_escape(title),
        message = html_escape(message),
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
}
