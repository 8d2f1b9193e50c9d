//! Development server
//!
//! Routes are resolved against the in-memory content store on every request,
//! so the server needs no prior build. Files in the static directory are
//! served as-is when no content route matches.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::ContentStore;
use crate::generator::Generator;
use crate::helpers::{strip_root, watch_paths};
use crate::routing::path_segments;
use crate::Folio;

/// Everything needed to answer requests for one version of the content
pub struct Site {
    pub folio: Folio,
    pub store: ContentStore,
    generator: Generator,
}

impl Site {
    /// Load configuration and content from a site directory
    pub fn load(base_dir: &std::path::Path) -> Result<Self> {
        let folio = Folio::new(base_dir)?;
        Self::from_store(folio.clone(), folio.load_store()?)
    }

    pub fn from_store(folio: Folio, store: ContentStore) -> Result<Self> {
        let generator = Generator::new(&folio)?;
        Ok(Self {
            folio,
            store,
            generator,
        })
    }

    /// Render the content route for a request path; `None` if nothing matches.
    ///
    /// The configured root is stripped first, so paths outside it never
    /// match. Pages are tried before posts, and posts only when the first
    /// segment is the posts prefix.
    pub fn render_route(&self, path: &str) -> Result<Option<String>> {
        let Some(segments) = strip_root(&self.folio.config, path).and_then(path_segments) else {
            return Ok(None);
        };

        if segments.is_empty() {
            return self.generator.render_home(&self.store).map(Some);
        }

        if let Some(page) = self.store.pages_resolver().resolve(&segments) {
            return self.generator.render_page(page, &segments).map(Some);
        }

        if let Some((prefix, rest)) = segments.split_first() {
            if prefix == self.folio.config.posts_prefix() && !rest.is_empty() {
                if let Some(post) = self.store.posts_resolver().resolve(rest) {
                    return self.generator.render_post(&self.store, post).map(Some);
                }
            }
        }

        Ok(None)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.generator.render_not_found()
    }
}

/// Server state: the current site snapshot, swapped on reload
pub struct ServerState {
    site: RwLock<Arc<Site>>,
}

impl ServerState {
    pub fn new(site: Site) -> Self {
        Self {
            site: RwLock::new(Arc::new(site)),
        }
    }

    /// The current snapshot
    pub fn site(&self) -> Arc<Site> {
        self.site
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, site: Site) {
        *self.site.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(site);
    }
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let site = Site::from_store(folio.clone(), folio.load_store()?)?;
    let state = Arc::new(ServerState::new(site));
    let app = router(state.clone());

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Reloading content on change.");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let base_dir = folio.base_dir.clone();
        let watched = vec![folio.content_dir.clone(), folio.config_path()];
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(base_dir, watched, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reload the content store after each burst of changes
fn watch_and_reload(base_dir: PathBuf, watched: Vec<PathBuf>, state: Arc<ServerState>) -> Result<()> {
    watch_paths(&watched, || {
        // A failed reload keeps serving the previous snapshot.
        match Site::load(&base_dir) {
            Ok(site) => {
                tracing::info!(
                    "Reloaded {} pages and {} posts",
                    site.store.pages().len(),
                    site.store.posts().len()
                );
                state.replace(site);
            }
            Err(e) => tracing::error!("Reload failed: {:#}", e),
        }
        ControlFlow::Continue(())
    })
}

/// Resolve content routes, then static files, then 404
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
) -> Response {
    let site = state.site();
    let path = request.uri().path().to_string();

    match site.render_route(&path) {
        Ok(Some(html)) => return Html(html).into_response(),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to render {}: {:#}", path, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Render error").into_response();
        }
    }

    let static_uri = strip_root(&site.folio.config, &path).and_then(|relative| {
        let query = request.uri().query().map(|q| format!("?{}", q)).unwrap_or_default();
        format!("{}{}", relative, query).parse::<Uri>().ok()
    });

    if let (Some(uri), true) = (static_uri, site.folio.static_dir.is_dir()) {
        *request.uri_mut() = uri;
        let mut service = ServeDir::new(&site.folio.static_dir);
        match service.try_call(request).await {
            Ok(response) if response.status() != StatusCode::NOT_FOUND => {
                return response.into_response();
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to serve {}: {}", path, e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
            }
        }
    }

    tracing::debug!("Not found: {}", path);
    match site.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
