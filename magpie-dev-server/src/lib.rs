//! Development server: serves the output directory, rebuilds on source
//! changes, and reloads connected browsers via a polling endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use axum::{
    Json, Router,
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use magpie_core::{BuildStats, Builder, Project};
use tower_http::services::ServeDir;

pub mod watcher;

pub use watcher::{ChangeSet, Watcher};

/// Script injected into served HTML pages. Polls the reload endpoint once a
/// second and reloads when a build finished after the last check.
const RELOAD_SCRIPT: &str = r#"
<script>
(function() {
  let lastCheck = Date.now();
  setInterval(function() {
    fetch('/__reload')
      .then(r => r.json())
      .then(data => {
        if (data.last_build > lastCheck) {
          location.reload();
        }
        lastCheck = Date.now();
      })
      .catch(() => {});
  }, 1000);
})();
</script>
"#;

#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Auto-open browser
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            open: false,
        }
    }
}

struct ServerState {
    /// Epoch milliseconds of the last successful build.
    last_build: AtomicU64,
    /// Set while a rebuild is running; overlapping change notifications are
    /// suppressed so only one rebuild is in flight at a time.
    rebuilding: AtomicBool,
}

/// A live-reloading development server for one project.
pub struct DevServer {
    project: Project,
    config: DevServerConfig,
}

impl DevServer {
    pub fn new(project: Project, config: DevServerConfig) -> Self {
        Self { project, config }
    }

    /// Build the site, start watching `site/` for changes, and serve the
    /// output directory until interrupted.
    pub async fn run(self) -> Result<()> {
        let project = self.project;

        println!("Building site...");
        let stats = Builder::new(&project).build()?;
        print_stats(&stats);

        let state = Arc::new(ServerState {
            last_build: AtomicU64::new(now_millis()),
            rebuilding: AtomicBool::new(false),
        });

        let (tx, mut rx) = tokio::sync::mpsc::channel::<ChangeSet>(16);
        let _watcher = Watcher::spawn(&project.site_dir(), move |changes| {
            let _ = tx.blocking_send(changes);
        })?;
        println!("Watching: {}", project.site_dir().display());

        {
            let project = project.clone();
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                while let Some(changes) = rx.recv().await {
                    // Single flight: a rebuild in progress swallows change
                    // notifications that arrive while it runs.
                    if state.rebuilding.swap(true, Ordering::SeqCst) {
                        continue;
                    }

                    let project = project.clone();
                    let state = Arc::clone(&state);
                    tokio::task::spawn_blocking(move || {
                        println!("Rebuilding... ({} files changed)", changes.len());
                        match Builder::new(&project).build() {
                            Ok(stats) => {
                                print_stats(&stats);
                                if stats.success() {
                                    state.last_build.store(now_millis(), Ordering::SeqCst);
                                }
                            }
                            Err(e) => eprintln!("Build error: {}", e),
                        }
                        state.rebuilding.store(false, Ordering::SeqCst);
                    });
                }
            });
        }

        let app = Router::new()
            .route("/__reload", get(reload_check))
            .fallback_service(ServeDir::new(project.output_dir()))
            .layer(middleware::from_fn(inject_reload_script))
            .with_state(Arc::clone(&state));

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        println!("Serving at http://{}", addr);

        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                eprintln!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn reload_check(State(state): State<Arc<ServerState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "last_build": state.last_build.load(Ordering::SeqCst),
    }))
}

/// Buffer HTML responses and splice the reload script in before `</body>`.
async fn inject_reload_script(req: Request, next: Next) -> Response {
    let res = next.run(req).await;

    let is_html = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if !is_html {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let Ok(bytes) = axum::body::to_bytes(body, usize::MAX).await else {
        return Response::from_parts(parts, Body::empty());
    };

    let injected = inject_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(injected))
}

/// Insert the live-reload script into an HTML document, before the closing
/// body tag when there is one.
pub fn inject_script(html: &str) -> String {
    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + RELOAD_SCRIPT.len());
        result.push_str(&html[..pos]);
        result.push_str(RELOAD_SCRIPT);
        result.push_str(&html[pos..]);
        result
    } else {
        format!("{}{}", html, RELOAD_SCRIPT)
    }
}

fn print_stats(stats: &BuildStats) {
    if stats.success() {
        println!(
            "✓ Built {} pages in {:.2}s",
            stats.files_built,
            stats.total_time.as_secs_f64()
        );
    } else {
        println!("✗ Build failed with {} errors", stats.errors.len());
        for error in &stats.errors {
            println!("  → {}", error);
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_before_closing_body() {
        let html = "<html><body><p>Hi</p></body></html>";
        let injected = inject_script(html);

        assert!(injected.contains("/__reload"));
        let script_pos = injected.find("<script>").unwrap();
        let body_pos = injected.find("</body>").unwrap();
        assert!(script_pos < body_pos);
        assert!(injected.ends_with("</body></html>"));
    }

    #[test]
    fn appends_when_no_body_tag() {
        let injected = inject_script("<p>fragment</p>");

        assert!(injected.starts_with("<p>fragment</p>"));
        assert!(injected.contains("/__reload"));
    }
}
