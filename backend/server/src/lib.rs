//! Backend for the blog.
//!
//! Serves the built frontend and a small JSON API over articles kept in Redis.
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/api/articles/{name}` | |
//! | POST | `/api/articles/{name}/upvote` | |
//! | POST | `/api/articles/{name}/add-comment` | `{"username": "...", "text": "..."}` |
//! | GET | anything else | static file, or `index.html` so the frontend router can take over |
//!
//! Every API route answers with the article as stored after the call. Failures share one shape,
//! only the message differs:
//!
//! ```json
//! { "message": "...", "error": "..." }
//! ```
//!
//! - 404 `Article not found` when the article was never seeded, nothing is created
//! - 400 `Malformed payload` when the comment body is not `{username, text}`
//! - 500 `Error connecting to db` when the store cannot be reached or a call fails
//!
//! A GET on the upvote or comment paths is not an API call and gets the frontend like any other page.
//!
//!
//!
//! # Environment
//!
//! | Variable | Default |
//! |---|---|
//! | `BLOG_PORT` | `8000` |
//! | `BLOG_DB_ADDRESS` | `redis://127.0.0.1:6379` |
//! | `BLOG_DB_NAME` | `my-blog` |
//! | `BLOG_STATIC_DIR` | `build` |
//! | `BLOG_DB_CONNECT_TIMEOUT_MS` | `2000` |
//!
//! Logging is controlled by `RUST_LOG`.
//!
//!
//!
//! # Setup
//!
//! Seed the default articles, then start the server.
//! ```sh
//! cargo run -p blog-seed -- seed
//! RUST_LOG=info cargo run -p blog-server
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use error::AppError;
use routes::{add_comment_handler, article_handler, upvote_handler};
use state::State;

pub async fn start_server() -> Result<(), AppError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config)?;

    serve(state).await
}

/// Binds the configured port and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: Arc<State>) -> Result<(), AppError> {
    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let frontend = ServeDir::new(&state.config.static_dir)
        .fallback(ServeFile::new(state.config.index_file()));

    Router::new()
        .route("/api/articles/{name}", get(article_handler))
        .route(
            "/api/articles/{name}/upvote",
            post(upvote_handler).get_service(frontend.clone()),
        )
        .route(
            "/api/articles/{name}/add-comment",
            post(add_comment_handler).get_service(frontend.clone()),
        )
        .fallback_service(frontend)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
