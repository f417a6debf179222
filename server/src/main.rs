use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use drawpilot_shared::{GENERATE_PATH, GUIDANCE_PATH, IMAGE_EDIT_PATH, MAX_REQUEST_BYTES};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

mod error;
mod handlers;
mod logic;
mod model;
mod state;

use crate::handlers::{generate_handler, guidance_handler, image_edit_handler, ping_handler};
use crate::model::{GeminiModel, ImageModel, ModelConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::state::AppState;

/// Oversized bodies must reach the handler so they get a JSON 413.
const BODY_LIMIT_BYTES: usize = MAX_REQUEST_BYTES + 1024 * 1024;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    public_dir: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,
    #[arg(long, default_value_t = 120)]
    upstream_timeout_secs: u64,
    #[arg(long, requires = "tls_key")]
    tls_cert: Option<PathBuf>,
    #[arg(long, requires = "tls_cert")]
    tls_key: Option<PathBuf>,
}

fn build_model(args: &Args) -> Option<Arc<dyn ImageModel>> {
    let api_key = std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let Some(api_key) = api_key else {
        log::warn!("GEMINI_API_KEY is not set, AI endpoints will answer 500");
        return None;
    };
    let mut config = ModelConfig::new(api_key);
    config.model = args.model.clone();
    config.api_base = args.api_base.clone();
    config.timeout = Duration::from_secs(args.upstream_timeout_secs.max(1));
    match GeminiModel::new(config) {
        Ok(model) => {
            log::info!("Using model {} at {}", args.model, args.api_base);
            Some(Arc::new(model))
        }
        Err(error) => {
            log::error!("Failed to build model client: {error}");
            None
        }
    }
}

fn build_router(state: AppState, public_dir: PathBuf) -> Router {
    let api = Router::new()
        .route(GUIDANCE_PATH, post(guidance_handler))
        .route(GENERATE_PATH, post(generate_handler))
        .route(IMAGE_EDIT_PATH, post(image_edit_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/ping", get(ping_handler))
        .merge(api)
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let state = AppState::new(build_model(&args));
    let public_dir = args
        .public_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    let app = build_router(state, public_dir);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    if let (Some(cert), Some(key)) = (args.tls_cert, args.tls_key) {
        let config = RustlsConfig::from_pem_file(cert, key)
            .await
            .expect("Failed to load TLS certificate");
        log::info!("DrawPilot running at https://localhost:{port}");
        axum_server::bind_rustls(addr, config)
            .serve(app.into_make_service())
            .await
            .expect("Server crashed");
        return;
    }

    log::info!("DrawPilot running at http://localhost:{port}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    axum::serve(listener, app).await.expect("Server crashed");
}
