mod backend;
mod config;
mod routes;

use std::sync::Arc;

use axum::http::Method;
use catalog::{InMemoryPlaceStore, PlaceStore, ProfileDirectory, Role, UserProfile};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend::RemotePlaceStore;
use crate::config::AppConfig;
use crate::routes::{AppState, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(err) => {
            error!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    if !config.map.is_configured() {
        warn!("MAPBOX_TOKEN not set; /map will report the map as unconfigured");
    }

    let store: Arc<dyn PlaceStore> = match &config.backend {
        Some(backend) => {
            info!("using place backend at {}", backend.url);
            Arc::new(RemotePlaceStore::new(reqwest::Client::new(), backend))
        }
        None => {
            warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set; serving the sample listing");
            Arc::new(InMemoryPlaceStore::new())
        }
    };

    let profiles = ProfileDirectory::new();
    for id in &config.admin_ids {
        let mut admin = UserProfile::new(id.clone(), "");
        admin.role = Role::Admin;
        profiles.upsert(admin);
    }

    let addr = config.addr;
    let state = AppState {
        config: Arc::new(config),
        store,
        profiles: Arc::new(profiles),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS]);

    let app = router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!("gottago server listening on http://{addr}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("server error: {err}");
    }
}
