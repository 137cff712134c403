//! Atelier API Library
//!
//! Backend for administering textile print models and motifs: garment
//! templates with their base-textile colors and overlay elements, and
//! pattern designs with image-bearing variants associated to model/color
//! combinations.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod ids;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod storage;

use std::sync::Arc;

use axum::Router;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::db::DbPool;
use crate::handlers::AppServices;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub services: AppServices,
}

/// All `/api/v1` resource routers.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/modeles", handlers::modeles::modele_routes())
        .nest("/couleurs", handlers::modeles::couleur_routes())
        .nest("/elements", handlers::modeles::element_routes())
        .nest("/motifs", handlers::motifs::motif_routes())
        .nest("/variantes", handlers::motifs::variante_routes())
        .nest("/associations", handlers::motifs::association_routes())
}

/// Assemble the full application router: health, versioned API, Swagger UI
/// and the ambient HTTP layers.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
