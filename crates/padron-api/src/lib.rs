//! JSON REST API for Padrón.
//!
//! Exposes an axum [`Router`] over an immutable [`Catalog`]. Persistence of
//! personas and relations belongs to the backend; these endpoints only run
//! the rules. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", padron_api::api_router(catalog.clone()))
//! ```

pub mod catalog;
pub mod error;
pub mod relations;
pub mod types;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use padron_core::Catalog;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router(catalog: Arc<Catalog>) -> Router<()> {
  Router::new()
    // Catalogs
    .route("/catalogo/parentescos", get(catalog::relations))
    .route("/catalogo/tipos", get(catalog::types))
    // Kinship
    .route("/parentescos/inversa", post(relations::inverse))
    .route("/relaciones", post(relations::create))
    // Person types
    .route("/tipos/validar", post(types::validate))
    .route("/tipos/resolver", post(types::resolve))
    .layer(TraceLayer::new_for_http())
    .with_state(catalog)
}
