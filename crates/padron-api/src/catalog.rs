//! Handlers for `/catalogo` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalogo/parentescos` | Relation entries with their inverse rules |
//! | `GET`  | `/catalogo/tipos` | Type definitions, exclusive pairs and reference lists |

use std::sync::Arc;

use axum::{Json, extract::State};
use padron_core::{
  Catalog,
  catalog::ReferenceEntry,
  person_type::{PersonTypeCode, PersonTypeDefinition},
  relation::RelationEntry,
};
use serde::Serialize;

/// `GET /catalogo/parentescos`
pub async fn relations(
  State(catalog): State<Arc<Catalog>>,
) -> Json<Vec<RelationEntry>> {
  Json(catalog.relations.entries().cloned().collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCatalog {
  pub tipos:            Vec<PersonTypeDefinition>,
  pub exclusiones:      Vec<(PersonTypeCode, PersonTypeCode)>,
  pub categorias:       Vec<ReferenceEntry>,
  pub especialidades:   Vec<ReferenceEntry>,
  pub razones_sociales: Vec<ReferenceEntry>,
}

/// `GET /catalogo/tipos`
pub async fn types(State(catalog): State<Arc<Catalog>>) -> Json<TypeCatalog> {
  Json(TypeCatalog {
    tipos:            catalog.types.clone(),
    exclusiones:      catalog.exclusive_pairs.clone(),
    categorias:       catalog.categorias.clone(),
    especialidades:   catalog.especialidades.clone(),
    razones_sociales: catalog.razones_sociales.clone(),
  })
}
