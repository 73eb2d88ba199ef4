//! Handlers for `/tipos` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/tipos/validar` | Body: `[PersonaTipoDto]`; 422 with the report when invalid, bad cells included |
//! | `POST` | `/tipos/resolver` | Body: [`ResolveBody`]; 409 when the policy rejects |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use padron_core::{
  Catalog,
  person_type::PersonTypeCode,
  type_set::{ExclusionPolicy, TypeSet},
  validation::{ValidationReport, validate_payload},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

// ─── Validate ─────────────────────────────────────────────────────────────────

/// `POST /tipos/validar`: rows are read cell by cell, so a malformed value
/// is reported at its path instead of rejecting the body.
pub async fn validate(
  State(catalog): State<Arc<Catalog>>,
  Json(rows): Json<Vec<Value>>,
) -> (StatusCode, Json<ValidationReport>) {
  let report = validate_payload(&rows, &catalog);
  let status = if report.valid {
    StatusCode::OK
  } else {
    tracing::debug!(errors = report.errors.len(), "type payload rejected");
    StatusCode::UNPROCESSABLE_ENTITY
  };
  (status, Json(report))
}

// ─── Resolve ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
  /// Codes currently selected.
  #[serde(default)]
  pub asignados: Vec<PersonTypeCode>,
  /// Code being added.
  pub agregar:   PersonTypeCode,
  #[serde(default)]
  pub politica:  ExclusionPolicy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
  pub tipos:     TypeSet,
  pub removidos: Vec<PersonTypeCode>,
}

/// `POST /tipos/resolver`
pub async fn resolve(
  State(catalog): State<Arc<Catalog>>,
  Json(body): Json<ResolveBody>,
) -> Result<Json<ResolveResponse>, ApiError> {
  let mut tipos: TypeSet = body.asignados.into_iter().collect();
  let removidos = tipos.add(body.agregar, body.politica, &catalog)?;
  Ok(Json(ResolveResponse { tipos, removidos }))
}
