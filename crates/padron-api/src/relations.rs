//! Handlers for kinship endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/parentescos/inversa` | Body: [`InverseBody`]; unknown codes degrade to `otro`; same rule as `/relaciones` unless `regla` is `literal` |
//! | `POST` | `/relaciones` | Body: [`RelationBody`]; returns the create request |

use std::sync::Arc;

use axum::{Json, extract::State};
use padron_core::{
  Catalog,
  gender::Gender,
  inference::{InverseMode, KinshipAssertion},
  relation::Relation,
  relation_draft::{CrearRelacionRequest, PersonaRef, RelationDraft},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Inverse ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InverseBody {
  /// Raw relation code as typed in the form.
  pub parentesco:       String,
  #[serde(default)]
  pub genero_familiar:  Option<Gender>,
  #[serde(default)]
  pub genero_principal: Option<Gender>,
  #[serde(default)]
  pub regla:            InverseMode,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InverseResponse {
  pub parentesco:         Relation,
  pub parentesco_inverso: Relation,
  /// Display label of the inverse.
  pub etiqueta:           String,
}

/// `POST /parentescos/inversa`
pub async fn inverse(
  State(catalog): State<Arc<Catalog>>,
  Json(body): Json<InverseBody>,
) -> Json<InverseResponse> {
  let relation = Relation::parse_lenient(&body.parentesco).unwrap_or_else(|| {
    tracing::debug!(code = %body.parentesco, "unrecognised relation code");
    Relation::Otro
  });
  let assertion = KinshipAssertion {
    relation,
    familiar_gender: body.genero_familiar,
    principal_gender: body.genero_principal,
    mode: body.regla,
  };
  let inverse = assertion.inverse(&catalog);

  Json(InverseResponse {
    parentesco:         relation,
    parentesco_inverso: inverse,
    etiqueta:           catalog.relations.label(inverse),
  })
}

// ─── Create relation ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationBody {
  pub persona_id:         u64,
  #[serde(default)]
  pub genero_persona:     Option<Gender>,
  pub familiar_id:        u64,
  #[serde(default)]
  pub genero_familiar:    Option<Gender>,
  pub parentesco:         Relation,
  /// Inverse chosen by the user; replaces the suggested one.
  #[serde(default)]
  pub parentesco_inverso: Option<Relation>,
  #[serde(default)]
  pub descripcion:        Option<String>,
}

/// `POST /relaciones`: fills in the inverse and returns the request the
/// backend expects.
pub async fn create(
  State(catalog): State<Arc<Catalog>>,
  Json(body): Json<RelationBody>,
) -> Result<Json<CrearRelacionRequest>, ApiError> {
  let mut draft = RelationDraft::new();
  draft.set_principal(
    Some(PersonaRef {
      id:     body.persona_id,
      gender: body.genero_persona,
    }),
    &catalog,
  );
  draft.set_familiar(
    Some(PersonaRef {
      id:     body.familiar_id,
      gender: body.genero_familiar,
    }),
    &catalog,
  );
  draft.set_relation(body.parentesco, &catalog);
  draft.override_inverse(body.parentesco_inverso);
  draft.set_description(body.descripcion);

  let request = draft.build()?;
  tracing::info!(
    persona_id = request.persona_id,
    familiar_id = request.familiar_id,
    parentesco = %request.parentesco,
    parentesco_inverso = %request.parentesco_inverso,
    "prepared relation"
  );
  Ok(Json(request))
}
