//! The family-relation dialog as a value: pick a principal, a familiar and a
//! relation, get the inverse suggested, build the create request.

use serde::{Deserialize, Serialize};

use crate::{
  Catalog, Error, Result,
  gender::Gender,
  inference::infer_principal_role,
  relation::Relation,
};

/// A persona as far as the relation dialog cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaRef {
  pub id:     u64,
  pub gender: Option<Gender>,
}

/// Body of `POST /familiares/relaciones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearRelacionRequest {
  pub persona_id:         u64,
  pub familiar_id:        u64,
  pub parentesco:         Relation,
  pub parentesco_inverso: Relation,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub descripcion:        Option<String>,
}

/// In-progress relation between a principal and a familiar. The relation
/// reads "the familiar is `relation` of the principal".
///
/// Every change to the relation, the principal or the familiar recomputes
/// the suggested inverse from scratch. An inverse typed in by the user wins
/// over the suggestion until cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationDraft {
  principal:        Option<PersonaRef>,
  familiar:         Option<PersonaRef>,
  relation:         Option<Relation>,
  suggested:        Option<Relation>,
  inverse_override: Option<Relation>,
  description:      Option<String>,
}

impl RelationDraft {
  pub fn new() -> Self { Self::default() }

  pub fn set_relation(&mut self, relation: Relation, catalog: &Catalog) {
    self.relation = Some(relation);
    self.recompute(catalog);
  }

  pub fn set_principal(&mut self, principal: Option<PersonaRef>, catalog: &Catalog) {
    self.principal = principal;
    self.recompute(catalog);
  }

  pub fn set_familiar(&mut self, familiar: Option<PersonaRef>, catalog: &Catalog) {
    self.familiar = familiar;
    self.recompute(catalog);
  }

  /// Set (or with `None`, clear) a user-chosen inverse.
  pub fn override_inverse(&mut self, inverse: Option<Relation>) {
    self.inverse_override = inverse;
  }

  pub fn set_description(&mut self, description: Option<String>) {
    self.description = description.filter(|d| !d.trim().is_empty());
  }

  /// The inverse the form displays: the override if any, else the
  /// suggestion.
  pub fn inverse(&self) -> Option<Relation> {
    self.inverse_override.or(self.suggested)
  }

  pub fn suggested_inverse(&self) -> Option<Relation> { self.suggested }

  fn recompute(&mut self, catalog: &Catalog) {
    self.suggested = self.relation.map(|relation| {
      let familiar_gender = self.familiar.and_then(|f| f.gender);
      let principal_gender = self.principal.and_then(|p| p.gender);
      infer_principal_role(catalog, relation, familiar_gender, principal_gender)
    });
  }

  /// Assemble the create request.
  pub fn build(&self) -> Result<CrearRelacionRequest> {
    let principal = self.principal.ok_or(Error::MissingPersona("principal"))?;
    let familiar = self.familiar.ok_or(Error::MissingPersona("familiar"))?;
    if principal.id == familiar.id {
      return Err(Error::SelfRelation(principal.id));
    }
    let parentesco = self.relation.ok_or(Error::MissingRelation)?;
    let parentesco_inverso = self.inverse().unwrap_or(Relation::Otro);

    Ok(CrearRelacionRequest {
      persona_id: principal.id,
      familiar_id: familiar.id,
      parentesco,
      parentesco_inverso,
      descripcion: self.description.clone(),
    })
  }
}
