//! The set of type codes selected for one persona, with the interactive
//! exclusion rule applied on every add.
//!
//! Two front-end paths disagree on what to do when an exclusive partner is
//! already present: the multi-select auto-resolves (last added wins) and the
//! assign-type modal rejects. Both are kept as [`ExclusionPolicy`] variants;
//! the submit-time check in [`crate::validation`] re-verifies either way.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Catalog, Error, Result, person_type::PersonTypeCode};

/// What to do when adding a code whose exclusive partner is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionPolicy {
  /// Remove the conflicting codes and add the new one.
  #[default]
  AutoResolve,
  /// Refuse the add and leave the set unchanged.
  Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeSet {
  codes: BTreeSet<PersonTypeCode>,
}

impl TypeSet {
  pub fn new() -> Self { Self::default() }

  pub fn contains(&self, code: &PersonTypeCode) -> bool {
    self.codes.contains(code)
  }

  pub fn codes(&self) -> &BTreeSet<PersonTypeCode> { &self.codes }

  pub fn len(&self) -> usize { self.codes.len() }

  pub fn is_empty(&self) -> bool { self.codes.is_empty() }

  /// Codes currently present that may not coexist with `code`.
  pub fn conflicts(
    &self,
    code: &PersonTypeCode,
    catalog: &Catalog,
  ) -> Vec<PersonTypeCode> {
    catalog
      .exclusive_partners(code)
      .filter(|partner| self.codes.contains(*partner))
      .cloned()
      .collect()
  }

  /// Add `code` under `policy`.
  ///
  /// Returns the codes removed to make room (empty unless auto-resolving a
  /// conflict). Adding a code already present is a no-op.
  pub fn add(
    &mut self,
    code: PersonTypeCode,
    policy: ExclusionPolicy,
    catalog: &Catalog,
  ) -> Result<Vec<PersonTypeCode>> {
    if self.codes.contains(&code) {
      return Ok(Vec::new());
    }

    let conflicts = self.conflicts(&code, catalog);
    if let Some(existing) = conflicts.first() {
      match policy {
        ExclusionPolicy::Reject => {
          return Err(Error::ExclusionViolation {
            added:    code,
            existing: existing.clone(),
          });
        }
        ExclusionPolicy::AutoResolve => {
          for removed in &conflicts {
            self.codes.remove(removed);
          }
          tracing::debug!(
            added = %code,
            removed = ?conflicts,
            "resolved exclusive type conflict"
          );
        }
      }
    }

    self.codes.insert(code);
    Ok(conflicts)
  }

  /// Remove `code`; returns whether it was present.
  pub fn remove(&mut self, code: &PersonTypeCode) -> bool {
    self.codes.remove(code)
  }
}

impl FromIterator<PersonTypeCode> for TypeSet {
  fn from_iter<I: IntoIterator<Item = PersonTypeCode>>(iter: I) -> Self {
    Self {
      codes: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validation::check_mutual_exclusion;

  fn set(codes: &[PersonTypeCode]) -> TypeSet { codes.iter().cloned().collect() }

  #[test]
  fn adding_no_socio_replaces_socio() {
    let catalog = Catalog::default();
    let mut types = set(&[PersonTypeCode::Socio]);

    let removed = types
      .add(PersonTypeCode::NoSocio, ExclusionPolicy::AutoResolve, &catalog)
      .unwrap();

    assert_eq!(removed, vec![PersonTypeCode::Socio]);
    assert_eq!(types, set(&[PersonTypeCode::NoSocio]));
  }

  #[test]
  fn adding_socio_replaces_no_socio() {
    let catalog = Catalog::default();
    let mut types = set(&[PersonTypeCode::NoSocio, PersonTypeCode::Docente]);

    types
      .add(PersonTypeCode::Socio, ExclusionPolicy::AutoResolve, &catalog)
      .unwrap();

    assert_eq!(types, set(&[PersonTypeCode::Socio, PersonTypeCode::Docente]));
    assert!(check_mutual_exclusion(types.codes(), &catalog).is_valid());
  }

  #[test]
  fn reject_policy_leaves_the_set_unchanged() {
    let catalog = Catalog::default();
    let mut types = set(&[PersonTypeCode::Socio]);

    let err = types
      .add(PersonTypeCode::NoSocio, ExclusionPolicy::Reject, &catalog)
      .unwrap_err();

    assert!(matches!(
      err,
      Error::ExclusionViolation { ref added, ref existing }
        if *added == PersonTypeCode::NoSocio && *existing == PersonTypeCode::Socio
    ));
    assert_eq!(types, set(&[PersonTypeCode::Socio]));
  }

  #[test]
  fn non_exclusive_codes_accumulate() {
    let catalog = Catalog::default();
    let mut types = TypeSet::new();
    for code in [
      PersonTypeCode::Socio,
      PersonTypeCode::Docente,
      PersonTypeCode::Proveedor,
    ] {
      let removed = types.add(code, ExclusionPolicy::Reject, &catalog).unwrap();
      assert!(removed.is_empty());
    }
    assert_eq!(types.len(), 3);
  }

  #[test]
  fn re_adding_is_a_no_op_and_remove_reports_presence() {
    let catalog = Catalog::default();
    let mut types = set(&[PersonTypeCode::Socio]);
    let removed = types
      .add(PersonTypeCode::Socio, ExclusionPolicy::Reject, &catalog)
      .unwrap();
    assert!(removed.is_empty());

    assert!(types.remove(&PersonTypeCode::Socio));
    assert!(!types.remove(&PersonTypeCode::Socio));
    assert!(types.is_empty());
  }
}
