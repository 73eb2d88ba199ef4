//! Kinship inverse inference.
//!
//! Given how a *familiar* relates to a *principal* persona, derive how the
//! principal relates back to the familiar. The rule for each code comes from
//! the [`RelationCatalog`]; this module only interprets it.

use serde::{Deserialize, Serialize};

use crate::{
  Catalog,
  gender::{self, Gender},
  relation::{InverseRule, Relation, RelationCatalog},
};

/// Which gender selects the form of a gendered inverse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InverseMode {
  /// The result names the principal's role, so the principal's gender picks
  /// its form. Used when a relation is recorded.
  #[default]
  PrincipalRole,
  /// The catalog rule read as written: [`infer_inverse_relation`].
  Literal,
}

impl InverseMode {
  pub fn infer(
    self,
    catalog: &Catalog,
    relation: Relation,
    familiar_gender: Option<Gender>,
    principal_gender: Option<Gender>,
  ) -> Relation {
    match self {
      Self::PrincipalRole => {
        infer_principal_role(catalog, relation, familiar_gender, principal_gender)
      }
      Self::Literal => {
        infer_inverse_relation(catalog, relation, familiar_gender, principal_gender)
      }
    }
  }
}

/// One directional kinship claim: "the familiar is `relation` of the
/// principal".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinshipAssertion {
  #[serde(rename = "parentesco")]
  pub relation:         Relation,
  #[serde(rename = "generoFamiliar", default)]
  pub familiar_gender:  Option<Gender>,
  #[serde(rename = "generoPrincipal", default)]
  pub principal_gender: Option<Gender>,
  #[serde(rename = "regla", default)]
  pub mode:             InverseMode,
}

impl KinshipAssertion {
  pub fn inverse(&self, catalog: &Catalog) -> Relation {
    self.mode.infer(
      catalog,
      self.relation,
      self.familiar_gender,
      self.principal_gender,
    )
  }
}

/// Inverse of `relation` given both genders.
///
/// Total over the domain: an unknown familiar gender yields the naive
/// inverse, and codes without a gender rule yield their naive inverse
/// (ultimately [`Relation::Otro`]).
pub fn infer_inverse_relation(
  catalog: &Catalog,
  relation: Relation,
  familiar_gender: Option<Gender>,
  principal_gender: Option<Gender>,
) -> Relation {
  infer_with(
    &catalog.relations,
    relation,
    familiar_gender,
    principal_gender,
  )
}

fn infer_with(
  relations: &RelationCatalog,
  relation: Relation,
  familiar_gender: Option<Gender>,
  principal_gender: Option<Gender>,
) -> Relation {
  if !gender::is_known(familiar_gender) {
    return relations.naive_inverse(relation);
  }

  let Some(entry) = relations.get(relation) else {
    return Relation::Otro;
  };

  match entry.rule {
    InverseRule::ByFamiliarGender {
      masculine,
      feminine,
    } => pick(familiar_gender, masculine, feminine),
    InverseRule::ByPrincipalGender {
      masculine,
      feminine,
    } => pick(principal_gender, masculine, feminine),
    InverseRule::Symmetric => relation,
    InverseRule::Naive => entry.naive_inverse,
  }
}

fn pick(gender: Option<Gender>, masculine: Relation, feminine: Relation) -> Relation {
  if gender::is_feminine(gender) {
    feminine
  } else {
    masculine
  }
}

/// Inverse for a relation recorded from the familiar's side ("the familiar
/// is `relation` of the principal"). An unknown familiar gender yields the
/// naive inverse whatever the principal's gender; otherwise the result names
/// the principal's role, so the principal's gender selects its form in every
/// bucket.
pub fn infer_principal_role(
  catalog: &Catalog,
  relation: Relation,
  familiar_gender: Option<Gender>,
  principal_gender: Option<Gender>,
) -> Relation {
  if !gender::is_known(familiar_gender) {
    return catalog.relations.naive_inverse(relation);
  }
  infer_with(&catalog.relations, relation, principal_gender, principal_gender)
}

/// Like [`InverseMode::infer`] but for a raw code from a form field.
/// Unrecognised codes degrade to [`Relation::Otro`] without an error.
pub fn infer_from_code(
  catalog: &Catalog,
  mode: InverseMode,
  raw: &str,
  familiar_gender: Option<Gender>,
  principal_gender: Option<Gender>,
) -> Relation {
  let relation = Relation::parse_lenient(raw).unwrap_or_else(|| {
    tracing::debug!(code = raw, "unrecognised relation code, using otro");
    Relation::Otro
  });
  mode.infer(catalog, relation, familiar_gender, principal_gender)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::relation::{Relation::*, RelationEntry, all_relations};
  use super::InverseMode::*;

  const GENDERS: [Option<Gender>; 5] = [
    None,
    Some(Gender::Masculino),
    Some(Gender::Femenino),
    Some(Gender::Otro),
    Some(Gender::NoEspecifica),
  ];

  fn infer(r: Relation, f: Option<Gender>, p: Option<Gender>) -> Relation {
    infer_inverse_relation(&Catalog::default(), r, f, p)
  }

  #[test]
  fn symmetric_relations_invert_to_themselves() {
    for r in [Esposo, Esposa, Hermano, Hermana, Primo, Prima] {
      for f in GENDERS {
        for p in GENDERS {
          assert_eq!(infer(r, f, p), r, "{r} with {f:?}/{p:?}");
        }
      }
    }
  }

  #[test]
  fn parent_inverse_follows_familiar_gender() {
    for p in GENDERS {
      assert_eq!(infer(Madre, Some(Gender::Masculino), p), Hijo);
      assert_eq!(infer(Madre, Some(Gender::Femenino), p), Hija);
      assert_eq!(infer(Padre, Some(Gender::Femenino), p), Hija);
    }
    assert_eq!(infer(Abuela, Some(Gender::Femenino), None), Nieta);
    assert_eq!(infer(Tio, Some(Gender::Masculino), None), Sobrino);
    assert_eq!(infer(Tia, Some(Gender::Femenino), None), Sobrina);
  }

  #[test]
  fn child_inverse_follows_principal_gender() {
    let f = Some(Gender::Masculino);
    assert_eq!(infer(Hijo, f, Some(Gender::Femenino)), Madre);
    assert_eq!(infer(Hijo, f, Some(Gender::Masculino)), Padre);
    assert_eq!(infer(Hija, f, Some(Gender::Femenino)), Madre);
    assert_eq!(infer(Nieta, f, Some(Gender::Femenino)), Abuela);
    assert_eq!(infer(Sobrino, f, Some(Gender::Masculino)), Tio);
    assert_eq!(infer(Sobrina, f, Some(Gender::Femenino)), Tia);
  }

  #[test]
  fn non_feminine_gender_selects_masculine_form() {
    assert_eq!(infer(Madre, Some(Gender::Otro), None), Hijo);
    assert_eq!(infer(Hijo, Some(Gender::Femenino), None), Padre);
    assert_eq!(infer(Nieto, Some(Gender::Femenino), Some(Gender::Otro)), Abuelo);
    assert_eq!(
      infer(Sobrina, Some(Gender::Masculino), Some(Gender::NoEspecifica)),
      Tio
    );
  }

  #[test]
  fn unknown_familiar_gender_uses_naive_table() {
    assert_eq!(infer(Padre, None, None), Hijo);
    assert_eq!(infer(Madre, Some(Gender::NoEspecifica), None), Hijo);
    // The principal's gender is not consulted on this path.
    assert_eq!(infer(Hijo, None, Some(Gender::Femenino)), Padre);
    assert_eq!(infer(Abuela, None, Some(Gender::Femenino)), Nieto);
  }

  #[test]
  fn otro_and_unrecognised_codes_degrade_to_otro() {
    let catalog = Catalog::default();
    for f in GENDERS {
      assert_eq!(infer(Otro, f, None), Otro);
      assert_eq!(infer_from_code(&catalog, Literal, "cuñado", f, None), Otro);
    }
    assert_eq!(
      infer_from_code(&catalog, Literal, " MADRE ", Some(Gender::Femenino), None),
      Hija
    );
  }

  #[test]
  fn inference_is_total_over_the_domain() {
    let catalog = Catalog::default();
    for r in all_relations() {
      for f in GENDERS {
        for p in GENDERS {
          let inverse = infer_inverse_relation(&catalog, r, f, p);
          assert!(catalog.relations.get(inverse).is_some());
        }
      }
    }
  }

  #[test]
  fn catalog_rules_drive_the_result() {
    let mut catalog = Catalog::default();
    catalog.relations = vec![RelationEntry {
      code:          Otro,
      label:         "Padrino".into(),
      naive_inverse: Otro,
      rule:          InverseRule::ByFamiliarGender {
        masculine: Hijo,
        feminine:  Hija,
      },
    }]
    .into();

    assert_eq!(
      infer_inverse_relation(&catalog, Otro, Some(Gender::Femenino), None),
      Hija
    );
    // Codes absent from a custom catalog fall back to otro.
    assert_eq!(
      infer_inverse_relation(&catalog, Madre, Some(Gender::Femenino), None),
      Otro
    );
  }

  #[test]
  fn principal_role_follows_principal_gender_in_both_buckets() {
    let catalog = Catalog::default();
    let fem = Some(Gender::Femenino);
    let masc = Some(Gender::Masculino);
    let role = |r, f, p| infer_principal_role(&catalog, r, f, p);

    // "the familiar is madre of the principal": principal is hijo/hija.
    assert_eq!(role(Madre, fem, masc), Hijo);
    assert_eq!(role(Madre, fem, fem), Hija);
    // "the familiar is hijo of the principal": principal is padre/madre.
    assert_eq!(role(Hijo, masc, fem), Madre);
    assert_eq!(role(Nieta, fem, masc), Abuelo);
    assert_eq!(role(Padre, masc, None), Hijo);
    assert_eq!(role(Prima, fem, fem), Prima);
  }

  #[test]
  fn principal_role_falls_back_to_naive_without_familiar_gender() {
    let catalog = Catalog::default();
    for p in GENDERS {
      assert_eq!(infer_principal_role(&catalog, Madre, None, p), Hijo);
      assert_eq!(
        infer_principal_role(&catalog, Tia, Some(Gender::NoEspecifica), p),
        Sobrino
      );
    }
  }

  #[test]
  fn modes_differ_only_in_which_gender_selects() {
    let catalog = Catalog::default();
    let fem = Some(Gender::Femenino);
    let masc = Some(Gender::Masculino);

    assert_eq!(Literal.infer(&catalog, Madre, fem, masc), Hija);
    assert_eq!(PrincipalRole.infer(&catalog, Madre, fem, masc), Hijo);
    assert_eq!(
      infer_from_code(&catalog, InverseMode::default(), "madre", fem, masc),
      Hijo
    );
    assert_eq!(Literal.infer(&catalog, Hermano, fem, None), Hermano);
    assert_eq!(PrincipalRole.infer(&catalog, Hermano, fem, None), Hermano);
  }
}
