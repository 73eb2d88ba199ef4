//! Persona-type validation.
//!
//! Three checks, all pure and synchronous:
//!
//! - [`check_mutual_exclusion`]: no exclusive pair (SOCIO/NO_SOCIO) may be
//!   fully present;
//! - [`check_required_fields`]: each assignment carries what its type
//!   definition requires;
//! - [`validate_person_types`]: the batch check run at submit time; it never
//!   stops at the first failure.
//!
//! Failures are values ([`Violation`]); the caller decides whether to block.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
  Catalog,
  catalog::ReferenceKind,
  dto::decode_row,
  person_type::{
    PersonTypeCode, PersonTypeDefinition, TypeAssignment, is_valid_cuit,
  },
};

/// Path of form-level errors.
pub const TYPES_PATH: &str = "tipos";

// ─── Violations ──────────────────────────────────────────────────────────────

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
  #[error("{first} and {second} cannot be assigned together")]
  ExclusionViolation {
    first:  PersonTypeCode,
    second: PersonTypeCode,
  },

  #[error("{field} is required for {code}")]
  MissingField {
    /// Position in the submitted list, when validating a batch.
    index: Option<usize>,
    code:  PersonTypeCode,
    field: &'static str,
  },

  #[error("a persona needs at least one type")]
  EmptyTypeSet,

  #[error("{field} {id} is not in the catalog")]
  UnknownReference {
    index: Option<usize>,
    field: &'static str,
    id:    u64,
  },

  #[error("{}", unknown_type_message(.code))]
  UnknownType {
    index: Option<usize>,
    /// The code as submitted; empty when none was given.
    code:  String,
  },

  #[error("{field}: {message}")]
  InvalidValue {
    index:   Option<usize>,
    field:   &'static str,
    message: String,
  },
}

fn unknown_type_message(code: &str) -> String {
  if code.is_empty() {
    "a person type code is required".to_string()
  } else {
    format!("{code} is not a known person type")
  }
}

/// Field carrying the type code in the wire shape.
const CODE_FIELD: &str = "tipoPersonaCodigo";

impl Violation {
  /// Where the error belongs in the form: `tipos` for form-level errors,
  /// `tipos[<i>].<field>` (or the bare field) for field-level ones.
  pub fn path(&self) -> String {
    match self {
      Self::ExclusionViolation { .. } | Self::EmptyTypeSet => {
        TYPES_PATH.to_string()
      }
      Self::MissingField { .. }
      | Self::UnknownReference { .. }
      | Self::UnknownType { .. }
      | Self::InvalidValue { .. } => {
        let field = self.field().unwrap_or(CODE_FIELD);
        match self.index() {
          Some(i) => format!("{TYPES_PATH}[{i}].{field}"),
          None => field.to_string(),
        }
      }
    }
  }

  /// Position of the offending assignment, for field-level violations
  /// raised by a batch check.
  pub fn index(&self) -> Option<usize> {
    match self {
      Self::MissingField { index, .. }
      | Self::UnknownReference { index, .. }
      | Self::UnknownType { index, .. }
      | Self::InvalidValue { index, .. } => *index,
      Self::ExclusionViolation { .. } | Self::EmptyTypeSet => None,
    }
  }

  /// Stable machine-readable discriminant.
  pub fn code(&self) -> &'static str {
    match self {
      Self::ExclusionViolation { .. } => "exclusion_violation",
      Self::MissingField { .. } => "missing_field",
      Self::EmptyTypeSet => "empty_type_set",
      Self::UnknownReference { .. } => "unknown_reference",
      Self::UnknownType { .. } => "unknown_type",
      Self::InvalidValue { .. } => "invalid_value",
    }
  }

  /// The field a field-level violation points at.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::MissingField { field, .. }
      | Self::UnknownReference { field, .. }
      | Self::InvalidValue { field, .. } => Some(*field),
      Self::UnknownType { .. } => Some(CODE_FIELD),
      Self::ExclusionViolation { .. } | Self::EmptyTypeSet => None,
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// The aggregated outcome of one or more checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
  pub violations: Vec<Violation>,
}

impl ValidationResult {
  pub fn is_valid(&self) -> bool { self.violations.is_empty() }

  pub fn push(&mut self, violation: Violation) { self.violations.push(violation); }

  pub fn merge(&mut self, other: ValidationResult) {
    self.violations.extend(other.violations);
  }

  pub fn report(&self) -> ValidationReport { ValidationReport::from(self) }
}

/// One error as rendered next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub path:    String,
  pub message: String,
  pub code:    String,
}

/// `{ valid, errors }` as returned to the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
  pub valid:  bool,
  pub errors: Vec<FieldError>,
}

impl From<&ValidationResult> for ValidationReport {
  fn from(result: &ValidationResult) -> Self {
    Self {
      valid:  result.is_valid(),
      errors: result
        .violations
        .iter()
        .map(|v| FieldError {
          path:    v.path(),
          message: v.to_string(),
          code:    v.code().to_string(),
        })
        .collect(),
    }
  }
}

// ─── Checks ──────────────────────────────────────────────────────────────────

/// Fail once for every exclusive pair whose two codes are both present.
pub fn check_mutual_exclusion(
  codes: &BTreeSet<PersonTypeCode>,
  catalog: &Catalog,
) -> ValidationResult {
  let mut result = ValidationResult::default();
  for (first, second) in &catalog.exclusive_pairs {
    if codes.contains(first) && codes.contains(second) {
      result.push(Violation::ExclusionViolation {
        first:  first.clone(),
        second: second.clone(),
      });
    }
  }
  result
}

/// Check the fields `definition` requires on a single assignment.
///
/// Only the flags that apply to the assignment's shape are consulted: a
/// SOCIO carries a categoría, a DOCENTE an especialidad and honorarios, a
/// PROVEEDOR a CUIT and razón social. Extension types carry every field, so
/// every flag applies.
pub fn check_required_fields(
  assignment: &TypeAssignment,
  definition: &PersonTypeDefinition,
  catalog: &Catalog,
) -> ValidationResult {
  let mut checker = FieldChecker {
    index: None,
    code: assignment.code(),
    catalog,
    result: ValidationResult::default(),
  };
  checker.check(assignment, definition);
  checker.result
}

/// Batch validation run before submission.
///
/// An empty list fails with [`Violation::EmptyTypeSet`]. Otherwise the
/// exclusion check runs first, then every assignment is checked: a blank
/// code or one the catalog does not define is reported, and known codes go
/// through the required-field check. All failures are collected.
pub fn validate_person_types(
  assignments: &[TypeAssignment],
  catalog: &Catalog,
) -> ValidationResult {
  let mut result = ValidationResult::default();
  if assignments.is_empty() {
    result.push(Violation::EmptyTypeSet);
    return result;
  }

  let codes: BTreeSet<_> = assignments.iter().map(TypeAssignment::code).collect();
  result.merge(check_mutual_exclusion(&codes, catalog));

  for (index, assignment) in assignments.iter().enumerate() {
    let code = assignment.code();
    if !catalog.is_known_type(&code) {
      result.push(Violation::UnknownType {
        index: Some(index),
        code:  code.to_string(),
      });
      continue;
    }
    let definition = catalog.definition(&code);
    let mut checker = FieldChecker {
      index: Some(index),
      code,
      catalog,
      result: ValidationResult::default(),
    };
    checker.check(assignment, &definition);
    result.merge(checker.result);
  }

  if !result.is_valid() {
    tracing::debug!(
      violations = result.violations.len(),
      "persona type validation failed"
    );
  }
  result
}

/// Validate a raw form payload, one JSON value per row.
///
/// Cells that cannot be read are reported as [`Violation::InvalidValue`] at
/// their own path, in place of the missing-field error the emptied cell
/// would otherwise raise, and every row is still validated.
pub fn validate_payload(rows: &[Value], catalog: &Catalog) -> ValidationReport {
  let mut invalid = Vec::new();
  let assignments: Vec<TypeAssignment> = rows
    .iter()
    .enumerate()
    .map(|(index, row)| {
      let (dto, cells) = decode_row(row);
      invalid.extend(cells.into_iter().map(|cell| Violation::InvalidValue {
        index:   Some(index),
        field:   cell.field,
        message: cell.message,
      }));
      TypeAssignment::from(dto)
    })
    .collect();

  let checked = validate_person_types(&assignments, catalog);
  let mut violations: Vec<Violation> = checked
    .violations
    .into_iter()
    .filter(|v| {
      !matches!(v, Violation::MissingField { .. })
        || !invalid
          .iter()
          .any(|i| i.index() == v.index() && i.field() == v.field())
    })
    .collect();
  violations.extend(invalid);
  violations.sort_by_key(Violation::index);

  ValidationResult { violations }.report()
}

// ─── Field checks ────────────────────────────────────────────────────────────

struct FieldChecker<'a> {
  index:   Option<usize>,
  code:    PersonTypeCode,
  catalog: &'a Catalog,
  result:  ValidationResult,
}

impl FieldChecker<'_> {
  fn check(&mut self, assignment: &TypeAssignment, def: &PersonTypeDefinition) {
    match assignment {
      TypeAssignment::Socio(f) => {
        if def.requires_categoria {
          self.reference(f.categoria_id, ReferenceKind::Categoria);
        }
      }
      TypeAssignment::NoSocio => {}
      TypeAssignment::Docente(f) => {
        if def.requires_especialidad {
          self.reference(f.especialidad_id, ReferenceKind::Especialidad);
          self.positive_amount(f.honorarios_por_hora, "honorariosPorHora");
        }
      }
      TypeAssignment::Proveedor(f) => {
        if def.requires_cuit {
          self.cuit(f.cuit.as_deref());
          self.reference(f.razon_social_id, ReferenceKind::RazonSocial);
        }
      }
      TypeAssignment::Extension { fields, .. } => {
        if def.requires_categoria {
          self.reference(fields.categoria_id, ReferenceKind::Categoria);
        }
        if def.requires_especialidad {
          self.reference(fields.especialidad_id, ReferenceKind::Especialidad);
          self.positive_amount(fields.honorarios_por_hora, "honorariosPorHora");
        }
        if def.requires_cuit {
          self.cuit(fields.cuit.as_deref());
          self.reference(fields.razon_social_id, ReferenceKind::RazonSocial);
        }
      }
    }
  }

  fn missing(&mut self, field: &'static str) {
    self.result.push(Violation::MissingField {
      index: self.index,
      code: self.code.clone(),
      field,
    });
  }

  fn reference(&mut self, id: Option<u64>, kind: ReferenceKind) {
    match id {
      None | Some(0) => self.missing(kind.field()),
      Some(id) if !self.catalog.is_known_reference(kind, id) => {
        self.result.push(Violation::UnknownReference {
          index: self.index,
          field: kind.field(),
          id,
        });
      }
      Some(_) => {}
    }
  }

  fn positive_amount(&mut self, amount: Option<f64>, field: &'static str) {
    // NaN fails the comparison as well.
    if !amount.is_some_and(|a| a > 0.0) {
      self.missing(field);
    }
  }

  fn cuit(&mut self, cuit: Option<&str>) {
    if !cuit.is_some_and(is_valid_cuit) {
      self.missing("cuit");
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{
    catalog::ReferenceEntry,
    person_type::{DocenteFields, ExtensionFields, ProveedorFields, SocioFields},
  };

  fn catalog() -> Catalog { Catalog::default() }

  fn fields(result: &ValidationResult) -> Vec<&'static str> {
    result.violations.iter().filter_map(Violation::field).collect()
  }

  fn socio(categoria_id: Option<u64>) -> TypeAssignment {
    TypeAssignment::Socio(SocioFields { categoria_id })
  }

  fn proveedor(cuit: &str) -> TypeAssignment {
    TypeAssignment::Proveedor(ProveedorFields {
      cuit:            Some(cuit.into()),
      razon_social_id: Some(2),
    })
  }

  // ── Exclusion ─────────────────────────────────────────────────────────────

  #[test]
  fn socio_and_no_socio_together_fail() {
    let codes = BTreeSet::from([PersonTypeCode::Socio, PersonTypeCode::NoSocio]);
    let result = check_mutual_exclusion(&codes, &catalog());
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].code(), "exclusion_violation");
    assert_eq!(result.violations[0].path(), "tipos");
  }

  #[test]
  fn other_combinations_coexist() {
    let codes = BTreeSet::from([
      PersonTypeCode::Socio,
      PersonTypeCode::Docente,
      PersonTypeCode::Proveedor,
      PersonTypeCode::from("COLABORADOR"),
    ]);
    assert!(check_mutual_exclusion(&codes, &catalog()).is_valid());
  }

  // ── Required fields ───────────────────────────────────────────────────────

  #[test]
  fn socio_requires_categoria() {
    let def = PersonTypeDefinition::builtin(&PersonTypeCode::Socio);
    for missing in [None, Some(0)] {
      let result = check_required_fields(&socio(missing), &def, &catalog());
      assert_eq!(fields(&result), vec!["categoriaId"]);
      assert_eq!(result.violations[0].path(), "categoriaId");
    }
    assert!(check_required_fields(&socio(Some(5)), &def, &catalog()).is_valid());
  }

  #[test]
  fn docente_requires_especialidad_and_positive_honorarios() {
    let def = PersonTypeDefinition::builtin(&PersonTypeCode::Docente);
    let bad = TypeAssignment::Docente(DocenteFields {
      especialidad_id:     Some(0),
      honorarios_por_hora: Some(-10.0),
    });
    let result = check_required_fields(&bad, &def, &catalog());
    assert_eq!(fields(&result), vec!["especialidadId", "honorariosPorHora"]);

    let nan = TypeAssignment::Docente(DocenteFields {
      especialidad_id:     Some(1),
      honorarios_por_hora: Some(f64::NAN),
    });
    let result = check_required_fields(&nan, &def, &catalog());
    assert_eq!(fields(&result), vec!["honorariosPorHora"]);
  }

  #[test]
  fn proveedor_cuit_is_checked_after_stripping_formatting() {
    let def = PersonTypeDefinition::builtin(&PersonTypeCode::Proveedor);
    let dashed = check_required_fields(&proveedor("20-12345678-9"), &def, &catalog());
    let plain = check_required_fields(&proveedor("20123456789"), &def, &catalog());
    assert!(dashed.is_valid());
    assert_eq!(dashed, plain);

    let short = check_required_fields(&proveedor("20-1234-9"), &def, &catalog());
    assert_eq!(fields(&short), vec!["cuit"]);

    let empty = TypeAssignment::Proveedor(ProveedorFields::default());
    let result = check_required_fields(&empty, &def, &catalog());
    assert_eq!(fields(&result), vec!["cuit", "razonSocialId"]);
  }

  #[test]
  fn no_socio_and_flagless_types_always_pass() {
    let no_socio = PersonTypeDefinition::builtin(&PersonTypeCode::NoSocio);
    assert!(
      check_required_fields(&TypeAssignment::NoSocio, &no_socio, &catalog())
        .is_valid()
    );

    let code = PersonTypeCode::from("COLABORADOR");
    let ext = TypeAssignment::empty(&code);
    let def = PersonTypeDefinition::builtin(&code);
    assert!(check_required_fields(&ext, &def, &catalog()).is_valid());
  }

  #[test]
  fn extension_types_follow_catalog_flags() {
    let code = PersonTypeCode::from("COLABORADOR");
    let def = PersonTypeDefinition {
      requires_categoria: true,
      requires_cuit: true,
      ..PersonTypeDefinition::builtin(&code)
    };
    let ext = TypeAssignment::Extension {
      code:   "COLABORADOR".into(),
      fields: ExtensionFields {
        cuit: Some("27-98765432-1".into()),
        ..Default::default()
      },
    };
    let result = check_required_fields(&ext, &def, &catalog());
    assert_eq!(fields(&result), vec!["categoriaId", "razonSocialId"]);
  }

  #[test]
  fn unknown_reference_ids_are_reported() {
    let catalog = Catalog {
      categorias: vec![ReferenceEntry {
        id:     1,
        codigo: "GENERAL".into(),
        nombre: "General".into(),
      }],
      ..Catalog::default()
    };
    let def = PersonTypeDefinition::builtin(&PersonTypeCode::Socio);
    let result = check_required_fields(&socio(Some(9)), &def, &catalog);
    assert_eq!(result.violations[0].code(), "unknown_reference");
    assert!(check_required_fields(&socio(Some(1)), &def, &catalog).is_valid());
  }

  // ── Batch ─────────────────────────────────────────────────────────────────

  #[test]
  fn empty_list_is_rejected() {
    let report = validate_person_types(&[], &catalog()).report();
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "empty_type_set");
    assert_eq!(report.errors[0].path, "tipos");
  }

  #[test]
  fn docente_with_zeroes_yields_two_errors() {
    let rows = [json!(
      { "tipoPersonaCodigo": "DOCENTE", "especialidadId": 0, "honorariosPorHora": 0 }
    )];
    let report = validate_payload(&rows, &catalog());
    assert!(!report.valid);
    let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["tipos[0].especialidadId", "tipos[0].honorariosPorHora"]);
  }

  #[test]
  fn batch_aggregates_every_failure() {
    let assignments = vec![
      socio(None),
      TypeAssignment::NoSocio,
      proveedor("123"),
    ];
    let result = validate_person_types(&assignments, &catalog());
    let codes: Vec<_> = result.violations.iter().map(Violation::code).collect();
    assert_eq!(
      codes,
      vec!["exclusion_violation", "missing_field", "missing_field"]
    );
    assert_eq!(result.violations[1].path(), "tipos[0].categoriaId");
    assert_eq!(result.violations[2].path(), "tipos[2].cuit");
  }

  #[test]
  fn valid_batch_passes() {
    let assignments = vec![
      socio(Some(3)),
      TypeAssignment::Docente(DocenteFields {
        especialidad_id:     Some(4),
        honorarios_por_hora: Some(2500.0),
      }),
      proveedor("20-12345678-9"),
    ];
    let report = validate_person_types(&assignments, &catalog()).report();
    assert!(report.valid);
    assert!(report.errors.is_empty());
  }

  #[test]
  fn blank_and_undefined_codes_are_reported() {
    let report = validate_payload(
      &[json!({ "tipoPersonaCodigo": "" }), json!({ "tipoPersonaCodigo": "cualquiera" })],
      &catalog(),
    );
    assert!(!report.valid);
    let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
      paths,
      vec!["tipos[0].tipoPersonaCodigo", "tipos[1].tipoPersonaCodigo"]
    );
    assert!(report.errors.iter().all(|e| e.code == "unknown_type"));
    assert_eq!(report.errors[0].message, "a person type code is required");
    assert_eq!(
      report.errors[1].message,
      "CUALQUIERA is not a known person type"
    );
  }

  #[test]
  fn extension_codes_defined_in_the_catalog_pass() {
    let code = PersonTypeCode::from("COLABORADOR");
    let mut catalog = catalog();
    catalog.types.push(PersonTypeDefinition::builtin(&code));

    let assignments = vec![TypeAssignment::empty(&code)];
    assert!(validate_person_types(&assignments, &catalog).is_valid());
    assert!(!validate_person_types(&assignments, &Catalog::default()).is_valid());
  }

  #[test]
  fn unreadable_cells_are_reported_with_the_rest() {
    let rows = [
      json!({ "tipoPersonaCodigo": "SOCIO", "categoriaId": -1 }),
      json!({ "tipoPersonaCodigo": "DOCENTE" }),
    ];
    let report = validate_payload(&rows, &catalog());
    let errors: Vec<_> = report
      .errors
      .iter()
      .map(|e| (e.path.as_str(), e.code.as_str()))
      .collect();
    assert_eq!(errors, vec![
      ("tipos[0].categoriaId", "invalid_value"),
      ("tipos[1].especialidadId", "missing_field"),
      ("tipos[1].honorariosPorHora", "missing_field"),
    ]);
  }
}
