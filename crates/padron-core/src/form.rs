//! Form state for editing a persona's types.
//!
//! Each type moves through `Unselected → Selected → Validated | Invalid →
//! Submitted`. Selecting a type pre-fills its reference fields with the
//! catalog entry coded `GENERAL`, and submission is refused while any
//! assignment is invalid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Catalog, Error, Result,
  catalog::ReferenceKind,
  dto::CreatePersonaTipoDto,
  person_type::{PersonTypeCode, TypeAssignment},
  type_set::{ExclusionPolicy, TypeSet},
  validation::{ValidationResult, Violation, validate_person_types},
};

/// Lifecycle of one type inside the form. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
  Unselected,
  Selected,
  Validated,
  Invalid,
  Submitted,
}

#[derive(Debug, Clone)]
struct Entry {
  assignment: TypeAssignment,
  state:      AssignmentState,
}

/// The type section of the persona form.
#[derive(Debug, Clone, Default)]
pub struct TypeForm {
  policy:  ExclusionPolicy,
  types:   TypeSet,
  entries: BTreeMap<PersonTypeCode, Entry>,
}

impl TypeForm {
  pub fn new(policy: ExclusionPolicy) -> Self {
    Self {
      policy,
      ..Self::default()
    }
  }

  /// A form pre-loaded with a persona's current assignments, all `Selected`.
  /// Later duplicates and exclusive conflicts are resolved by the
  /// auto-resolve rule so the form starts consistent.
  pub fn with_assignments(
    policy: ExclusionPolicy,
    assignments: Vec<TypeAssignment>,
    catalog: &Catalog,
  ) -> Self {
    let mut form = Self::new(policy);
    for assignment in assignments {
      let code = assignment.code();
      if let Ok(removed) =
        form.types.add(code.clone(), ExclusionPolicy::AutoResolve, catalog)
      {
        for r in removed {
          form.entries.remove(&r);
        }
      }
      form.entries.insert(code, Entry {
        assignment,
        state: AssignmentState::Selected,
      });
    }
    form
  }

  pub fn state(&self, code: &PersonTypeCode) -> AssignmentState {
    self
      .entries
      .get(code)
      .map(|e| e.state)
      .unwrap_or(AssignmentState::Unselected)
  }

  pub fn assignment(&self, code: &PersonTypeCode) -> Option<&TypeAssignment> {
    self.entries.get(code).map(|e| &e.assignment)
  }

  /// Snapshot of the selected assignments, in code order.
  pub fn assignments(&self) -> Vec<TypeAssignment> {
    self.entries.values().map(|e| e.assignment.clone()).collect()
  }

  /// Select `code`, populating reference defaults. Returns the codes that
  /// were deselected to resolve an exclusive conflict.
  pub fn select(
    &mut self,
    code: PersonTypeCode,
    catalog: &Catalog,
  ) -> Result<Vec<PersonTypeCode>> {
    if self.entries.contains_key(&code) {
      return Ok(Vec::new());
    }

    let removed = self.types.add(code.clone(), self.policy, catalog)?;
    for r in &removed {
      self.entries.remove(r);
    }

    let assignment = with_defaults(TypeAssignment::empty(&code), catalog);
    self.entries.insert(code, Entry {
      assignment,
      state: AssignmentState::Selected,
    });
    Ok(removed)
  }

  /// Return `code` to `Unselected`; returns whether it was selected.
  pub fn deselect(&mut self, code: &PersonTypeCode) -> bool {
    self.types.remove(code);
    self.entries.remove(code).is_some()
  }

  /// Replace the fields of an already selected type. The assignment goes
  /// back to `Selected` until validated again.
  pub fn update(&mut self, assignment: TypeAssignment) -> Result<()> {
    let code = assignment.code();
    let entry = self
      .entries
      .get_mut(&code)
      .ok_or_else(|| Error::TypeNotAssigned(code.clone()))?;
    entry.assignment = assignment;
    entry.state = AssignmentState::Selected;
    Ok(())
  }

  /// Run the batch validation and move every assignment to `Validated` or
  /// `Invalid`.
  pub fn validate(&mut self, catalog: &Catalog) -> ValidationResult {
    let codes: Vec<PersonTypeCode> = self.entries.keys().cloned().collect();
    let result = validate_person_types(&self.assignments(), catalog);

    for (index, code) in codes.iter().enumerate() {
      let invalid = result.violations.iter().any(|v| match v {
        Violation::ExclusionViolation { first, second } => {
          first == code || second == code
        }
        other => other.index() == Some(index),
      });
      if let Some(entry) = self.entries.get_mut(code) {
        entry.state = if invalid {
          AssignmentState::Invalid
        } else {
          AssignmentState::Validated
        };
      }
    }
    result
  }

  /// Validate and, if everything passes, produce the create payloads and
  /// mark every assignment `Submitted`. Blocked while anything is invalid.
  pub fn submit(
    &mut self,
    catalog: &Catalog,
  ) -> std::result::Result<Vec<CreatePersonaTipoDto>, ValidationResult> {
    let result = self.validate(catalog);
    if !result.is_valid() {
      return Err(result);
    }

    for entry in self.entries.values_mut() {
      entry.state = AssignmentState::Submitted;
    }
    Ok(
      self
        .entries
        .values()
        .map(|e| CreatePersonaTipoDto::from(&e.assignment))
        .collect(),
    )
  }
}

/// Fill empty reference fields with the catalog's `GENERAL` entries.
/// Extension types only get the fields their definition requires.
pub fn with_defaults(
  assignment: TypeAssignment,
  catalog: &Catalog,
) -> TypeAssignment {
  let fill = |current: Option<u64>, kind| {
    current
      .filter(|&id| id != 0)
      .or_else(|| catalog.default_reference(kind))
  };

  match assignment {
    TypeAssignment::Socio(mut f) => {
      f.categoria_id = fill(f.categoria_id, ReferenceKind::Categoria);
      TypeAssignment::Socio(f)
    }
    TypeAssignment::Docente(mut f) => {
      f.especialidad_id = fill(f.especialidad_id, ReferenceKind::Especialidad);
      TypeAssignment::Docente(f)
    }
    TypeAssignment::Proveedor(mut f) => {
      f.razon_social_id = fill(f.razon_social_id, ReferenceKind::RazonSocial);
      TypeAssignment::Proveedor(f)
    }
    TypeAssignment::Extension { code, mut fields } => {
      let def = catalog.definition(&PersonTypeCode::from(code.as_str()));
      if def.requires_categoria {
        fields.categoria_id = fill(fields.categoria_id, ReferenceKind::Categoria);
      }
      if def.requires_especialidad {
        fields.especialidad_id =
          fill(fields.especialidad_id, ReferenceKind::Especialidad);
      }
      if def.requires_cuit {
        fields.razon_social_id =
          fill(fields.razon_social_id, ReferenceKind::RazonSocial);
      }
      TypeAssignment::Extension { code, fields }
    }
    other @ TypeAssignment::NoSocio => other,
  }
}
