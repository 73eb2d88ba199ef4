//! Per-persona assignment history.
//!
//! Type assignments are never deleted. Removing a type deactivates its
//! record, which stays in the history with the time and reason. The active
//! records form the snapshot handed to [`crate::validation`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Catalog, Error, Result,
  person_type::{PersonTypeCode, TypeAssignment},
  type_set::{ExclusionPolicy, TypeSet},
  validation::{ValidationResult, validate_person_types},
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Whether a record is still in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentStatus {
  Active,
  Deactivated {
    reason: Option<String>,
    at:     DateTime<Utc>,
  },
}

impl AssignmentStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One assignment of a type to a persona, with its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
  pub record_id:   Uuid,
  pub persona_id:  u64,
  pub assignment:  TypeAssignment,
  /// Set when the record is created; never changes.
  pub assigned_at: DateTime<Utc>,
  /// Last time the type-specific fields were edited.
  pub updated_at:  Option<DateTime<Utc>>,
  pub status:      AssignmentStatus,
}

impl AssignmentRecord {
  pub fn code(&self) -> PersonTypeCode { self.assignment.code() }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Append-only list of every type ever assigned to one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentHistory {
  persona_id: u64,
  records:    Vec<AssignmentRecord>,
}

impl AssignmentHistory {
  pub fn new(persona_id: u64) -> Self {
    Self {
      persona_id,
      records: Vec::new(),
    }
  }

  pub fn persona_id(&self) -> u64 { self.persona_id }

  /// Every record, oldest first, active or not.
  pub fn records(&self) -> &[AssignmentRecord] { &self.records }

  /// The active assignments, oldest first.
  pub fn active(&self) -> Vec<TypeAssignment> {
    self
      .records
      .iter()
      .filter(|r| r.status.is_active())
      .map(|r| r.assignment.clone())
      .collect()
  }

  pub fn active_codes(&self) -> TypeSet {
    self
      .records
      .iter()
      .filter(|r| r.status.is_active())
      .map(AssignmentRecord::code)
      .collect()
  }

  fn active_index(&self, code: &PersonTypeCode) -> Option<usize> {
    self
      .records
      .iter()
      .position(|r| r.status.is_active() && &r.code() == code)
  }

  /// Assign a new type. Exclusive conflicts follow `policy`; under
  /// auto-resolve the conflicting records are deactivated.
  pub fn assign(
    &mut self,
    assignment: TypeAssignment,
    policy: ExclusionPolicy,
    catalog: &Catalog,
  ) -> Result<&AssignmentRecord> {
    let code = assignment.code();
    if self.active_index(&code).is_some() {
      return Err(Error::TypeAlreadyAssigned(code));
    }

    let mut active = self.active_codes();
    let removed = active.add(code.clone(), policy, catalog)?;
    let now = Utc::now();
    for r in &removed {
      if let Some(i) = self.active_index(r) {
        self.records[i].status = AssignmentStatus::Deactivated {
          reason: Some(format!("replaced by {code}")),
          at:     now,
        };
      }
    }

    let record = AssignmentRecord {
      record_id: Uuid::new_v4(),
      persona_id: self.persona_id,
      assignment,
      assigned_at: now,
      updated_at: None,
      status: AssignmentStatus::Active,
    };
    tracing::debug!(
      persona_id = self.persona_id,
      code = %code,
      record_id = %record.record_id,
      "assigned person type"
    );
    self.records.push(record);
    Ok(&self.records[self.records.len() - 1])
  }

  /// Replace the fields of the active record for the assignment's type.
  pub fn update(
    &mut self,
    assignment: TypeAssignment,
  ) -> Result<&AssignmentRecord> {
    let code = assignment.code();
    let i = self
      .active_index(&code)
      .ok_or(Error::TypeNotAssigned(code))?;
    let record = &mut self.records[i];
    record.assignment = assignment;
    record.updated_at = Some(Utc::now());
    Ok(&*record)
  }

  /// Replace the fields of a specific record, which must still be active and
  /// hold the same type.
  pub fn update_record(
    &mut self,
    record_id: Uuid,
    assignment: TypeAssignment,
  ) -> Result<&AssignmentRecord> {
    let record = self
      .records
      .iter_mut()
      .find(|r| r.record_id == record_id)
      .ok_or(Error::RecordNotFound(record_id))?;
    if !record.status.is_active() {
      return Err(Error::AlreadyDeactivated(record_id));
    }
    let (expected, found) = (record.code(), assignment.code());
    if expected != found {
      return Err(Error::TypeMismatch { expected, found });
    }
    record.assignment = assignment;
    record.updated_at = Some(Utc::now());
    Ok(&*record)
  }

  /// Deactivate the active record for `code`.
  pub fn deactivate(
    &mut self,
    code: &PersonTypeCode,
    reason: Option<String>,
  ) -> Result<&AssignmentRecord> {
    let i = self
      .active_index(code)
      .ok_or_else(|| Error::TypeNotAssigned(code.clone()))?;
    self.deactivate_at(i, reason)
  }

  /// Deactivate a specific record.
  pub fn deactivate_record(
    &mut self,
    record_id: Uuid,
    reason: Option<String>,
  ) -> Result<&AssignmentRecord> {
    let i = self
      .records
      .iter()
      .position(|r| r.record_id == record_id)
      .ok_or(Error::RecordNotFound(record_id))?;
    if !self.records[i].status.is_active() {
      return Err(Error::AlreadyDeactivated(record_id));
    }
    self.deactivate_at(i, reason)
  }

  fn deactivate_at(
    &mut self,
    i: usize,
    reason: Option<String>,
  ) -> Result<&AssignmentRecord> {
    let record = &mut self.records[i];
    record.status = AssignmentStatus::Deactivated {
      reason,
      at: Utc::now(),
    };
    tracing::debug!(
      persona_id = record.persona_id,
      record_id = %record.record_id,
      "deactivated person type"
    );
    Ok(&*record)
  }

  /// Validate the active snapshot.
  pub fn validate(&self, catalog: &Catalog) -> ValidationResult {
    validate_person_types(&self.active(), catalog)
  }
}
