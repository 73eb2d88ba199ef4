//! Error types for `padron-core`.
//!
//! Validation failures are not errors: they are reported as
//! [`crate::validation::Violation`] values. The variants here cover misuse of
//! the stateful helpers (type sets, histories, relation drafts).

use thiserror::Error;

use crate::person_type::PersonTypeCode;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{added} cannot be combined with {existing}")]
  ExclusionViolation {
    added:    PersonTypeCode,
    existing: PersonTypeCode,
  },

  #[error("type {0} is not assigned")]
  TypeNotAssigned(PersonTypeCode),

  #[error("type {0} is already assigned")]
  TypeAlreadyAssigned(PersonTypeCode),

  #[error("assignment record not found: {0}")]
  RecordNotFound(uuid::Uuid),

  #[error("assignment record {0} is already deactivated")]
  AlreadyDeactivated(uuid::Uuid),

  #[error("assignment fields belong to {found}, expected {expected}")]
  TypeMismatch {
    expected: PersonTypeCode,
    found:    PersonTypeCode,
  },

  #[error("no relation selected")]
  MissingRelation,

  #[error("missing {0} persona")]
  MissingPersona(&'static str),

  #[error("a persona cannot be related to itself ({0})")]
  SelfRelation(u64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
