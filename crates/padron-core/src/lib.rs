//! Core rules for the Padrón persona registry.
//!
//! Two pure engines live here: kinship inverse inference
//! ([`inference::infer_inverse_relation`]) and persona-type validation
//! ([`validation::validate_person_types`]). Both take the [`Catalog`] as an
//! explicit argument and never touch shared state.
//!
//! This crate has no HTTP dependencies. The API and CLI
//! crates depend on it.

pub mod catalog;
pub mod dto;
pub mod error;
pub mod form;
pub mod gender;
pub mod history;
pub mod inference;
pub mod person_type;
pub mod relation;
pub mod relation_draft;
pub mod type_set;
pub mod validation;

pub use catalog::Catalog;
pub use error::{Error, Result};
