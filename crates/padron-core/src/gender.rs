//! Persona gender as recorded by the backend.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Gender of a persona. An absent gender is modelled as `Option::None` by the
/// callers, never as a variant.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Gender {
  Masculino,
  Femenino,
  Otro,
  NoEspecifica,
}

impl Gender {
  /// `true` when the gender says something about grammatical form.
  /// `NO_ESPECIFICA` carries no more information than an absent value.
  pub fn is_known(self) -> bool { !matches!(self, Self::NoEspecifica) }

  pub fn is_feminine(self) -> bool { matches!(self, Self::Femenino) }
}

/// `true` when `gender` is present and not `NO_ESPECIFICA`.
pub fn is_known(gender: Option<Gender>) -> bool {
  gender.is_some_and(Gender::is_known)
}

/// `true` only for an explicit `FEMENINO`; every other value selects the
/// masculine (default) form.
pub fn is_feminine(gender: Option<Gender>) -> bool {
  gender.is_some_and(Gender::is_feminine)
}
