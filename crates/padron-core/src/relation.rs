//! Family relation codes and the relation catalog.
//!
//! The catalog is a declarative table: each code carries its display label,
//! its naive inverse (used when genders are unknown) and the rule the
//! inference engine applies to it. Extending the table never requires
//! touching control flow in [`crate::inference`].

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

// ─── Relation codes ──────────────────────────────────────────────────────────

/// A kinship relation code, as stored on a `relacion familiar` record.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Relation {
  Padre,
  Madre,
  Hijo,
  Hija,
  Esposo,
  Esposa,
  Hermano,
  Hermana,
  Abuelo,
  Abuela,
  Nieto,
  Nieta,
  #[serde(alias = "tío")]
  #[strum(to_string = "tio", serialize = "tío")]
  Tio,
  #[serde(alias = "tía")]
  #[strum(to_string = "tia", serialize = "tía")]
  Tia,
  Sobrino,
  Sobrina,
  Primo,
  Prima,
  Otro,
}

impl Relation {
  /// Parse free text leniently: surrounding whitespace is ignored and case
  /// does not matter. Returns `None` for unrecognised codes.
  pub fn parse_lenient(raw: &str) -> Option<Self> {
    let trimmed = raw.trim();
    Self::from_str(trimmed)
      .or_else(|_| Self::from_str(&trimmed.to_lowercase()))
      .ok()
  }
}

// ─── Inference rules ─────────────────────────────────────────────────────────

/// How the inverse of a relation is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InverseRule {
  /// The familiar is the parent/grandparent/uncle; the inverse names the
  /// principal's role and follows the familiar's gender.
  ByFamiliarGender {
    masculine: Relation,
    feminine:  Relation,
  },
  /// The familiar is the child/grandchild/nephew; the inverse names the
  /// principal as the elder and follows the principal's gender.
  ByPrincipalGender {
    masculine: Relation,
    feminine:  Relation,
  },
  /// Gender is already encoded in the code; the inverse is the code itself.
  Symmetric,
  /// No gender rule; the naive inverse is used.
  Naive,
}

/// One row of the relation catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEntry {
  pub code:          Relation,
  pub label:         String,
  /// Fallback inverse when the genders involved are unknown.
  pub naive_inverse: Relation,
  pub rule:          InverseRule,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Lookup table from relation code to [`RelationEntry`].
///
/// Serialises as a plain list of entries. A deserialised list is laid over
/// the built-in table: listed codes replace their built-in entry, the rest
/// keep it, and a later entry for the same code replaces an earlier one.
/// [`RelationCatalog::from`] builds a table holding only the given entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RelationOverrides", into = "Vec<RelationEntry>")]
pub struct RelationCatalog {
  entries: BTreeMap<Relation, RelationEntry>,
}

impl RelationCatalog {
  pub fn get(&self, code: Relation) -> Option<&RelationEntry> {
    self.entries.get(&code)
  }

  /// The naive inverse for `code`, or [`Relation::Otro`] if the catalog has
  /// no entry for it.
  pub fn naive_inverse(&self, code: Relation) -> Relation {
    self
      .get(code)
      .map(|e| e.naive_inverse)
      .unwrap_or(Relation::Otro)
  }

  /// Display label for `code`, falling back to the code itself.
  pub fn label(&self, code: Relation) -> String {
    self
      .get(code)
      .map(|e| e.label.clone())
      .unwrap_or_else(|| code.to_string())
  }

  pub fn entries(&self) -> impl Iterator<Item = &RelationEntry> {
    self.entries.values()
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Replace or add entries, keyed by code.
  pub fn merge(&mut self, entries: impl IntoIterator<Item = RelationEntry>) {
    self.entries.extend(entries.into_iter().map(|e| (e.code, e)));
  }
}

/// Entries read from a catalog file, applied over the built-in table.
#[derive(Deserialize)]
#[serde(transparent)]
struct RelationOverrides(Vec<RelationEntry>);

impl From<RelationOverrides> for RelationCatalog {
  fn from(RelationOverrides(list): RelationOverrides) -> Self {
    let mut catalog = Self::default();
    catalog.merge(list);
    catalog
  }
}

impl From<Vec<RelationEntry>> for RelationCatalog {
  fn from(list: Vec<RelationEntry>) -> Self {
    let mut catalog = Self {
      entries: BTreeMap::new(),
    };
    catalog.merge(list);
    catalog
  }
}

impl From<RelationCatalog> for Vec<RelationEntry> {
  fn from(catalog: RelationCatalog) -> Self {
    catalog.entries.into_values().collect()
  }
}

use InverseRule::{ByFamiliarGender, ByPrincipalGender, Naive, Symmetric};
use Relation::*;

/// `(code, label, naive inverse, rule)` for every built-in relation.
const STANDARD: &[(Relation, &str, Relation, InverseRule)] = &[
  (Padre, "Padre", Hijo, ByFamiliarGender { masculine: Hijo, feminine: Hija }),
  (Madre, "Madre", Hijo, ByFamiliarGender { masculine: Hijo, feminine: Hija }),
  (Hijo, "Hijo", Padre, ByPrincipalGender { masculine: Padre, feminine: Madre }),
  (Hija, "Hija", Padre, ByPrincipalGender { masculine: Padre, feminine: Madre }),
  (Esposo, "Esposo", Esposo, Symmetric),
  (Esposa, "Esposa", Esposa, Symmetric),
  (Hermano, "Hermano", Hermano, Symmetric),
  (Hermana, "Hermana", Hermana, Symmetric),
  (Abuelo, "Abuelo", Nieto, ByFamiliarGender { masculine: Nieto, feminine: Nieta }),
  (Abuela, "Abuela", Nieto, ByFamiliarGender { masculine: Nieto, feminine: Nieta }),
  (Nieto, "Nieto", Abuelo, ByPrincipalGender { masculine: Abuelo, feminine: Abuela }),
  (Nieta, "Nieta", Abuelo, ByPrincipalGender { masculine: Abuelo, feminine: Abuela }),
  (Tio, "Tío", Sobrino, ByFamiliarGender { masculine: Sobrino, feminine: Sobrina }),
  (Tia, "Tía", Sobrino, ByFamiliarGender { masculine: Sobrino, feminine: Sobrina }),
  (Sobrino, "Sobrino", Tio, ByPrincipalGender { masculine: Tio, feminine: Tia }),
  (Sobrina, "Sobrina", Tio, ByPrincipalGender { masculine: Tio, feminine: Tia }),
  (Primo, "Primo", Primo, Symmetric),
  (Prima, "Prima", Prima, Symmetric),
  (Otro, "Otro", Otro, Naive),
];

impl Default for RelationCatalog {
  fn default() -> Self {
    STANDARD
      .iter()
      .map(|&(code, label, naive_inverse, rule)| RelationEntry {
        code,
        label: label.to_string(),
        naive_inverse,
        rule,
      })
      .collect::<Vec<_>>()
      .into()
  }
}

/// Every relation code, in declaration order.
pub fn all_relations() -> impl Iterator<Item = Relation> { Relation::iter() }
