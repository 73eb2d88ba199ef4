//! The catalog object threaded through both engines.
//!
//! The front-end fetches catalogs over REST once and reads them everywhere.
//! Here that data is a plain value passed explicitly to every operation, so
//! tests can build synthetic catalogs freely.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  person_type::{PersonTypeCode, PersonTypeDefinition},
  relation::RelationCatalog,
};

/// Code of the reference entry pre-selected when a type is first selected.
pub const DEFAULT_REFERENCE_CODE: &str = "GENERAL";

// ─── Reference lists ─────────────────────────────────────────────────────────

/// One row of a reference catalog (categoría, especialidad, razón social).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
  pub id:     u64,
  pub codigo: String,
  #[serde(default)]
  pub nombre: String,
}

/// Which reference catalog an ID points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
  Categoria,
  Especialidad,
  RazonSocial,
}

impl ReferenceKind {
  /// The DTO field that carries an ID of this kind.
  pub fn field(self) -> &'static str {
    match self {
      Self::Categoria => "categoriaId",
      Self::Especialidad => "especialidadId",
      Self::RazonSocial => "razonSocialId",
    }
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Catalog {
  #[serde(rename = "parentescos")]
  pub relations:        RelationCatalog,
  #[serde(rename = "tipos")]
  pub types:            Vec<PersonTypeDefinition>,
  /// Pairs of codes that may never be assigned together.
  #[serde(rename = "exclusiones")]
  pub exclusive_pairs:  Vec<(PersonTypeCode, PersonTypeCode)>,
  pub categorias:       Vec<ReferenceEntry>,
  pub especialidades:   Vec<ReferenceEntry>,
  pub razones_sociales: Vec<ReferenceEntry>,
}

impl Default for Catalog {
  fn default() -> Self {
    let types = [
      PersonTypeCode::Socio,
      PersonTypeCode::NoSocio,
      PersonTypeCode::Docente,
      PersonTypeCode::Proveedor,
    ]
    .iter()
    .map(PersonTypeDefinition::builtin)
    .collect();

    Self {
      relations: RelationCatalog::default(),
      types,
      exclusive_pairs: vec![(PersonTypeCode::Socio, PersonTypeCode::NoSocio)],
      categorias: Vec::new(),
      especialidades: Vec::new(),
      razones_sociales: Vec::new(),
    }
  }
}

impl Catalog {
  /// Parse a catalog from its JSON representation.
  pub fn from_json_str(raw: &str) -> Result<Self> {
    Ok(serde_json::from_str(raw)?)
  }

  /// The definition for `code`: the catalog's own entry if present,
  /// otherwise the built-in one.
  pub fn definition(&self, code: &PersonTypeCode) -> PersonTypeDefinition {
    self
      .types
      .iter()
      .find(|d| &d.code == code)
      .cloned()
      .unwrap_or_else(|| PersonTypeDefinition::builtin(code))
  }

  /// `true` for the built-in codes and for extension codes the catalog
  /// defines. A catalog with no type list accepts any non-blank code.
  pub fn is_known_type(&self, code: &PersonTypeCode) -> bool {
    match code {
      PersonTypeCode::Extension(c) if c.is_empty() => false,
      PersonTypeCode::Extension(_) => {
        self.types.is_empty() || self.types.iter().any(|d| &d.code == code)
      }
      _ => true,
    }
  }

  /// Codes that may not coexist with `code`.
  pub fn exclusive_partners<'a>(
    &'a self,
    code: &'a PersonTypeCode,
  ) -> impl Iterator<Item = &'a PersonTypeCode> + 'a {
    self.exclusive_pairs.iter().filter_map(move |(a, b)| {
      if a == code {
        Some(b)
      } else if b == code {
        Some(a)
      } else {
        None
      }
    })
  }

  pub fn references(&self, kind: ReferenceKind) -> &[ReferenceEntry] {
    match kind {
      ReferenceKind::Categoria => &self.categorias,
      ReferenceKind::Especialidad => &self.especialidades,
      ReferenceKind::RazonSocial => &self.razones_sociales,
    }
  }

  /// ID of the entry coded [`DEFAULT_REFERENCE_CODE`], if the list has one.
  pub fn default_reference(&self, kind: ReferenceKind) -> Option<u64> {
    self
      .references(kind)
      .iter()
      .find(|r| r.codigo.eq_ignore_ascii_case(DEFAULT_REFERENCE_CODE))
      .map(|r| r.id)
  }

  /// `true` when `id` appears in the reference list. An empty list means the
  /// catalog was not provided and every ID is accepted.
  pub fn is_known_reference(&self, kind: ReferenceKind, id: u64) -> bool {
    let list = self.references(kind);
    list.is_empty() || list.iter().any(|r| r.id == id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with_categorias() -> Catalog {
    Catalog {
      categorias: vec![
        ReferenceEntry {
          id:     3,
          codigo: "ACTIVO".into(),
          nombre: "Activo".into(),
        },
        ReferenceEntry {
          id:     7,
          codigo: "general".into(),
          nombre: "General".into(),
        },
      ],
      ..Catalog::default()
    }
  }

  #[test]
  fn default_reference_matches_general_code() {
    let catalog = with_categorias();
    assert_eq!(catalog.default_reference(ReferenceKind::Categoria), Some(7));
    assert_eq!(catalog.default_reference(ReferenceKind::Especialidad), None);
  }

  #[test]
  fn empty_reference_list_accepts_any_id() {
    let catalog = with_categorias();
    assert!(catalog.is_known_reference(ReferenceKind::Categoria, 3));
    assert!(!catalog.is_known_reference(ReferenceKind::Categoria, 4));
    assert!(catalog.is_known_reference(ReferenceKind::RazonSocial, 99));
  }

  #[test]
  fn only_defined_type_codes_are_known() {
    let catalog = Catalog::default();
    assert!(catalog.is_known_type(&PersonTypeCode::Proveedor));
    assert!(!catalog.is_known_type(&PersonTypeCode::from("CUALQUIERA")));
    assert!(!catalog.is_known_type(&PersonTypeCode::from("  ")));

    let open = Catalog {
      types: Vec::new(),
      ..Catalog::default()
    };
    assert!(open.is_known_type(&PersonTypeCode::from("CUALQUIERA")));
    assert!(!open.is_known_type(&PersonTypeCode::from("")));
  }

  #[test]
  fn exclusive_partners_are_symmetric() {
    let catalog = Catalog::default();
    let socio: Vec<_> = catalog
      .exclusive_partners(&PersonTypeCode::Socio)
      .cloned()
      .collect();
    assert_eq!(socio, vec![PersonTypeCode::NoSocio]);
    let no_socio: Vec<_> = catalog
      .exclusive_partners(&PersonTypeCode::NoSocio)
      .cloned()
      .collect();
    assert_eq!(no_socio, vec![PersonTypeCode::Socio]);
    assert_eq!(catalog.exclusive_partners(&PersonTypeCode::Docente).count(), 0);
  }

  #[test]
  fn partial_json_keeps_defaults() {
    let catalog = Catalog::from_json_str(
      r#"{
        "tipos": [
          { "codigo": "COLABORADOR", "nombre": "Colaborador", "requiereCuit": true }
        ],
        "razonesSociales": [ { "id": 1, "codigo": "GENERAL" } ]
      }"#,
    )
    .unwrap();

    assert_eq!(catalog.relations, RelationCatalog::default());
    assert_eq!(catalog.exclusive_pairs.len(), 1);
    assert!(
      catalog
        .definition(&PersonTypeCode::from("colaborador"))
        .requires_cuit
    );
    // Built-ins not listed in the file fall back to their defaults.
    assert!(catalog.definition(&PersonTypeCode::Socio).requires_categoria);
    assert_eq!(catalog.default_reference(ReferenceKind::RazonSocial), Some(1));
  }
}
