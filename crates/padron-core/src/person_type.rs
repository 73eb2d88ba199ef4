//! Person-type codes, their requirement definitions and the typed
//! assignment records validated by [`crate::validation`].

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::dto::PersonaTipoDto;

// ─── Codes ───────────────────────────────────────────────────────────────────

/// A `tipo de persona` code. The four built-in codes are variants; anything
/// else an administrator defines in the catalog is an [`Self::Extension`].
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum PersonTypeCode {
  Socio,
  NoSocio,
  Docente,
  Proveedor,
  /// Upper-cased, trimmed code not covered by the built-ins.
  Extension(String),
}

impl PersonTypeCode {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Socio => "SOCIO",
      Self::NoSocio => "NO_SOCIO",
      Self::Docente => "DOCENTE",
      Self::Proveedor => "PROVEEDOR",
      Self::Extension(code) => code,
    }
  }

  fn parse(raw: &str) -> Self {
    let code = raw.trim().to_uppercase();
    match code.as_str() {
      "SOCIO" => Self::Socio,
      "NO_SOCIO" => Self::NoSocio,
      "DOCENTE" => Self::Docente,
      "PROVEEDOR" => Self::Proveedor,
      _ => Self::Extension(code),
    }
  }
}

impl fmt::Display for PersonTypeCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PersonTypeCode {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::parse(s)) }
}

impl From<String> for PersonTypeCode {
  fn from(s: String) -> Self { Self::parse(&s) }
}

impl From<&str> for PersonTypeCode {
  fn from(s: &str) -> Self { Self::parse(s) }
}

impl From<PersonTypeCode> for String {
  fn from(code: PersonTypeCode) -> Self { code.as_str().to_string() }
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// Catalog metadata for one person type: which reference fields an
/// assignment of this type must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTypeDefinition {
  #[serde(rename = "codigo")]
  pub code:                  PersonTypeCode,
  #[serde(rename = "nombre", default)]
  pub name:                  String,
  /// Requires `categoriaId`.
  #[serde(rename = "requiereCategoria", default)]
  pub requires_categoria:    bool,
  /// Requires `especialidadId` and a positive `honorariosPorHora`.
  #[serde(rename = "requiereEspecialidad", default)]
  pub requires_especialidad: bool,
  /// Requires an 11-digit `cuit` and `razonSocialId`.
  #[serde(rename = "requiereCuit", default)]
  pub requires_cuit:         bool,
}

impl PersonTypeDefinition {
  /// The built-in definition for `code`. Extension codes require nothing.
  pub fn builtin(code: &PersonTypeCode) -> Self {
    let (name, categoria, especialidad, cuit) = match code {
      PersonTypeCode::Socio => ("Socio", true, false, false),
      PersonTypeCode::NoSocio => ("No socio", false, false, false),
      PersonTypeCode::Docente => ("Docente", false, true, false),
      PersonTypeCode::Proveedor => ("Proveedor", false, false, true),
      PersonTypeCode::Extension(c) => (c.as_str(), false, false, false),
    };
    Self {
      code:                  code.clone(),
      name:                  name.to_string(),
      requires_categoria:    categoria,
      requires_especialidad: especialidad,
      requires_cuit:         cuit,
    }
  }

  pub fn requires_anything(&self) -> bool {
    self.requires_categoria || self.requires_especialidad || self.requires_cuit
  }
}

// ─── Assignments ─────────────────────────────────────────────────────────────

/// Fields of a SOCIO assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocioFields {
  pub categoria_id: Option<u64>,
}

/// Fields of a DOCENTE assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocenteFields {
  pub especialidad_id:     Option<u64>,
  pub honorarios_por_hora: Option<f64>,
}

/// Fields of a PROVEEDOR assignment. `cuit` is kept as entered; use
/// [`normalize_cuit`] for the canonical digits-only form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProveedorFields {
  pub cuit:            Option<String>,
  pub razon_social_id: Option<u64>,
}

/// Every optional field, for admin-defined types whose requirements are only
/// known from the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionFields {
  pub categoria_id:        Option<u64>,
  pub especialidad_id:     Option<u64>,
  pub honorarios_por_hora: Option<f64>,
  pub cuit:                Option<String>,
  pub razon_social_id:     Option<u64>,
}

/// One type assigned to a persona, with the fields that type carries.
///
/// On the wire it takes the flat [`PersonaTipoDto`] shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersonaTipoDto", into = "PersonaTipoDto")]
pub enum TypeAssignment {
  Socio(SocioFields),
  NoSocio,
  Docente(DocenteFields),
  Proveedor(ProveedorFields),
  Extension {
    code:   String,
    fields: ExtensionFields,
  },
}

impl TypeAssignment {
  /// An assignment of `code` with every field empty.
  pub fn empty(code: &PersonTypeCode) -> Self {
    match code {
      PersonTypeCode::Socio => Self::Socio(SocioFields::default()),
      PersonTypeCode::NoSocio => Self::NoSocio,
      PersonTypeCode::Docente => Self::Docente(DocenteFields::default()),
      PersonTypeCode::Proveedor => Self::Proveedor(ProveedorFields::default()),
      PersonTypeCode::Extension(c) => Self::Extension {
        code:   c.clone(),
        fields: ExtensionFields::default(),
      },
    }
  }

  pub fn code(&self) -> PersonTypeCode {
    match self {
      Self::Socio(_) => PersonTypeCode::Socio,
      Self::NoSocio => PersonTypeCode::NoSocio,
      Self::Docente(_) => PersonTypeCode::Docente,
      Self::Proveedor(_) => PersonTypeCode::Proveedor,
      Self::Extension { code, .. } => PersonTypeCode::from(code.as_str()),
    }
  }
}

// ─── CUIT ────────────────────────────────────────────────────────────────────

/// Strip every non-digit character (formatting dashes, spaces, dots).
pub fn normalize_cuit(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

/// `true` when `raw` holds exactly 11 digits once formatting is stripped.
pub fn is_valid_cuit(raw: &str) -> bool { normalize_cuit(raw).len() == 11 }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_parse_case_insensitively() {
    assert_eq!(PersonTypeCode::from(" socio "), PersonTypeCode::Socio);
    assert_eq!(PersonTypeCode::from("No_Socio"), PersonTypeCode::NoSocio);
    assert_eq!(
      PersonTypeCode::from("colaborador"),
      PersonTypeCode::Extension("COLABORADOR".into())
    );
  }

  #[test]
  fn codes_serialize_as_plain_strings() {
    let json = serde_json::to_string(&PersonTypeCode::NoSocio).unwrap();
    assert_eq!(json, "\"NO_SOCIO\"");
    let back: PersonTypeCode = serde_json::from_str("\"DOCENTE\"").unwrap();
    assert_eq!(back, PersonTypeCode::Docente);
  }

  #[test]
  fn builtin_definitions_match_requirements() {
    let socio = PersonTypeDefinition::builtin(&PersonTypeCode::Socio);
    assert!(socio.requires_categoria);
    assert!(!socio.requires_cuit);

    let no_socio = PersonTypeDefinition::builtin(&PersonTypeCode::NoSocio);
    assert!(!no_socio.requires_anything());

    let ext =
      PersonTypeDefinition::builtin(&PersonTypeCode::from("COLABORADOR"));
    assert!(!ext.requires_anything());
  }

  #[test]
  fn cuit_normalization_strips_formatting() {
    assert_eq!(normalize_cuit("20-12345678-9"), "20123456789");
    assert!(is_valid_cuit("20-12345678-9"));
    assert!(is_valid_cuit("20123456789"));
    assert!(!is_valid_cuit("20-1234567-9"));
    assert!(!is_valid_cuit(""));
  }

  #[test]
  fn extension_assignment_reports_its_code() {
    let code = PersonTypeCode::from("colaborador");
    let assignment = TypeAssignment::empty(&code);
    assert_eq!(assignment.code(), code);
  }
}
