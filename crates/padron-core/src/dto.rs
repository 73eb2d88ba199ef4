//! Wire shapes exchanged with the persona backend.
//!
//! Form payloads are loosely typed: IDs may arrive as numbers, numeric
//! strings, empty strings or `null`, and `0` means "not chosen". The
//! deserialisers here absorb that looseness once, so the rest of the crate
//! only sees [`TypeAssignment`] variants.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

use crate::person_type::{
  DocenteFields, ExtensionFields, PersonTypeCode, ProveedorFields,
  SocioFields, TypeAssignment, normalize_cuit,
};

// ─── PersonaTipoDto ──────────────────────────────────────────────────────────

/// One type assignment as posted by the form and as sent to
/// `POST /personas/{id}/tipos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaTipoDto {
  #[serde(deserialize_with = "required_code")]
  pub tipo_persona_codigo: PersonTypeCode,
  #[serde(
    default,
    deserialize_with = "lenient_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub categoria_id:        Option<u64>,
  #[serde(
    default,
    deserialize_with = "lenient_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub especialidad_id:     Option<u64>,
  #[serde(
    default,
    deserialize_with = "lenient_amount",
    skip_serializing_if = "Option::is_none"
  )]
  pub honorarios_por_hora: Option<f64>,
  #[serde(
    default,
    deserialize_with = "lenient_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub cuit:                Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub razon_social_id:     Option<u64>,
}

/// The create payload has the same shape as the form payload; only the CUIT
/// is canonicalised on the way out.
pub type CreatePersonaTipoDto = PersonaTipoDto;

impl PersonaTipoDto {
  /// A payload for `code` with no type-specific fields.
  pub fn bare(code: PersonTypeCode) -> Self {
    Self {
      tipo_persona_codigo: code,
      categoria_id:        None,
      especialidad_id:     None,
      honorarios_por_hora: None,
      cuit:                None,
      razon_social_id:     None,
    }
  }
}

impl From<PersonaTipoDto> for TypeAssignment {
  fn from(dto: PersonaTipoDto) -> Self {
    match dto.tipo_persona_codigo {
      PersonTypeCode::Socio => Self::Socio(SocioFields {
        categoria_id: dto.categoria_id,
      }),
      PersonTypeCode::NoSocio => Self::NoSocio,
      PersonTypeCode::Docente => Self::Docente(DocenteFields {
        especialidad_id:     dto.especialidad_id,
        honorarios_por_hora: dto.honorarios_por_hora,
      }),
      PersonTypeCode::Proveedor => Self::Proveedor(ProveedorFields {
        cuit:            dto.cuit,
        razon_social_id: dto.razon_social_id,
      }),
      PersonTypeCode::Extension(code) => Self::Extension {
        code,
        fields: ExtensionFields {
          categoria_id:        dto.categoria_id,
          especialidad_id:     dto.especialidad_id,
          honorarios_por_hora: dto.honorarios_por_hora,
          cuit:                dto.cuit,
          razon_social_id:     dto.razon_social_id,
        },
      },
    }
  }
}

impl From<&TypeAssignment> for PersonaTipoDto {
  fn from(assignment: &TypeAssignment) -> Self {
    let mut dto = PersonaTipoDto::bare(assignment.code());
    match assignment {
      TypeAssignment::Socio(f) => dto.categoria_id = f.categoria_id,
      TypeAssignment::NoSocio => {}
      TypeAssignment::Docente(f) => {
        dto.especialidad_id = f.especialidad_id;
        dto.honorarios_por_hora = f.honorarios_por_hora;
      }
      TypeAssignment::Proveedor(f) => {
        dto.cuit = f.cuit.as_deref().map(normalize_cuit);
        dto.razon_social_id = f.razon_social_id;
      }
      TypeAssignment::Extension { fields, .. } => {
        dto.categoria_id = fields.categoria_id;
        dto.especialidad_id = fields.especialidad_id;
        dto.honorarios_por_hora = fields.honorarios_por_hora;
        dto.cuit = fields.cuit.as_deref().map(normalize_cuit);
        dto.razon_social_id = fields.razon_social_id;
      }
    }
    dto
  }
}

impl From<TypeAssignment> for PersonaTipoDto {
  fn from(assignment: TypeAssignment) -> Self { Self::from(&assignment) }
}

// ─── Lenient field decoding ──────────────────────────────────────────────────

/// A cell of a raw form row that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
  pub field:   &'static str,
  pub message: String,
}

/// Decode one raw form row cell by cell.
///
/// Unlike deserialising a [`PersonaTipoDto`], a bad cell does not fail the
/// row: it is left empty and reported, so the rest of the payload can still
/// be validated. A missing or non-text code decodes to a blank code.
pub fn decode_row(row: &Value) -> (PersonaTipoDto, Vec<InvalidField>) {
  let code = row
    .get("tipoPersonaCodigo")
    .and_then(|v| text_value(v).ok().flatten())
    .unwrap_or_default();

  let mut invalid = Vec::new();
  let mut dto = PersonaTipoDto::bare(PersonTypeCode::from(code));
  dto.categoria_id = read_cell(row, "categoriaId", id_value, &mut invalid);
  dto.especialidad_id = read_cell(row, "especialidadId", id_value, &mut invalid);
  dto.honorarios_por_hora =
    read_cell(row, "honorariosPorHora", amount_value, &mut invalid);
  dto.cuit = read_cell(row, "cuit", text_value, &mut invalid);
  dto.razon_social_id = read_cell(row, "razonSocialId", id_value, &mut invalid);
  (dto, invalid)
}

fn read_cell<T>(
  row: &Value,
  field: &'static str,
  decode: fn(&Value) -> Result<Option<T>, String>,
  invalid: &mut Vec<InvalidField>,
) -> Option<T> {
  match row.get(field).map(decode)? {
    Ok(value) => value,
    Err(message) => {
      invalid.push(InvalidField { field, message });
      None
    }
  }
}

/// Reference ID: number or numeric string; `0`, `""` and `null` are absent.
fn id_value(value: &Value) -> Result<Option<u64>, String> {
  let id = match value {
    Value::Null => None,
    Value::Number(n) => {
      Some(n.as_u64().ok_or_else(|| format!("invalid reference id {n}"))?)
    }
    Value::String(s) if s.trim().is_empty() => None,
    Value::String(s) => Some(
      s.trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid reference id {s:?}"))?,
    ),
    other => return Err(format!("invalid reference id {other}")),
  };
  Ok(id.filter(|&id| id != 0))
}

/// Amount: number or decimal string; `""` and `null` are absent. Zero and
/// negative values are kept so validation can report them.
fn amount_value(value: &Value) -> Result<Option<f64>, String> {
  match value {
    Value::Null => Ok(None),
    Value::Number(n) => n
      .as_f64()
      .map(Some)
      .ok_or_else(|| format!("invalid amount {n}")),
    Value::String(s) if s.trim().is_empty() => Ok(None),
    Value::String(s) => s
      .trim()
      .replace(',', ".")
      .parse::<f64>()
      .map(Some)
      .map_err(|_| format!("invalid amount {s:?}")),
    other => Err(format!("invalid amount {other}")),
  }
}

/// Free text that some clients send as a bare number (CUITs).
fn text_value(value: &Value) -> Result<Option<String>, String> {
  match value {
    Value::Null => Ok(None),
    Value::String(s) if s.trim().is_empty() => Ok(None),
    Value::String(s) => Ok(Some(s.clone())),
    Value::Number(n) => Ok(Some(n.to_string())),
    other => Err(format!("invalid text {other}")),
  }
}

fn required_code<'de, D: Deserializer<'de>>(
  d: D,
) -> Result<PersonTypeCode, D::Error> {
  let code = PersonTypeCode::from(String::deserialize(d)?);
  if code.as_str().is_empty() {
    return Err(D::Error::custom("tipoPersonaCodigo must not be blank"));
  }
  Ok(code)
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
  id_value(&Value::deserialize(d)?).map_err(D::Error::custom)
}

fn lenient_amount<'de, D: Deserializer<'de>>(
  d: D,
) -> Result<Option<f64>, D::Error> {
  amount_value(&Value::deserialize(d)?).map_err(D::Error::custom)
}

fn lenient_text<'de, D: Deserializer<'de>>(
  d: D,
) -> Result<Option<String>, D::Error> {
  text_value(&Value::deserialize(d)?).map_err(D::Error::custom)
}
