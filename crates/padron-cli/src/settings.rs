//! Server settings and catalog files.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use padron_core::Catalog;
use serde::Deserialize;

// ─── Server settings ──────────────────────────────────────────────────────────

/// Runtime server configuration, read from a TOML file and `PADRON_*`
/// environment variables (the latter win).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  /// Catalog file to load instead of the built-in catalog.
  #[serde(default)]
  pub catalog_path: Option<PathBuf>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

impl ServerConfig {
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PADRON"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Catalog files ────────────────────────────────────────────────────────────

/// Load a catalog file. `.json` files are parsed as JSON, anything else as
/// TOML. Sections missing from the file keep their built-in values.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading catalog file {}", path.display()))?;

  let catalog = if path.extension().is_some_and(|ext| ext == "json") {
    Catalog::from_json_str(&raw)
      .with_context(|| format!("parsing catalog file {}", path.display()))?
  } else {
    parse_toml_catalog(&raw)
      .with_context(|| format!("parsing catalog file {}", path.display()))?
  };

  tracing::info!(
    path = %path.display(),
    relations = catalog.relations.len(),
    types = catalog.types.len(),
    "loaded catalog"
  );
  Ok(catalog)
}

fn parse_toml_catalog(raw: &str) -> Result<Catalog> { Ok(toml::from_str(raw)?) }

/// The catalog named by `--catalogo`, else the one in the server config,
/// else the built-in one.
pub fn resolve_catalog(
  flag: Option<&Path>,
  configured: Option<&Path>,
) -> Result<Catalog> {
  match flag.or(configured) {
    Some(path) => load_catalog(path),
    None => Ok(Catalog::default()),
  }
}

#[cfg(test)]
mod tests {
  use padron_core::{
    catalog::ReferenceKind,
    person_type::PersonTypeCode,
    relation::{InverseRule, Relation},
  };

  use super::*;

  #[test]
  fn toml_catalog_overrides_sections() {
    let raw = r#"
      exclusiones = [["SOCIO", "NO_SOCIO"], ["DOCENTE", "PROVEEDOR"]]

      [[categorias]]
      id = 1
      codigo = "GENERAL"
      nombre = "General"

      [[parentescos]]
      code = "padre"
      label = "Papá"
      naiveInverse = "hijo"
      rule = { kind = "by_familiar_gender", masculine = "hijo", feminine = "hija" }
    "#;
    let catalog = parse_toml_catalog(raw).unwrap();

    assert_eq!(catalog.exclusive_pairs.len(), 2);
    assert_eq!(
      catalog.exclusive_partners(&PersonTypeCode::Docente).next(),
      Some(&PersonTypeCode::Proveedor)
    );
    assert_eq!(catalog.default_reference(ReferenceKind::Categoria), Some(1));
    // Listed relations replace their built-in entry; the rest are kept.
    assert_eq!(catalog.relations.len(), 19);
    assert_eq!(catalog.relations.label(Relation::Padre), "Papá");
    assert_eq!(catalog.relations.label(Relation::Tia), "Tía");
    assert_eq!(
      catalog.relations.get(Relation::Padre).map(|e| e.rule),
      Some(InverseRule::ByFamiliarGender {
        masculine: Relation::Hijo,
        feminine:  Relation::Hija,
      })
    );
    // Not in the file: built-in definitions.
    assert_eq!(catalog.types.len(), 4);
  }

  #[test]
  fn empty_toml_is_the_builtin_catalog() {
    assert_eq!(parse_toml_catalog("").unwrap(), Catalog::default());
  }

  #[test]
  fn no_catalog_path_uses_builtin() {
    assert_eq!(resolve_catalog(None, None).unwrap(), Catalog::default());
  }

  #[test]
  fn missing_catalog_file_is_an_error() {
    let err = resolve_catalog(Some(Path::new("/nonexistent/catalogo.toml")), None)
      .unwrap_err();
    assert!(err.to_string().contains("reading catalog file"));
  }
}
