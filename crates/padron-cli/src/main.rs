//! `padron` command-line tool for the Padrón rules.
//!
//! # Usage
//!
//! ```
//! padron serve --config padron.toml
//! padron inversa madre --familiar FEMENINO --principal MASCULINO
//! padron inversa madre --familiar FEMENINO --literal
//! padron validar tipos.json
//! padron --catalogo catalogo.toml validar - < tipos.json
//! ```

mod settings;

use std::{
  io::Read as _,
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Arc,
};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use padron_core::{
  Catalog,
  gender::Gender,
  inference::{InverseMode, infer_from_code},
  validation::validate_payload,
};
use settings::{ServerConfig, resolve_catalog};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "padron", version, about = "Persona relationship and type rules")]
struct Cli {
  /// Catalog file (TOML, or JSON by extension) replacing the built-in one.
  #[arg(long, global = true, value_name = "FILE", env = "PADRON_CATALOGO")]
  catalogo: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the JSON API.
  Serve {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "padron.toml")]
    config: PathBuf,
  },

  /// Print the inverse of a relation code.
  Inversa {
    /// Relation of the familiar to the principal (e.g. `padre`).
    parentesco: String,

    /// Gender of the familiar.
    #[arg(long)]
    familiar: Option<Gender>,

    /// Gender of the principal.
    #[arg(long)]
    principal: Option<Gender>,

    /// Select the gendered form as the catalog rule reads, instead of by the
    /// principal's role.
    #[arg(long)]
    literal: bool,
  },

  /// Validate a JSON array of type assignments; exits with 1 when invalid.
  Validar {
    /// Input file, or `-` for stdin.
    input: PathBuf,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  // Logs go to stderr so command output stays pipeable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Serve { config } => {
      serve(&config, cli.catalogo.as_deref()).await?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Inversa {
      parentesco,
      familiar,
      principal,
      literal,
    } => {
      let catalog = resolve_catalog(cli.catalogo.as_deref(), None)?;
      let mode = if literal {
        InverseMode::Literal
      } else {
        InverseMode::PrincipalRole
      };
      let inverse =
        infer_from_code(&catalog, mode, &parentesco, familiar, principal);
      println!("{inverse}");
      Ok(ExitCode::SUCCESS)
    }
    Command::Validar { input } => {
      let catalog = resolve_catalog(cli.catalogo.as_deref(), None)?;
      validate(&input, &catalog)
    }
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn serve(config: &Path, catalog_flag: Option<&Path>) -> Result<()> {
  let server_cfg = ServerConfig::load(config)?;
  let catalog =
    resolve_catalog(catalog_flag, server_cfg.catalog_path.as_deref())?;

  let app = axum::Router::new()
    .nest("/api", padron_api::api_router(Arc::new(catalog)));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn validate(input: &Path, catalog: &Catalog) -> Result<ExitCode> {
  let raw = if input == Path::new("-") {
    let mut buf = String::new();
    std::io::stdin()
      .read_to_string(&mut buf)
      .context("reading stdin")?;
    buf
  } else {
    std::fs::read_to_string(input)
      .with_context(|| format!("reading {}", input.display()))?
  };

  let rows: Vec<serde_json::Value> =
    serde_json::from_str(&raw).context("parsing type assignments")?;
  let report = validate_payload(&rows, catalog);
  println!(
    "{}",
    serde_json::to_string_pretty(&report).context("rendering report")?
  );

  Ok(if report.valid {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}
