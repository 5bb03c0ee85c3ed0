//! Thin CLI adapter over [`cryptdex::Builder`] implementing the `build <variant> <data-mode>`
//! surface of §6: parses flags, resolves [`cryptdex::config::Config`], and drives one build. No
//! cryptographic or indexing logic lives in this file — see `src/builder.rs` for that.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use cryptdex::config::{Config, ConfigOverrides};
use cryptdex::crypto::{Key, MasterSecret};
use cryptdex::emm::Variant;
use cryptdex::model::{Catalog, ForeignKey, PrimaryKey, Row, TableSchema};
use cryptdex::store::Database;
use cryptdex::{Builder, PlaintextRows};

#[derive(Debug, Parser)]
#[command(name = "sse-index-builder")]
#[command(about = "Builds encrypted filter/join indices over relational tables for searchable symmetric encryption")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs one build over a declared catalog and already-materialized plaintext rows.
    Build {
        /// Which EMM scheme to construct.
        variant: VariantArg,

        /// Which stage of the data pipeline this invocation targets.
        data_mode: DataMode,

        /// Overrides `SSE_PLAINTEXT_DB_PATH`: path to the plaintext manifest this build reads.
        #[arg(long)]
        plaintext_db: Option<PathBuf>,

        /// Overrides `SSE_ENCRYPTED_DB_PATH`: path to the redb-backed store this build writes.
        #[arg(long)]
        encrypted_db: Option<PathBuf>,

        /// Overrides `SSE_MASTER_SECRET_PATH`: path to a file holding the master secret string.
        #[arg(long)]
        master_secret: Option<PathBuf>,

        /// Overrides `SSE_SCRATCH_DIR`.
        #[arg(long)]
        scratch_dir: Option<PathBuf>,
    },
}

/// CLI spelling of [`cryptdex::emm::Variant`] — kept as a thin wrapper rather than deriving
/// `ValueEnum` directly on the library type, so the library stays free of a `clap` dependency.
#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
enum VariantArg {
    Spx,
    Corr,
    Pkfk,
}

impl From<VariantArg> for Variant {
    fn from(variant: VariantArg) -> Self {
        match variant {
            VariantArg::Spx => Self::Spx,
            VariantArg::Corr => Self::Corr,
            VariantArg::Pkfk => Self::Pkfk,
        }
    }
}

/// The three data-mode stages named by §6's `build <variant> <data-mode>` surface.
///
/// `generate` (bulk data-generation) and `load-plain` (loading generated rows into the plaintext
/// source database) are the bulk data-generation harness's responsibility, named as "out of
/// scope" collaborators — this binary only implements `build-enc`, the stage that actually
/// constructs the encrypted indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum DataMode {
    Generate,
    LoadPlain,
    BuildEnc,
}

fn main() -> Result<(), cryptdex::Error> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sse_index_builder=info,cryptdex=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Command::Build { variant, data_mode, plaintext_db, encrypted_db, master_secret, scratch_dir } = cli.command;

    if data_mode != DataMode::BuildEnc {
        tracing::info!(
            ?data_mode,
            "this data-mode is owned by the external bulk data-generation harness; nothing to do here"
        );
        return Ok(());
    }

    let config = Config::load(ConfigOverrides {
        plaintext_db_path: plaintext_db,
        encrypted_db_path: encrypted_db,
        master_secret_path: master_secret,
        scratch_dir,
    })?;

    let manifest = load_manifest(&config.plaintext_db_path)?;
    let catalog = Catalog::new(manifest.tables)?;
    let master_secret = load_master_secret(&config.master_secret_path)?;
    let encrypted_store = Database::create(&config.encrypted_db_path)?;

    let builder = Builder::new(&catalog, &master_secret);
    builder.build(variant.into(), manifest.rows, &encrypted_store)?;

    tracing::info!(variant = Variant::from(variant).name(), "build complete");
    Ok(())
}

/// The on-disk shape of `--plaintext-db`: a JSON manifest declaring every table's schema plus its
/// already-materialized rows, read in one shot.
///
/// A real deployment would source this from the distributed compute engine's row-stream
/// abstraction (see `PlaintextRows`'s docs); a flat JSON manifest is this binary's stand-in for
/// that collaborator, since the bulk data-generation harness itself is out of scope here.
#[derive(serde::Deserialize)]
struct Manifest {
    tables: Vec<TableDeclaration>,
}

#[derive(serde::Deserialize)]
struct TableDeclaration {
    name: String,
    columns: Vec<String>,
    primary_key: Vec<String>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    rows: Vec<Row>,
}

struct LoadedManifest {
    tables: Vec<TableSchema>,
    rows: PlaintextRows,
}

fn load_manifest(path: &Path) -> Result<LoadedManifest, cryptdex::Error> {
    let contents = std::fs::read_to_string(path)?;
    let manifest: Manifest = serde_json::from_str(&contents)?;

    let mut tables = Vec::with_capacity(manifest.tables.len());
    let mut rows = PlaintextRows::with_capacity(manifest.tables.len());

    for declared in manifest.tables {
        let primary_key = PrimaryKey::from_declared(&declared.name, declared.primary_key)?;
        tables.push(TableSchema {
            name: declared.name.clone(),
            columns: declared.columns,
            primary_key,
            foreign_keys: declared.foreign_keys,
        });
        rows.insert(declared.name, declared.rows);
    }

    Ok(LoadedManifest { tables, rows })
}

fn load_master_secret(path: &Path) -> Result<MasterSecret, cryptdex::Error> {
    let raw = std::fs::read_to_string(path)?;
    Ok(MasterSecret::new(&Key::from_str(raw.trim())))
}
