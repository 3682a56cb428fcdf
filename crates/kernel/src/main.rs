//! Lectern command-line front end.
//!
//! Creates lessons from templates, renders them, validates stored
//! documents and turns local files into data URIs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use lectern_kernel::config::Config;
use lectern_kernel::content::{BlockKindRegistry, Document, TemplateCatalog};
use lectern_kernel::file::ingest_file;
use lectern_kernel::render::{EditableRenderer, PreviewRenderer, to_html};
use lectern_kernel::session::EditorSession;

#[derive(Parser)]
#[command(name = "lectern", version, about = "Lesson block document tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the template catalog.
    Templates,
    /// Create a lesson document from a template.
    New {
        #[arg(long, short)]
        template: String,
        /// Write the document here instead of stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Render a lesson document to HTML.
    Render {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Mode::Preview)]
        mode: Mode,
    },
    /// Check a lesson document against the block kind shapes.
    Validate { file: PathBuf },
    /// Encode a file as a data URI.
    Ingest { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Preview,
    Editable,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Templates => {
            let catalog = load_catalog(&config).await?;
            println!("{}", serde_json::to_string_pretty(&catalog.summaries())?);
        }
        Command::New { template, out } => {
            let catalog = load_catalog(&config).await?;
            let doc = catalog.new_document(&template)?;
            let json = doc.to_json()?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(template = %template, path = %path.display(), blocks = doc.len(), "lesson created");
                }
                None => println!("{json}"),
            }
        }
        Command::Render { file, mode } => {
            let mut doc = read_document(&file).await?;
            let registry = BlockKindRegistry::with_standard_kinds();
            doc.sanitize(&registry);
            let tree = match mode {
                Mode::Preview => PreviewRenderer::new(&config.code_theme).render(&doc),
                Mode::Editable => {
                    let session = EditorSession::new();
                    EditableRenderer::new(&session, &registry).render(&doc)
                }
            };
            println!("{}", to_html(&tree));
        }
        Command::Validate { file } => {
            let doc = read_document(&file).await?;
            let errors = BlockKindRegistry::with_standard_kinds().validate_document(doc.blocks());
            if !errors.is_empty() {
                for error in &errors {
                    warn!("{error}");
                }
                bail!("{}: {} problem(s) found", file.display(), errors.len());
            }
            info!(path = %file.display(), blocks = doc.len(), "document is valid");
        }
        Command::Ingest { file } => {
            let uri = ingest_file(&file, config.max_upload_bytes).await?;
            println!("{}", serde_json::to_string_pretty(&uri)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn load_catalog(config: &Config) -> Result<TemplateCatalog> {
    TemplateCatalog::load(config.templates_dir.as_deref())
        .await
        .context("failed to load template catalog")
}

async fn read_document(path: &Path) -> Result<Document> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Document::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))
}
