use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slip_cli::config::Config;
use slip_cli::{app, logging};
use slip_core::db::{DocumentRepository, RepoConfig};
use slip_core::documents::{DeliverySlip, DocumentType, LoadingSlip};
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Fill, check and save delivery and loading slips from the command line.
///
/// Answers files are JSON objects mapping dotted field paths to values,
/// e.g. `{"partyDetails.fromLocation": "Pune", "billingDetails.roundOff": true}`.
#[derive(Debug, Parser)]
#[command(name = "slipwizard", version, about)]
struct Cli {
    /// Config file (default: ./slipwizard.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or EnvFilter directive; overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show derived totals and per-step validation for an answers file.
    Preview {
        #[arg(long, value_enum)]
        kind: Kind,

        #[arg(long)]
        answers: PathBuf,
    },

    /// Walk the wizard with an answers file and save the result.
    Submit {
        #[arg(long, value_enum)]
        kind: Kind,

        #[arg(long)]
        answers: PathBuf,

        /// Update this document instead of creating a new one.
        #[arg(long)]
        edit: Option<String>,

        /// Save to an in-memory store instead of the configured backend.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Open a stored document and print the hydrated form.
    Show {
        #[arg(long, value_enum)]
        kind: Kind,

        #[arg(long)]
        id: String,

        #[command(flatten)]
        backend: BackendArgs,
    },
}

/// Overrides for the `[repository]` config section.
#[derive(Debug, Args)]
struct BackendArgs {
    #[arg(long)]
    backend: Option<String>,

    #[arg(long)]
    base_url: Option<String>,
}

impl BackendArgs {
    fn apply(
        self,
        config: &mut RepoConfig,
    ) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    DeliverySlip,
    LoadingSlip,
}

impl From<Kind> for DocumentType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::DeliverySlip => DocumentType::DeliverySlip,
            Kind::LoadingSlip => DocumentType::LoadingSlip,
        }
    }
}

// ─── helpers ─────────────────────────────────────────────────────────────────

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_repository(
    config: &RepoConfig,
    kind: DocumentType,
) -> Result<Box<dyn DocumentRepository>> {
    debug!(backend = %config.backend, resource = kind.resource(), "opening repository");
    app::build_registry()
        .create(config, kind.resource())
        .await
        .with_context(|| format!("Failed to open '{}' backend", config.backend))
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init(&config.logging)?;

    match cli.command {
        Command::Preview { kind, answers } => {
            let answers = app::load_answers(&answers)?;
            let preview = match DocumentType::from(kind) {
                DocumentType::DeliverySlip => app::preview::<DeliverySlip>(&answers)?,
                DocumentType::LoadingSlip => app::preview::<LoadingSlip>(&answers)?,
            };
            print_json(&preview)
        }
        Command::Submit {
            kind,
            answers,
            edit,
            dry_run,
            backend,
        } => {
            let answers = app::load_answers(&answers)?;
            let mut repo_config = config.repository;
            backend.apply(&mut repo_config);
            if dry_run {
                info!("dry run: saving to memory");
                repo_config.backend = "memory".to_string();
            }

            let kind = DocumentType::from(kind);
            let repo = open_repository(&repo_config, kind).await?;
            let report = match kind {
                DocumentType::DeliverySlip => {
                    app::submit::<DeliverySlip>(&*repo, &answers, edit.as_deref()).await?
                }
                DocumentType::LoadingSlip => {
                    app::submit::<LoadingSlip>(&*repo, &answers, edit.as_deref()).await?
                }
            };
            print_json(&report)
        }
        Command::Show { kind, id, backend } => {
            let mut repo_config = config.repository;
            backend.apply(&mut repo_config);

            let kind = DocumentType::from(kind);
            let repo = open_repository(&repo_config, kind).await?;
            let form = match kind {
                DocumentType::DeliverySlip => app::show::<DeliverySlip>(&*repo, &id).await?,
                DocumentType::LoadingSlip => app::show::<LoadingSlip>(&*repo, &id).await?,
            };
            print_json(&form)
        }
    }
}
