use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use redraft_core::document::DocumentKind;
use redraft_infrastructure::RedraftPaths;
use std::path::PathBuf;

mod bootstrap;
mod commands;
mod render;
mod repl;
mod telemetry;

#[derive(Parser)]
#[command(name = "redraft")]
#[command(about = "Redraft - AI-assisted editing of generated summaries", long_about = None)]
struct Cli {
    /// Use DIR for config, documents, sessions and logs instead of the user directories
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a document from a text file and print its ID
    Import {
        #[arg(long, value_enum)]
        kind: KindArg,
        file: PathBuf,
    },
    /// List documents
    Documents,
    /// Chat with the model about a document
    Chat { document_id: String },
    /// List a document's versions
    Versions { document_id: String },
    /// Restore an earlier version as a new version
    Restore { document_id: String, version: u32 },
    /// Print a document's current text, or a given version
    Show {
        document_id: String,
        #[arg(long)]
        version: Option<u32>,
    },
    /// Word diff of two text files
    Diff {
        old: PathBuf,
        new: PathBuf,
        #[arg(long, default_value_t = redraft_core::diff::DEFAULT_WINDOW)]
        window: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Analysis,
    Profile,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Analysis => DocumentKind::AnalysisSummary,
            KindArg::Profile => DocumentKind::ProfileSummary,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Needs neither storage nor logging.
    if let Commands::Diff { old, new, window } = &cli.command {
        return commands::diff::run(old, new, *window);
    }

    let paths = RedraftPaths::new(cli.data_dir.clone());
    let _guard = telemetry::init(&paths.logs_dir()?)?;

    let online = matches!(cli.command, Commands::Chat { .. });
    let app = bootstrap::App::open(&paths, online)?;

    match cli.command {
        Commands::Import { kind, file } => {
            commands::documents::import(&app.editing, kind.into(), &file).await?
        }
        Commands::Documents => commands::documents::list(&app.editing).await?,
        Commands::Chat { document_id } => repl::run(&app.editing, &document_id).await?,
        Commands::Versions { document_id } => {
            commands::documents::versions(&app.editing, &document_id).await?
        }
        Commands::Restore {
            document_id,
            version,
        } => commands::documents::restore(&app.editing, &document_id, version).await?,
        Commands::Show {
            document_id,
            version,
        } => commands::documents::show(&app.editing, &document_id, version).await?,
        Commands::Diff { .. } => {}
    }

    Ok(())
}
