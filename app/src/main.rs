#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, EvalInput, EvalStrategy, InitStrategy,
    TemplatesInput, TemplatesStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "palaver")]
#[command(about = "palaver dialogue platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hold a local conversation in the terminal
    Chat {
        /// Session id to register (defaults to "terminal")
        #[arg(short = 's', long)]
        session: Option<String>,
    },
    /// Score a batch of archived dialogues
    Eval {
        /// Path to the dialogue log (JSON)
        #[arg(short = 'd', long)]
        dialogues: PathBuf,

        /// Path to the config file (defaults to ~/palaver/config.json)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Also run the satisfaction scorer
        #[arg(long)]
        satisfaction: bool,
    },
    /// Extract utterance templates per intent from a dialogue log
    Templates {
        /// Path to the dialogue log (JSON)
        #[arg(short = 'd', long)]
        dialogues: PathBuf,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { session } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id: session.unwrap_or_else(|| "terminal".to_string()),
                })
                .await
        }
        Commands::Eval {
            dialogues,
            config,
            satisfaction,
        } => {
            EvalStrategy
                .execute(EvalInput {
                    dialogues,
                    config,
                    satisfaction,
                })
                .await
        }
        Commands::Templates { dialogues } => {
            TemplatesStrategy.execute(TemplatesInput { dialogues }).await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
