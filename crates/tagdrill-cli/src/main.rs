//! tagdrill CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tagdrill", version, about = "Plant tag recall trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive quiz session
    Quiz {
        /// Category: 设备/equipment, 阀门/valve, 性能参数/performance, 工艺指标/standard, or mixed
        #[arg(long, default_value = "mixed")]
        category: String,

        /// Maximum number of items (0 = all)
        #[arg(long, default_value = "0")]
        limit: usize,

        /// Exam mode: sample about a third of each category
        #[arg(long)]
        exam: bool,

        /// Pause after each answer in milliseconds (overrides config)
        #[arg(long)]
        pause_ms: Option<u64>,

        /// Seed for item order, for reproducible sessions
        #[arg(long)]
        seed: Option<u64>,

        /// Write a JSON session summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show proficiency statistics
    Stats {
        /// Output format: text, json, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (html defaults to ./tagdrill-report.html)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List items answered wrong, most urgent first
    Wrongbook {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load the reference tables and report problems
    Validate {
        /// Data directory (overrides the configured source)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and sample tables
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tagdrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Quiz {
            category,
            limit,
            exam,
            pause_ms,
            seed,
            summary,
            config,
        } => {
            commands::quiz::execute(commands::quiz::QuizArgs {
                category,
                limit,
                exam,
                pause_ms,
                seed,
                summary,
                config,
            })
            .await
        }
        Commands::Stats {
            format,
            output,
            config,
        } => commands::stats::execute(format, output, config).await,
        Commands::Wrongbook { format, config } => {
            commands::wrongbook::execute(format, config).await
        }
        Commands::Validate { data_dir, config } => {
            commands::validate::execute(data_dir, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
