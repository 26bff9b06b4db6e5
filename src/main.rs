//! CLI entry point for portfolio-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "portfolio-rs")]
#[command(version)]
#[command(about = "Blog content pipeline and contact relay for a personal portfolio", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Tags for the new post
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Report posts that fail validation or compilation
    Check,

    /// Export the blog as static files
    #[command(alias = "b")]
    Build,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "portfolio_rs=debug,info"
    } else {
        "portfolio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let portfolio = portfolio_rs::Portfolio::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            portfolio_rs::server::start(&portfolio, &ip, port).await?;
        }

        Commands::List { r#type } => {
            let portfolio = portfolio_rs::Portfolio::new(&base_dir)?;
            portfolio_rs::commands::list::run(&portfolio, &r#type)?;
        }

        Commands::New { title, tags } => {
            let portfolio = portfolio_rs::Portfolio::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            portfolio_rs::commands::new::create_post(&portfolio, &title, &tags)?;
        }

        Commands::Check => {
            let portfolio = portfolio_rs::Portfolio::new(&base_dir)?;
            portfolio_rs::commands::check::run(&portfolio)?;
        }

        Commands::Build => {
            let portfolio = portfolio_rs::Portfolio::new(&base_dir)?;
            tracing::info!("Building static files...");
            let stats = portfolio_rs::commands::build::run(&portfolio)?;
            println!(
                "Built {} posts and {} tag pages into {:?}",
                stats.posts, stats.tags, portfolio.public_dir
            );
        }

        Commands::Version => {
            println!("portfolio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
