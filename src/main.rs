use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "schemata")]
#[command(version = "0.1.0")]
#[command(about = "Turn uploaded GraphQL schemas into SQL tables and a GraphQL API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration
    Init {
        /// Output config file path (if not specified, outputs to stdout)
        #[arg(long)]
        output: Option<String>,

        /// Also write an example Cat/Bike schema into the upload directory
        #[arg(long)]
        with_example: bool,
    },

    /// Start GraphQL server
    Serve {
        /// Config file path
        #[arg(long, default_value = "schemata.toml")]
        config: String,

        /// Server port (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Register a schema file and create its tables
    Register {
        /// Identifier to register the schema under
        #[arg(long)]
        name: String,

        /// Schema file to upload
        file: String,

        /// Config file path
        #[arg(long, default_value = "schemata.toml")]
        config: String,
    },

    /// List registered schemas
    List {
        /// Config file path
        #[arg(long, default_value = "schemata.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output, with_example } => {
            cli::init::run(output, with_example)
                .await
                .context("init failed")?;
        }
        Commands::Serve { config, port } => {
            cli::serve::run(config.clone(), port)
                .await
                .with_context(|| format!("server failed (config: {})", config))?;
        }
        Commands::Register { name, file, config } => {
            cli::register::run(config, name.clone(), file.clone())
                .await
                .with_context(|| format!("could not register '{}' from {}", name, file))?;
        }
        Commands::List { config } => {
            cli::list::run(config).await.context("could not list schemas")?;
        }
    }

    Ok(())
}
