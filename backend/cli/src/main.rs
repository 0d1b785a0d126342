mod extract_cmd;
mod serve_cmd;
mod status_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use appify_config::{config_file_path, load_and_prepare};

#[derive(Parser)]
#[command(name = "appify")]
#[command(about = "Appify: describe a Streamlit app in chat, get the code live")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $APPIFY_CONFIG or ~/.appify/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the effective config and whether the server is up
    Status,
    /// Print the user code held in a generated app file
    Extract {
        /// Path to the generated app (defaults to the configured script path)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config_file_path);

    match cli.command {
        Commands::Serve { port } => {
            let mut config = load_and_prepare(&config_path).await?;
            if let Some(port) = port {
                config.port = port;
            }
            appify_logging::init_logger(&config.log_dir, &config.log_level);
            serve_cmd::run(config).await?;
        }
        Commands::Status => status_cmd::run(&config_path).await?,
        Commands::Extract { path } => {
            let path = match path {
                Some(path) => path,
                None => load_and_prepare(&config_path).await?.script_path,
            };
            extract_cmd::run(&path).await?;
        }
    }

    Ok(())
}
