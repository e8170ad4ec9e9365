use std::path::PathBuf;

use clap::{Parser, Subcommand};

use endorser_gateway::lifecycle::startup::startup;

#[derive(Parser)]
#[command(name = "endorser-gateway")]
#[command(about = "Blockchain node RPC gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start up the blockchain node service
    Startup {
        /// Engine environment config file path
        #[arg(short, long)]
        conf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Startup { conf } => {
            let report = startup(&conf).await?;
            report.engine_result?;
            report.service_result?;
        }
    }

    Ok(())
}
