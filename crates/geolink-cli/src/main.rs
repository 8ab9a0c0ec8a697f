mod convert;
mod decode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "geolink")]
#[command(about = "Convert map links into geo: URIs, service URLs, and GPX")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a URL, URI, or free-form text into a normalized location.
    Convert(convert::ConvertArgs),
    /// Decode a compact location code without any conversion pipeline.
    Decode(decode::DecodeArgs),
    /// List the supported mapping services, in match priority order.
    Services,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => convert::run(args).await,
        Commands::Decode(args) => decode::run(&args),
        Commands::Services => {
            for input in geolink_inputs::inputs() {
                println!("{}", input.id());
            }
            Ok(())
        }
    }
}
