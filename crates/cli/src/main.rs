use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(about = "Authors and books catalog API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the catalog API until Ctrl-C
    Serve {
        /// Listen port (overrides `server.port`)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf CLI serving");
            bookshelf_app::run(settings).await
        }
        Commands::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
