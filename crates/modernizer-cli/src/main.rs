mod cmd;
mod tools;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "modernizer",
    about = "Stream AI modernization analyses of Git repositories over SSE",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (`/analyze`, `/chat`, `/health`, `/models`)
    Serve(cmd::serve::ServeArgs),

    /// Serve the repository tools over MCP stdio (spawned by the agent)
    Mcp,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve(_) => tracing::Level::INFO,
        Commands::Mcp => tracing::Level::WARN,
    };

    // stdout belongs to the MCP protocol, so logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(args),
        Commands::Mcp => cmd::mcp::run(),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
