use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use architect_manager::{api, mcp, models::Phase, workflow};

#[derive(Parser)]
#[command(name = "archm")]
#[command(about = "Resumable two-phase requirement queue for AI-assisted design and implementation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server via stdio (default)
    Mcp,
    /// Serve the HTTP API
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Print a summary of a phase queue
    Status {
        /// Project whose artifacts/ directory holds the queue
        #[arg(long)]
        project_root: String,

        /// design or implementation
        #[arg(long, default_value = "design")]
        phase: Phase,
    },
    /// Print the requirements tree annotated with phase progress
    Tree {
        #[arg(long)]
        project_root: String,

        /// Requirements document, absolute or relative to the project root
        #[arg(long)]
        requirements: String,

        #[arg(long, default_value = "design")]
        phase: Phase,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "architect_manager=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Only the HTTP server writes logs to stdout; everything else keeps it for output
    let use_stderr = !matches!(cli.command, Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting Architect Manager API on port {}", port);

            let app = api::create_router();

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!(
                "Architect Manager API listening on http://127.0.0.1:{}",
                port
            );

            axum::serve(listener, app).await?;
        }
        Some(Commands::Status {
            project_root,
            phase,
        }) => {
            let status = workflow::phase_status(phase, &project_root)?;
            println!("{} ({})", phase.label(), phase.as_str());
            if let Some(source) = &status.source_document {
                println!("  source:    {}", source);
            }
            println!("  processed: {}/{}", status.processed, status.total);
            println!("  remaining: {}", status.remaining);
            match &status.next_id {
                Some(id) => println!("  next:      {}", id),
                None => println!("  next:      (phase complete)"),
            }
        }
        Some(Commands::Tree {
            project_root,
            requirements,
            phase,
        }) => {
            print!(
                "{}",
                workflow::progress_tree(phase, &project_root, &requirements)?
            );
        }
        Some(Commands::Mcp) | None => {
            mcp::run_stdio_server().await?;
        }
    }

    Ok(())
}
