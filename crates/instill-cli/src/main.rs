mod cmd_inspect;
mod cmd_serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "instill",
    version,
    about = "Path-scoped instruction injection for coding agents"
)]
struct Cli {
    /// Project root containing `.github/` instructions (default: current dir)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve hook requests as line-delimited JSON over stdin/stdout
    Serve,
    /// List loaded instructions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which path-scoped instructions apply to a file
    Match {
        /// File path, absolute or relative to the project root
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let root = match cli.root {
        Some(r) => r,
        None => std::env::current_dir()?,
    };

    match cli.cmd {
        Command::Serve => cmd_serve::execute(&root),
        Command::List { json } => cmd_inspect::list(&root, json),
        Command::Match { path } => cmd_inspect::matching(&root, &path),
    }
}

/// Logs go to stderr; stdout is the hook protocol channel.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("INSTILL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
