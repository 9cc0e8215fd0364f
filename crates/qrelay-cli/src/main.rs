//! qrelay command-line interface
//!
//! ```text
//! qrelay [simulate] [--aqueduct-url URL] [--experiment EID] ...
//! qrelay plot [--shots-file NAME] [--image-file NAME] ...
//! qrelay backends
//! ```
//!
//! Every option can also be given through the environment variable of the
//! same name (`aqueduct_url`, `experiment`, `qasm_file`, ...). The Aqueduct
//! token is read from `API_TOKEN`.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use qrelay_cli::commands::{backends, plot, simulate};
use qrelay_cli::{PlotArgs, PlotConfig, RunConfig, SimulateArgs};

/// qrelay - simulate Aqueduct experiment circuits
#[derive(Parser)]
#[command(name = "qrelay")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    simulate: SimulateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a circuit, simulate it and upload the shots (default)
    Simulate(SimulateArgs),

    /// Render a histogram of a shots file and upload it
    Plot(PlotArgs),

    /// List available backends
    Backends,
}

async fn dispatch(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Simulate(args) => simulate::execute(&RunConfig::try_from(args)?).await,
        Commands::Plot(args) => plot::execute(&PlotConfig::try_from(args)?).await,
        Commands::Backends => backends::execute().await,
    }
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.unwrap_or(Commands::Simulate(cli.simulate));

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(dispatch(command)));

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
