use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lorelink::config::{CONFIG_FILE, Config};
use lorelink::{commands, diagnostics, error};

/// Exit code for any error rendered through diagnostics.
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "lorelink", version, about = "Keyword cross-references for markdown worldbuilding notes")]
struct Cli {
    /// Campaign notes directory (overrides the config file)
    #[arg(long, global = true)]
    campaign: Option<PathBuf>,

    /// Compare keywords case-sensitively (overrides the config file)
    #[arg(long, global = true)]
    case_sensitive: bool,

    #[command(subcommand)]
    command: Commands,

    /// Config file [default: .lorelink.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// World notes directory (overrides the config file)
    #[arg(long, global = true)]
    world: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every scanned header; `*` marks keyword headers
    Headers,
    /// List every keyword and its targets
    Index {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save the effective settings to the config file
    Init,
    /// Resolve keyword links in one document (`world:path`, `campaign:path`, or `path`)
    Links {
        /// Document to resolve
        document: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show where a keyword points
    Lookup {
        /// Keyword to look up
        keyword: String,
    },
    /// Search keywords and headers
    Search {
        /// Substring to search for
        query: String,
        /// Maximum results to show
        #[arg(long, short = 'n', default_value_t = 9)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Install the stderr subscriber. `LORELINK_LOG` wins over the flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("LORELINK_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    return match run(cli) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(EXIT_ERROR)
        },
    };
}

/// Merge config file and flags, then dispatch.
///
/// # Errors
///
/// Returns config, loading, and command errors for rendering.
fn run(cli: Cli) -> Result<ExitCode, error::Error> {
    // `init` may name a file that does not exist yet.
    let creating = matches!(cli.command, Commands::Init);
    let (config_path, mut config) = match &cli.config {
        Some(path) if !creating => (path.clone(), Config::load_required(path)?),
        Some(path) => (path.clone(), Config::load(path)?),
        None => {
            let path = PathBuf::from(CONFIG_FILE);
            let config = Config::load(&path)?;
            (path, config)
        },
    };
    if cli.world.is_some() {
        config.world_dir = cli.world;
    }
    if cli.campaign.is_some() {
        config.campaign_dir = cli.campaign;
    }
    if cli.case_sensitive {
        config.case_sensitive = true;
    }

    if let Commands::Init = cli.command {
        return commands::init(&config, &config_path);
    }

    let catalog = commands::open_catalog(&config)?;
    return match cli.command {
        Commands::Headers => commands::headers(&catalog),
        Commands::Index { json } => commands::index(&catalog, json),
        Commands::Init => Ok(ExitCode::SUCCESS),
        Commands::Links { document, json } => commands::links(&catalog, &document, json),
        Commands::Lookup { keyword } => commands::lookup(&catalog, &keyword),
        Commands::Search { query, limit, json } => commands::search(&catalog, &query, limit, json),
    };
}
